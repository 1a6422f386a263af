// ==========================================
// 运费账单对账系统 - 发票领域对象
// ==========================================
// 职责: 发票抬头 / 行项目 / 明细 / 合计 / 发票汇总表行
// ==========================================

use crate::domain::types::TaxMode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// InvoiceHeader - 发票抬头（调用方填写）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceHeader {
    pub bill_to: String,
    pub bill_address: String,
    pub bill_npwp: String,
    pub ship_to: String,
    pub ship_address: String,
    pub invoice_no: String,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub currency: String,
    pub bank_info: String,
}

impl Default for InvoiceHeader {
    fn default() -> Self {
        Self {
            bill_to: String::new(),
            bill_address: String::new(),
            bill_npwp: String::new(),
            ship_to: String::new(),
            ship_address: String::new(),
            invoice_no: String::new(),
            invoice_date: None,
            due_date: None,
            currency: "IDR".to_string(),
            bank_info: String::new(),
        }
    }
}

/// 单趟明细（RINCIAN KENDARAAN）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDetail {
    pub no: usize,
    pub date: Option<NaiveDate>,
    pub route: String,
    pub task_code: String,
    pub vehicle_type: String,
    pub trip_type: String,
    pub plate_number: String,
    pub price: Decimal,
    #[serde(skip)]
    pub source_file: String,
}

/// 发票行项目：按 (路线, 车型, 趟次类型) 分组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceLine {
    pub no: usize,
    pub route: String,
    pub vehicle_type: String,
    pub trip_type: String,
    pub trip_count: usize,
    /// 组内第一条记录的单价
    pub unit_price: Decimal,
    /// DPP（组内价格合计）
    pub amount: Decimal,
    pub vat: Decimal,
    /// 组内单价不一致
    pub price_varies: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InvoiceTotals {
    pub discount: Decimal,
    pub dpp: Decimal,
    pub vat: Decimal,
    pub pph: Decimal,
    pub payable: Decimal,
}

// ==========================================
// InvoiceDocument - 完整发票内容
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceDocument {
    pub header: InvoiceHeader,
    pub tax_mode: TaxMode,
    pub period_label: String,
    pub project_name: String,
    pub lines: Vec<InvoiceLine>,
    pub trips: Vec<TripDetail>,
    pub totals: InvoiceTotals,
    /// 应付金额的印尼语大写，超出拼读范围时为空
    pub amount_in_words: String,
}

impl InvoiceDocument {
    /// 单价不一致的行，供调用方提示
    pub fn price_variance_warnings(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|l| l.price_varies)
            .map(|l| {
                format!(
                    "Invoice line {} ({} / {} / {}): prices differ within group, using {}",
                    l.no, l.route, l.vehicle_type, l.trip_type, l.unit_price
                )
            })
            .collect()
    }
}

// ==========================================
// InvoiceRecap - 发票汇总表（Rekap Invoice）一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRecap {
    pub filename: String,
    pub bill_to: String,
    pub ship_to: String,
    pub invoice_no: String,
    pub invoice_date: String,
    pub currency: String,
    pub due_date: String,
    pub dpp: Decimal,
    pub discount: Decimal,
    pub ppn: Decimal,
    pub pph: Decimal,
    /// DPP - Diskon + PPN - PPH
    pub total_payable: Decimal,
}

/// 汇总表固定列顺序
pub const RECAP_COLUMNS: [&str; 12] = [
    "Filename",
    "Tagihan Kepada",
    "Dikirim Ke",
    "No. Invoice",
    "Invoice Date",
    "Currency",
    "Due Date",
    "DPP",
    "Total Diskon",
    "Total PPN",
    "Total PPH",
    "Total Bayar",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecapStatus {
    Success,
    Failed,
}

/// 单个发票文件的读取结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapOutcome {
    pub filename: String,
    pub status: RecapStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InvoiceRecap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecapOutcome {
    pub fn success(recap: InvoiceRecap) -> Self {
        Self {
            filename: recap.filename.clone(),
            status: RecapStatus::Success,
            data: Some(recap),
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: RecapStatus::Failed,
            data: None,
            error: Some(error.into()),
        }
    }
}
