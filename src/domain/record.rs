// ==========================================
// 运费账单对账系统 - 规范化运单记录
// ==========================================
// 职责: 一行运单的规范化输出（创建后不可变）
// 序列化: 字段名使用印尼语展示列名，与导出表头一致
// ==========================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// 合并导出表的固定列顺序（13 列）
pub const DISPLAY_COLUMNS: [&str; 13] = [
    "Agen Operasional",
    "Kode Tugas",
    "Nama Rute",
    "No. Polisi",
    "Jenis Mobil",
    "Mode Operasi",
    "Metode Perhitungan",
    "Berat",
    "Tarif per Kg",
    "Tarif Sistem",
    "PPN",
    "PPH",
    "Total Aktual",
];

// ==========================================
// NormalizedRecord - 规范化记录
// ==========================================
// 不变量: operating_agent / task_code 非空
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Agen Operasional")]
    pub operating_agent: String,

    #[serde(rename = "Kode Tugas")]
    pub task_code: String,

    #[serde(rename = "Nama Rute")]
    pub route_name: String,

    #[serde(rename = "No. Polisi")]
    pub plate_number: String,

    #[serde(rename = "Jenis Mobil")]
    pub vehicle_type: String,

    /// 小写
    #[serde(rename = "Mode Operasi")]
    pub operation_mode: String,

    /// 小写，去掉 "per/" 前缀
    #[serde(rename = "Metode Perhitungan")]
    pub calculation_method: String,

    /// 预留，始终为空
    #[serde(rename = "Berat")]
    pub weight: String,

    /// 预留，始终为空
    #[serde(rename = "Tarif per Kg")]
    pub rate_per_kg: String,

    #[serde(rename = "Tarif Sistem")]
    pub system_rate: Decimal,

    #[serde(rename = "PPN")]
    pub vat_amount: Decimal,

    #[serde(rename = "PPH")]
    pub tax_withheld: Decimal,

    #[serde(rename = "Total Aktual")]
    pub actual_total: Decimal,

    // ===== 内部溯源字段（不导出） =====
    #[serde(skip)]
    pub source_file: String,

    #[serde(skip)]
    pub departure_date: Option<NaiveDate>,

    /// 源表中的 1-based 行号
    #[serde(skip)]
    pub row_number: usize,
}

/// 导出单元格
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue<'a> {
    Text(&'a str),
    Amount(Decimal),
}

impl NormalizedRecord {
    /// 按 DISPLAY_COLUMNS 顺序输出
    pub fn export_values(&self) -> [ExportValue<'_>; 13] {
        [
            ExportValue::Text(&self.operating_agent),
            ExportValue::Text(&self.task_code),
            ExportValue::Text(&self.route_name),
            ExportValue::Text(&self.plate_number),
            ExportValue::Text(&self.vehicle_type),
            ExportValue::Text(&self.operation_mode),
            ExportValue::Text(&self.calculation_method),
            ExportValue::Text(&self.weight),
            ExportValue::Text(&self.rate_per_kg),
            ExportValue::Amount(self.system_rate),
            ExportValue::Amount(self.vat_amount),
            ExportValue::Amount(self.tax_withheld),
            ExportValue::Amount(self.actual_total),
        ]
    }
}
