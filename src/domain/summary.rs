// ==========================================
// 运费账单对账系统 - 文件汇总与聚合结果
// ==========================================

use crate::domain::record::NormalizedRecord;
use crate::domain::types::FileStatus;
use rust_decimal::Decimal;
use serde::Serialize;

/// 缺失编码提示中内联展示的样例数量
pub const MISSING_CODE_SAMPLE_LIMIT: usize = 3;

/// 金额求和，超出 Decimal 范围时返回 None
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

// ==========================================
// FileSummary - 单文件汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub status: FileStatus,
    pub rows: usize,
    /// 实际总额合计（Total Aktual）
    pub amount: Decimal,
    pub ppn: Decimal,
    pub pph: Decimal,
    pub anomalies: Vec<String>,
}

impl FileSummary {
    /// 结构性失败或异常失败：零行、无异常明细
    pub fn failed(filename: impl Into<String>, status: FileStatus) -> Self {
        Self {
            filename: filename.into(),
            status,
            rows: 0,
            amount: Decimal::ZERO,
            ppn: Decimal::ZERO,
            pph: Decimal::ZERO,
            anomalies: Vec::new(),
        }
    }

    /// 由抽取结果汇总；任一金额合计溢出时返回 None
    pub fn from_records(
        filename: impl Into<String>,
        records: &[NormalizedRecord],
        anomalies: Vec<String>,
    ) -> Option<Self> {
        let status = if anomalies.is_empty() {
            FileStatus::Success
        } else {
            FileStatus::Warning
        };
        Some(Self {
            filename: filename.into(),
            status,
            rows: records.len(),
            amount: checked_sum(records.iter().map(|r| r.actual_total))?,
            ppn: checked_sum(records.iter().map(|r| r.vat_amount))?,
            pph: checked_sum(records.iter().map(|r| r.tax_withheld))?,
            anomalies,
        })
    }
}

// ==========================================
// AggregationResult - 聚合结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationResult {
    pub records: Vec<NormalizedRecord>,
    pub file_summaries: Vec<FileSummary>,
    /// 去重后的全局警告（首次出现顺序）
    pub warnings: Vec<String>,
    /// 主数据未命中的 Kode Tugas（排序、去重）
    pub missing_codes: Vec<String>,
}

impl AggregationResult {
    pub fn total_rows(&self) -> usize {
        self.records.len()
    }

    /// Total Aktual 总计，超出范围时为 None
    pub fn total_amount(&self) -> Option<Decimal> {
        checked_sum(self.records.iter().map(|r| r.actual_total))
    }

    /// 缺失编码的展示文本，无缺失时返回 None
    pub fn missing_codes_warning(&self) -> Option<String> {
        format_missing_codes(&self.missing_codes)
    }
}

/// "N Kode Tugas not found in Master Data (using default name): A, B, C…"
pub fn format_missing_codes(codes: &[String]) -> Option<String> {
    if codes.is_empty() {
        return None;
    }
    let sample = codes
        .iter()
        .take(MISSING_CODE_SAMPLE_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let ellipsis = if codes.len() > MISSING_CODE_SAMPLE_LIMIT {
        "…"
    } else {
        ""
    };
    Some(format!(
        "{} Kode Tugas not found in Master Data (using default name): {}{}",
        codes.len(),
        sample,
        ellipsis
    ))
}
