// ==========================================
// 运费账单对账系统 - 文件聚合器
// ==========================================
// 职责: 逐文件抽取 → 合并为 AggregationResult
//   - 文件之间隔离：结构错误 → "Error: Columns"，其他失败 → "Error"
//   - 记录按 文件顺序 + 文件内行顺序 拼接
//   - 全局警告: 各文件行级警告 + 总额为负检查，按文本去重
//   - 主数据未命中编码: 排序去重后原样返回，由调用方决定展示
// ==========================================

use crate::config::ReconConfig;
use crate::domain::master::MasterMapping;
use crate::domain::record::NormalizedRecord;
use crate::domain::sheet::RawSheet;
use crate::domain::summary::{AggregationResult, FileSummary};
use crate::domain::types::FileStatus;
use crate::importer::error::ImportError;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::manifest_importer_trait::{FileParser, SourceFile};
use crate::importer::row_extractor::RowExtractor;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 单文件处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub summary: FileSummary,
    pub records: Vec<NormalizedRecord>,
    pub missing_codes: BTreeSet<String>,
}

impl FileOutcome {
    pub fn failed(filename: impl Into<String>, status: FileStatus) -> Self {
        Self {
            summary: FileSummary::failed(filename, status),
            records: Vec::new(),
            missing_codes: BTreeSet::new(),
        }
    }
}

pub struct FileAggregator {
    extractor: RowExtractor,
    parser: UniversalFileParser,
}

impl FileAggregator {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            extractor: RowExtractor::new(config),
            parser: UniversalFileParser,
        }
    }

    /// 处理一个上传文件（解析 + 抽取）
    pub fn process_file(&self, filename: &str, bytes: &[u8], mapping: &MasterMapping) -> FileOutcome {
        match self.parser.parse_sheet(filename, bytes) {
            Ok(sheet) => self.process_sheet(&sheet, mapping),
            Err(e) => {
                warn!(file = %filename, error = %e, "文件解析失败");
                FileOutcome::failed(filename, FileStatus::Error)
            }
        }
    }

    /// 处理一张已解析的工作表
    pub fn process_sheet(&self, sheet: &RawSheet, mapping: &MasterMapping) -> FileOutcome {
        match self.extractor.extract(sheet, mapping) {
            Ok(outcome) => {
                let Some(summary) =
                    FileSummary::from_records(sheet.name(), &outcome.records, outcome.anomalies)
                else {
                    warn!(file = %sheet.name(), rows = outcome.records.len(), "金额合计超出范围，整表拒绝");
                    return FileOutcome::failed(sheet.name(), FileStatus::Error);
                };
                info!(
                    file = %sheet.name(),
                    rows = summary.rows,
                    amount = %summary.amount,
                    anomalies = summary.anomalies.len(),
                    dropped = outcome.dropped.len(),
                    "文件处理完成"
                );
                FileOutcome {
                    summary,
                    records: outcome.records,
                    missing_codes: outcome.missing_codes,
                }
            }
            Err(ImportError::InsufficientColumns { found, required }) => {
                warn!(file = %sheet.name(), found, required, "列数不足，整表拒绝");
                FileOutcome::failed(sheet.name(), FileStatus::ErrorColumns)
            }
            Err(e) => {
                warn!(file = %sheet.name(), error = %e, "文件处理失败");
                FileOutcome::failed(sheet.name(), FileStatus::Error)
            }
        }
    }

    /// 顺序处理全部文件
    #[instrument(skip(self, files, mapping), fields(run_id = %Uuid::new_v4(), files = files.len()))]
    pub fn aggregate(&self, files: &[SourceFile], mapping: &MasterMapping) -> AggregationResult {
        let outcomes = files
            .iter()
            .map(|f| self.process_file(&f.filename, &f.bytes, mapping))
            .collect();
        combine(outcomes)
    }

    /// 顺序处理已解析的工作表
    pub fn aggregate_sheets(&self, sheets: &[RawSheet], mapping: &MasterMapping) -> AggregationResult {
        let outcomes = sheets
            .iter()
            .map(|s| self.process_sheet(s, mapping))
            .collect();
        combine(outcomes)
    }
}

/// 总额为负的提示
pub fn negative_total_warning(total: Decimal) -> String {
    format!(
        "Grand total of Total Aktual is negative ({}); check for shifted columns",
        total
    )
}

/// 总额超出可表示范围的提示
pub fn total_overflow_warning() -> String {
    "Grand total of Total Aktual exceeds the supported range; total is not reported".to_string()
}

/// 按输入顺序合并各文件结果
pub fn combine(outcomes: Vec<FileOutcome>) -> AggregationResult {
    let mut result = AggregationResult::default();
    let mut raw_warnings = Vec::new();
    let mut missing = BTreeSet::new();

    for outcome in outcomes {
        raw_warnings.extend(outcome.summary.anomalies.iter().cloned());
        result.records.extend(outcome.records);
        result.file_summaries.push(outcome.summary);
        missing.extend(outcome.missing_codes);
    }

    let total = result.total_amount();
    match total {
        Some(t) if t < Decimal::ZERO => raw_warnings.push(negative_total_warning(t)),
        Some(_) => {}
        None => raw_warnings.push(total_overflow_warning()),
    }

    result.warnings = dedup_warnings(raw_warnings);
    result.missing_codes = missing.into_iter().collect();

    info!(
        files = result.file_summaries.len(),
        rows = result.total_rows(),
        total_amount = ?total,
        warnings = result.warnings.len(),
        missing_codes = result.missing_codes.len(),
        "聚合完成"
    );
    result
}

/// 文本完全相同的警告只保留第一次出现
pub fn dedup_warnings(warnings: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    warnings
        .into_iter()
        .filter(|w| seen.insert(w.clone()))
        .collect()
}
