// ==========================================
// 运费账单对账系统 - 行抽取器
// ==========================================
// 职责: RawSheet → (NormalizedRecord 列表, 异常提示, 主数据未命中编码)
// 行状态: 候选 → {接受, 空行丢弃, 页脚/签名丢弃}
//   1. 列数预检（整表）
//   2. Agen Operasional / Kode Tugas 任一为空 → 静默丢弃
//   3. 页脚关键字 / 以 ":" 结尾 / Total Aktual 缺失 → 静默丢弃
//   4. 规范化 + 路线名解析
//   5. 格式校验 → 警告（保留行）
// 结果以返回值输出，不共享可变集合
// ==========================================

use crate::config::{ColumnLayout, ReconConfig};
use crate::domain::master::MasterMapping;
use crate::domain::record::NormalizedRecord;
use crate::domain::sheet::RawSheet;
use crate::importer::amount_parser::{AmountParser, ParsedAmount};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::route_resolver::RouteResolver;
use std::collections::BTreeSet;
use tracing::debug;

/// 静默丢弃原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Agen Operasional 或 Kode Tugas 为空
    Blank,
    /// Kode Tugas 含页脚/签名关键字
    FooterKeyword,
    /// Kode Tugas 以 ":" 结尾
    LabelRow,
    /// Total Aktual 为空或无法解析
    MissingTotal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub row_number: usize,
    pub reason: DropReason,
}

/// 单表抽取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionOutcome {
    pub records: Vec<NormalizedRecord>,
    /// 行级格式警告（按行顺序）
    pub anomalies: Vec<String>,
    pub missing_codes: BTreeSet<String>,
    /// 审计用，不对外展示
    pub dropped: Vec<DroppedRow>,
}

/// 单行判定
enum RowDisposition {
    Accepted {
        record: Box<NormalizedRecord>,
        anomalies: Vec<String>,
        missing: Option<String>,
    },
    Dropped(DropReason),
}

pub struct RowExtractor {
    layout: ColumnLayout,
    footer_keywords: Vec<String>,
    warn_unparseable: bool,
    cleaner: DataCleaner,
    amounts: AmountParser,
    resolver: RouteResolver,
    validator: DqValidator,
}

impl RowExtractor {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            layout: config.layout,
            footer_keywords: config
                .footer_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            warn_unparseable: config.warn_unparseable_amounts,
            cleaner: DataCleaner,
            amounts: AmountParser::new(config.single_dot_policy),
            resolver: RouteResolver::new(config.route_policy),
            validator: DqValidator::new(&config.valid_vehicle_types),
        }
    }

    /// 抽取整张表
    ///
    /// # 返回
    /// - Err(InsufficientColumns): 列数不足，整表拒绝
    pub fn extract(
        &self,
        sheet: &RawSheet,
        mapping: &MasterMapping,
    ) -> ImportResult<ExtractionOutcome> {
        self.layout.validate(sheet)?;

        let mut outcome = ExtractionOutcome::default();
        for row_idx in self.layout.first_data_row()..sheet.height() {
            let row_number = row_idx + 1;
            match self.process_row(sheet, row_idx, mapping) {
                RowDisposition::Accepted {
                    record,
                    anomalies,
                    missing,
                } => {
                    outcome.records.push(*record);
                    outcome.anomalies.extend(anomalies);
                    outcome.missing_codes.extend(missing);
                }
                RowDisposition::Dropped(reason) => {
                    if reason != DropReason::Blank {
                        debug!(file = %sheet.name(), row = row_number, reason = ?reason, "丢弃行");
                    }
                    outcome.dropped.push(DroppedRow { row_number, reason });
                }
            }
        }

        Ok(outcome)
    }

    fn process_row(&self, sheet: &RawSheet, row_idx: usize, mapping: &MasterMapping) -> RowDisposition {
        let layout = &self.layout;
        let cell = |col: usize| sheet.cell(row_idx, col);
        let row_number = row_idx + 1;

        // === 步骤 1: 主键字段 ===
        let agent = self.cleaner.cell_text(cell(layout.operating_agent));
        let code = self.cleaner.cell_text(cell(layout.task_code));
        let (operating_agent, task_code) = match (agent, code) {
            (Some(agent), Some(code)) => (agent, code),
            _ => return RowDisposition::Dropped(DropReason::Blank),
        };

        // === 步骤 2: 页脚/签名行 ===
        let code_lower = task_code.to_lowercase();
        if self
            .footer_keywords
            .iter()
            .any(|k| code_lower.contains(k.as_str()))
        {
            return RowDisposition::Dropped(DropReason::FooterKeyword);
        }
        if task_code.trim_end().ends_with(':') {
            return RowDisposition::Dropped(DropReason::LabelRow);
        }

        let total_cell = cell(layout.actual_total);
        let actual_total = match self.amounts.parse_cell(total_cell) {
            ParsedAmount::Value(v) => v,
            ParsedAmount::Absent | ParsedAmount::Unparseable(_) => {
                return RowDisposition::Dropped(DropReason::MissingTotal)
            }
        };

        // === 步骤 3: 金额字段 ===
        let mut anomalies = Vec::new();
        let mut amount = |col: usize, field: &str| {
            let parsed = self.amounts.parse_cell(cell(col));
            if let (true, ParsedAmount::Unparseable(raw)) = (self.warn_unparseable, &parsed) {
                anomalies.push(DqValidator::unparseable_amount(row_number, field, raw));
            }
            parsed.or_zero()
        };
        let system_rate = amount(layout.system_rate, "Tarif Sistem");
        let vat_amount = amount(layout.vat_amount, "PPN");
        let tax_withheld = amount(layout.tax_withheld, "PPH");

        // === 步骤 4: 路线名 ===
        let raw_route = self.cleaner.cell_text_or_empty(cell(layout.route));
        let resolution = self.resolver.resolve(&task_code, &raw_route, mapping);

        let record = NormalizedRecord {
            operating_agent,
            task_code,
            route_name: resolution.route_name,
            plate_number: self.cleaner.cell_text_or_empty(cell(layout.plate_number)),
            vehicle_type: self.cleaner.cell_text_or_empty(cell(layout.vehicle_type)),
            operation_mode: self.cleaner.clean_operation_mode(cell(layout.operation_mode)),
            calculation_method: self
                .cleaner
                .clean_calculation_method(cell(layout.calculation_method)),
            weight: String::new(),
            rate_per_kg: String::new(),
            system_rate,
            vat_amount,
            tax_withheld,
            actual_total,
            source_file: sheet.name().to_string(),
            departure_date: self
                .cleaner
                .parse_departure_date(cell(layout.departure_date)),
            row_number,
        };

        // === 步骤 5: 格式校验 ===
        anomalies.extend(self.validator.validate(&record));

        RowDisposition::Accepted {
            record: Box::new(record),
            anomalies,
            missing: resolution.missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheet::Cell;
    use rust_decimal_macros::dec;

    /// 23 列的行，按默认布局填充
    fn row(agent: &str, code: &str, route: &str, vehicle: &str, total: Cell) -> Vec<Cell> {
        let mut cells = vec![Cell::Empty; 23];
        cells[1] = Cell::from(agent);
        cells[3] = Cell::from(code);
        cells[6] = Cell::from(route);
        cells[7] = Cell::from("B 9001 XYZ");
        cells[8] = Cell::from(vehicle);
        cells[9] = Cell::from("Sepihak");
        cells[10] = Cell::from("23/12/2025 0:58");
        cells[14] = Cell::from("Per/Trip");
        cells[15] = Cell::Number(1500000.0);
        cells[20] = Cell::from("16.500");
        cells[21] = Cell::from("-30.000");
        cells[22] = total;
        cells
    }

    fn sheet(data: Vec<Vec<Cell>>) -> RawSheet {
        let mut rows = vec![vec![Cell::Empty; 23]; 3];
        rows.push(vec![Cell::from("HEADER"); 23]);
        rows.extend(data);
        RawSheet::new("manifest.xlsx", rows)
    }

    fn extractor() -> RowExtractor {
        RowExtractor::new(&ReconConfig::default())
    }

    #[test]
    fn test_accepts_valid_row() {
        let s = sheet(vec![row(
            "AGEN JKT",
            "TSK-001",
            "BGR-SOC-A001-X",
            "CDDL",
            Cell::from("1.486.500"),
        )]);
        let outcome = extractor().extract(&s, &MasterMapping::new()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        let r = &outcome.records[0];
        assert_eq!(r.route_name, "BGR-SOC-A001");
        assert_eq!(r.operation_mode, "sepihak");
        assert_eq!(r.calculation_method, "trip");
        assert_eq!(r.system_rate, dec!(1500000));
        assert_eq!(r.vat_amount, dec!(16500));
        assert_eq!(r.tax_withheld, dec!(-30000));
        assert_eq!(r.actual_total, dec!(1486500));
        assert_eq!(r.row_number, 5);
        assert_eq!(r.source_file, "manifest.xlsx");
        assert!(r.departure_date.is_some());
        assert!(outcome.anomalies.is_empty());
    }

    #[test]
    fn test_out_of_range_departure_serial_keeps_row() {
        let mut bad_date = row("AGEN", "TSK-001", "A-B-C", "CDDL", Cell::Number(100.0));
        bad_date[10] = Cell::Number(1e20);
        let s = sheet(vec![
            bad_date,
            row("AGEN", "TSK-002", "A-B-C", "CDDL", Cell::Number(200.0)),
        ]);
        let outcome = extractor().extract(&s, &MasterMapping::new()).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records[0].departure_date.is_none());
        assert!(outcome.records[1].departure_date.is_some());
    }

    #[test]
    fn test_silent_drops() {
        let s = sheet(vec![
            row("", "TSK-001", "R", "CDDL", Cell::Number(1.0)),
            row("AGEN", "nan", "R", "CDDL", Cell::Number(1.0)),
            row("AGEN", "Disetujui oleh: ___", "", "", Cell::Number(1.0)),
            row("AGEN", "TOTAL", "", "", Cell::Number(9.0)),
            row("AGEN", "Catatan :", "", "", Cell::Number(1.0)),
            row("AGEN", "TSK-002", "R", "CDDL", Cell::Empty),
            row("AGEN", "TSK-003", "R", "CDDL", Cell::Number(100.0)),
        ]);
        let outcome = extractor().extract(&s, &MasterMapping::new()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].task_code, "TSK-003");
        assert!(outcome.anomalies.is_empty());
        let reasons: Vec<DropReason> = outcome.dropped.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::Blank,
                DropReason::Blank,
                DropReason::FooterKeyword,
                DropReason::FooterKeyword,
                DropReason::LabelRow,
                DropReason::MissingTotal,
            ]
        );
    }

    #[test]
    fn test_format_violations_keep_row() {
        let s = sheet(vec![row("AGEN", "TSK-1", "R", "FUSO", Cell::Number(10.0))]);
        let outcome = extractor().extract(&s, &MasterMapping::new()).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(
            outcome.anomalies,
            vec!["Row 5: Jenis Mobil is 'FUSO' (Expected: 'CDDL/TWB')".to_string()]
        );
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let s = sheet(vec![
            row("AGEN", "A", "R", "TWB", Cell::Number(1.0)),
            row("AGEN", "Dicek oleh", "", "", Cell::Number(1.0)),
            row("AGEN", "B", "R", "TWB", Cell::Number(2.0)),
        ]);
        let first = extractor().extract(&s, &MasterMapping::new()).unwrap();
        let second = extractor().extract(&s, &MasterMapping::new()).unwrap();
        assert_eq!(first, second);
        let codes: Vec<&str> = first.records.iter().map(|r| r.task_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[test]
    fn test_missing_codes_collected() {
        let mut mapping = MasterMapping::new();
        mapping.insert("A", "MAPPED-ROUTE");
        let s = sheet(vec![
            row("AGEN", "A", "R-S-T-U", "TWB", Cell::Number(1.0)),
            row("AGEN", "Z", "R-S-T-U", "TWB", Cell::Number(1.0)),
        ]);
        let outcome = extractor().extract(&s, &mapping).unwrap();
        assert_eq!(outcome.records[0].route_name, "MAPPED-ROUTE");
        assert_eq!(outcome.records[1].route_name, "R-S-T");
        assert_eq!(outcome.missing_codes.into_iter().collect::<Vec<_>>(), vec!["Z"]);
    }

    #[test]
    fn test_unparseable_warning_is_opt_in() {
        let mut bad = row("AGEN", "A", "R", "TWB", Cell::Number(1.0));
        bad[20] = Cell::from("N/A");
        let s = sheet(vec![bad]);

        let quiet = extractor().extract(&s, &MasterMapping::new()).unwrap();
        assert!(quiet.anomalies.is_empty());
        assert_eq!(quiet.records[0].vat_amount, dec!(0));

        let config = ReconConfig {
            warn_unparseable_amounts: true,
            ..ReconConfig::default()
        };
        let strict = RowExtractor::new(&config)
            .extract(&s, &MasterMapping::new())
            .unwrap();
        assert_eq!(
            strict.anomalies,
            vec!["Row 5: PPN value 'N/A' is not a number".to_string()]
        );
    }

    #[test]
    fn test_narrow_sheet_rejected() {
        let s = RawSheet::new("narrow.xlsx", vec![vec![Cell::Empty; 10]; 6]);
        assert!(extractor().extract(&s, &MasterMapping::new()).is_err());
    }
}
