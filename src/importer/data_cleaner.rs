// ==========================================
// 运费账单对账系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 大小写 / 空值标准化 / 日期解析
// ==========================================

use crate::domain::sheet::Cell;
use chrono::{NaiveDate, NaiveDateTime};

/// 视为空的占位文本（大小写不敏感）
const NULL_TOKENS: [&str; 4] = ["nan", "none", "nat", "null"];

pub struct DataCleaner;

impl DataCleaner {
    /// 标准化 NULL 值（空白 / nan / None / NaT → None）
    pub fn normalize_null(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 单元格 → 清洗后的可空文本
    pub fn cell_text(&self, cell: &Cell) -> Option<String> {
        self.normalize_null(&cell.as_text())
    }

    /// 单元格 → 清洗后的文本，空值为 ""
    pub fn cell_text_or_empty(&self, cell: &Cell) -> String {
        self.cell_text(cell).unwrap_or_default()
    }

    /// Mode Operasi: 小写
    pub fn clean_operation_mode(&self, cell: &Cell) -> String {
        self.cell_text_or_empty(cell).to_lowercase()
    }

    /// Metode Perhitungan: 小写并去掉前缀 "per/"
    pub fn clean_calculation_method(&self, cell: &Cell) -> String {
        let lowered = self.cell_text_or_empty(cell).to_lowercase();
        match lowered.strip_prefix("per/") {
            Some(rest) => rest.trim().to_string(),
            None => lowered,
        }
    }

    /// 出发日期: 日期单元格 / Excel 序列号 / "dd/mm/yyyy [hh:mm]" 等文本
    pub fn parse_departure_date(&self, cell: &Cell) -> Option<NaiveDate> {
        match cell {
            Cell::Date(dt) => Some(dt.date()),
            Cell::Number(n) => {
                crate::domain::sheet::excel_serial_to_datetime(*n).map(|dt| dt.date())
            }
            Cell::Text(s) => self.parse_date_text(s),
            Cell::Empty => None,
        }
    }

    fn parse_date_text(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.date());
        }

        // 仅取日期部分: "23/12/2025 0:58" → "23/12/2025"
        let date_part = trimmed.split_whitespace().next()?;
        const FORMATS: [&str; 5] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null_tokens() {
        let cleaner = DataCleaner;
        for token in ["", "  ", "nan", "NaN", "None", "NaT", "null"] {
            assert_eq!(cleaner.normalize_null(token), None, "token {:?}", token);
        }
        assert_eq!(cleaner.normalize_null("  AGEN  "), Some("AGEN".to_string()));
        assert_eq!(cleaner.normalize_null("nano"), Some("nano".to_string()));
    }

    #[test]
    fn test_calculation_method_prefix() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.clean_calculation_method(&Cell::Text("Per/Trip".to_string())),
            "trip"
        );
        assert_eq!(
            cleaner.clean_calculation_method(&Cell::Text("BORONGAN".to_string())),
            "borongan"
        );
        assert_eq!(cleaner.clean_operation_mode(&Cell::Text(" Sepihak ".to_string())), "sepihak");
    }

    #[test]
    fn test_departure_date_sources() {
        let cleaner = DataCleaner;
        let expected = NaiveDate::from_ymd_opt(2025, 12, 23).unwrap();
        assert_eq!(
            cleaner.parse_departure_date(&Cell::Text("23/12/2025 0:58".to_string())),
            Some(expected)
        );
        assert_eq!(
            cleaner.parse_departure_date(&Cell::Text("2025-12-23".to_string())),
            Some(expected)
        );
        assert_eq!(
            cleaner.parse_departure_date(&Cell::Date(expected.and_hms_opt(7, 30, 0).unwrap())),
            Some(expected)
        );
        assert_eq!(cleaner.parse_departure_date(&Cell::Number(46014.0)), Some(expected));
        assert_eq!(cleaner.parse_departure_date(&Cell::Text("besok".to_string())), None);
    }
}
