// ==========================================
// 运费账单对账系统 - 文件解析器实现
// ==========================================
// 阶段 0: 字节流 → RawSheet（仅读取第一个工作表）
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// ==========================================

use crate::domain::sheet::{excel_serial_to_datetime, Cell, RawSheet};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::manifest_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

/// 取扩展名（小写）
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                excel_serial_to_datetime(serial)
                    .map(Cell::Date)
                    .unwrap_or(Cell::Number(serial))
            }
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(Cell::Date)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }

    /// Range 以第一个非空单元格为原点，这里补齐为绝对坐标
    fn range_to_sheet(name: &str, range: &Range<Data>) -> RawSheet {
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(data_row.iter().map(Self::convert_cell));
            rows.push(cells);
        }

        RawSheet::new(name, rows)
    }

    /// 优先读取指定名称的工作表（大小写不敏感），不存在时读取第一个
    pub fn parse_preferred_sheet(
        &self,
        filename: &str,
        bytes: &[u8],
        preferred: &str,
    ) -> ImportResult<RawSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let target = workbook
            .sheet_names()
            .into_iter()
            .find(|name| name.eq_ignore_ascii_case(preferred));

        let range = match target {
            Some(name) => workbook.worksheet_range(&name)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| ImportError::NoWorksheet(filename.to_string()))??,
        };
        Ok(Self::range_to_sheet(filename, &range))
    }
}

impl FileParser for ExcelParser {
    fn parse_sheet(&self, filename: &str, bytes: &[u8]) -> ImportResult<RawSheet> {
        let ext = file_extension(filename);
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xlsb" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(filename.to_string()));
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::NoWorksheet(filename.to_string()))??;

        Ok(Self::range_to_sheet(filename, &range))
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_sheet(&self, filename: &str, bytes: &[u8]) -> ImportResult<RawSheet> {
        if file_extension(filename) != "csv" {
            return Err(ImportError::UnsupportedFormat(filename.to_string()));
        }

        // 去掉 UTF-8 BOM
        let content = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头行位置由列布局决定
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(Cell::from).collect());
        }

        Ok(RawSheet::new(filename, rows))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheet(&self, filename: &str, bytes: &[u8]) -> ImportResult<RawSheet> {
        match file_extension(filename).as_str() {
            "csv" => CsvParser.parse_sheet(filename, bytes),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => ExcelParser.parse_sheet(filename, bytes),
            _ => Err(ImportError::UnsupportedFormat(filename.to_string())),
        }
    }
}
