// ==========================================
// 运费账单对账系统 - 发票汇总（Rekap Invoice）
// ==========================================
// 读取: 已开具的发票工作簿（INVOICE 表，缺失时取第一个表）
//   - 固定单元格: B7 / B12 / J8 / J13 / K13 / K15
//   - 合计金额: 在 H 列前 50 行中按关键字查找，取同行 K 列
//   - Total Bayar = DPP - Diskon + PPN - PPH
// 输出: 单表 "Rekap Invoice"，固定 12 列
// ==========================================

use crate::domain::invoice::{InvoiceRecap, RecapOutcome, RECAP_COLUMNS};
use crate::domain::sheet::{Cell, RawSheet};
use crate::importer::amount_parser::AmountParser;
use crate::importer::file_parser::{file_extension, ExcelParser};
use crate::report::consolidated_writer::amount_f64;
use crate::report::error::{ReportError, ReportResult};
use crate::report::invoice_writer::{cells, INVOICE_SHEET};
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::path::Path;
use tracing::{info, warn};

pub const RECAP_SHEET_NAME: &str = "Rekap Invoice";

/// 关键字查找的行数上限
const SEARCH_ROWS: usize = 50;

const DPP_KEYWORDS: [&str; 2] = ["total dasar pengenaan pajak", "dpp"];
const DISCOUNT_KEYWORDS: [&str; 2] = ["total diskon", "diskon"];
const PPN_KEYWORDS: [&str; 3] = ["total ppn (1.1%)", "total ppn", "ppn"];
const PPH_KEYWORDS: [&str; 4] = ["total pph 23 (2%)", "total pph", "pph 23", "pph"];

/// PPN 免征标记
const VAT_EXEMPT_MARKER: &str = "dibebaskan";

pub const NOT_XLSX_ERROR: &str = "Bukan file Excel (.xlsx)";
pub const MISSING_INVOICE_NO_ERROR: &str = "Validasi Gagal: 'No. Invoice' (J8) tidak ditemukan.";

#[derive(Default)]
pub struct RecapReader {
    amounts: AmountParser,
}

impl RecapReader {
    /// 读取一个发票文件；失败时返回带原因的 RecapOutcome
    pub fn read(&self, filename: &str, bytes: &[u8]) -> RecapOutcome {
        if file_extension(filename) != "xlsx" {
            return RecapOutcome::failed(filename, NOT_XLSX_ERROR);
        }

        let display_name = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_string();

        let sheet = match ExcelParser.parse_preferred_sheet(filename, bytes, INVOICE_SHEET) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(file = %filename, error = %e, "发票文件读取失败");
                return RecapOutcome::failed(display_name, format!("Error processing file: {}", e));
            }
        };

        match self.extract(&sheet, &display_name) {
            Ok(recap) => RecapOutcome::success(recap),
            Err(message) => RecapOutcome::failed(display_name, message),
        }
    }

    /// 抽取汇总行；失败时返回面向用户的原因
    pub fn extract(&self, sheet: &RawSheet, display_name: &str) -> Result<InvoiceRecap, String> {
        let fixed = |(row, col): (u32, u16)| display_text(sheet.cell(row as usize, col as usize));

        let invoice_no = fixed(cells::INVOICE_NO);
        if invoice_no.is_empty() {
            return Err(MISSING_INVOICE_NO_ERROR.to_string());
        }

        let dpp = self.find_amount(sheet, &DPP_KEYWORDS).map(|(v, _)| v);
        let discount = self.find_amount(sheet, &DISCOUNT_KEYWORDS).map(|(v, _)| v);
        let ppn = self
            .find_amount(sheet, &PPN_KEYWORDS)
            .map(|(v, label)| if label.contains(VAT_EXEMPT_MARKER) { Decimal::ZERO } else { v });
        let pph = self.find_amount(sheet, &PPH_KEYWORDS).map(|(v, _)| v);

        let dpp = dpp.unwrap_or_default();
        let discount = discount.unwrap_or_default();
        let ppn = ppn.unwrap_or_default();
        let pph = pph.unwrap_or_default();

        let total_payable = dpp
            .checked_sub(discount)
            .and_then(|v| v.checked_add(ppn))
            .and_then(|v| v.checked_sub(pph))
            .ok_or_else(|| {
                let e = ReportError::AmountOverflow("Total Bayar".to_string());
                warn!(file = %display_name, error = %e, "发票合计无法计算");
                format!("Error processing file: {}", e)
            })?;

        Ok(InvoiceRecap {
            filename: display_name.to_string(),
            bill_to: fixed(cells::BILL_TO),
            ship_to: fixed(cells::SHIP_TO),
            invoice_no,
            invoice_date: fixed(cells::INVOICE_DATE),
            currency: clean_currency(&fixed(cells::CURRENCY)),
            due_date: fixed(cells::DUE_DATE),
            dpp,
            discount,
            ppn,
            pph,
            total_payable,
        })
    }

    /// 逐行查找：第一行中包含任一关键字的标签胜出
    fn find_amount(&self, sheet: &RawSheet, keywords: &[&str]) -> Option<(Decimal, String)> {
        (0..SEARCH_ROWS.min(sheet.height())).find_map(|row| {
            let label = display_text(sheet.cell(row, cells::TOTAL_LABEL_COL as usize)).to_lowercase();
            if label.is_empty() || !keywords.iter().any(|k| label.contains(k)) {
                return None;
            }
            let value = self
                .amounts
                .normalize(sheet.cell(row, cells::TOTAL_VALUE_COL as usize));
            Some((value, label))
        })
    }
}

/// 单元格展示文本；日期按 YYYY-MM-DD
fn display_text(cell: &Cell) -> String {
    match cell {
        Cell::Date(dt) => dt.format("%Y-%m-%d").to_string(),
        other => other.as_text().trim().to_string(),
    }
}

/// "Currency\nIDR" → "IDR"
pub fn clean_currency(raw: &str) -> String {
    raw.to_lowercase()
        .replace("currency", "")
        .replace(['\n', '\r'], "")
        .trim()
        .to_uppercase()
}

/// 输出汇总表
pub fn write_recap(recaps: &[InvoiceRecap]) -> ReportResult<Vec<u8>> {
    if recaps.is_empty() {
        return Err(ReportError::EmptyRecap);
    }

    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let amount = Format::new().set_num_format("#,##0.##");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(RECAP_SHEET_NAME)?;

    for (col, title) in RECAP_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
        sheet.set_column_width(col as u16, 20)?;
    }

    for (idx, recap) in recaps.iter().enumerate() {
        let row = (idx + 1) as u32;
        let texts = [
            &recap.filename,
            &recap.bill_to,
            &recap.ship_to,
            &recap.invoice_no,
            &recap.invoice_date,
            &recap.currency,
            &recap.due_date,
        ];
        for (col, text) in texts.iter().enumerate() {
            sheet.write_string(row, col as u16, text.as_str())?;
        }
        let amounts = [
            recap.dpp,
            recap.discount,
            recap.ppn,
            recap.pph,
            recap.total_payable,
        ];
        for (offset, value) in amounts.iter().enumerate() {
            sheet.write_number_with_format(row, (texts.len() + offset) as u16, amount_f64(*value), &amount)?;
        }
    }

    info!(invoices = recaps.len(), "发票汇总表生成完成");
    Ok(workbook.save_to_buffer()?)
}
