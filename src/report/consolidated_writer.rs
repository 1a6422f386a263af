// ==========================================
// 运费账单对账系统 - 合并对账表输出
// ==========================================
// 单工作表: 13 个固定列 + 样式化表头，不含内部溯源字段
// ==========================================

use crate::domain::record::{ExportValue, NormalizedRecord, DISPLAY_COLUMNS};
use crate::report::error::ReportResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

pub const CONSOLIDATED_SHEET_NAME: &str = "Rekonsiliasi";

/// 金额写出为数值
pub(crate) fn amount_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

pub fn write_consolidated(records: &[NormalizedRecord]) -> ReportResult<Vec<u8>> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x1F4E78))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let text_format = Format::new().set_border(FormatBorder::Thin);
    let amount_format = Format::new()
        .set_num_format("#,##0.##")
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(CONSOLIDATED_SHEET_NAME)?;

    for (col, title) in DISPLAY_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        sheet.set_column_width(col as u16, 18)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in record.export_values().iter().enumerate() {
            match value {
                ExportValue::Text(text) => {
                    sheet.write_string_with_format(row, col as u16, *text, &text_format)?;
                }
                ExportValue::Amount(amount) => {
                    sheet.write_number_with_format(
                        row,
                        col as u16,
                        amount_f64(*amount),
                        &amount_format,
                    )?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
