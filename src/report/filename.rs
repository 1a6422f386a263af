// ==========================================
// 运费账单对账系统 - 输出文件名
// ==========================================

use crate::report::invoice_builder::source_name_parts;
use chrono::NaiveDateTime;
use std::path::Path;

/// 文件名中不允许的字符
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// 无记录时的发票文件名
pub const EMPTY_INVOICE_FILENAME: &str = "Consolidated_Invoice.xlsx";

/// 去掉非法字符并 TRIM
pub fn sanitize_suffix(suffix: &str) -> String {
    suffix
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// "<前缀>_<后缀>.xlsx"，后缀为空时用日期 YYYYMMDD
pub fn consolidated_filename(prefix: &str, suffix: Option<&str>, now: NaiveDateTime) -> String {
    let suffix = suffix.map(sanitize_suffix).unwrap_or_default();
    let tail = if suffix.is_empty() {
        now.format("%Y%m%d").to_string()
    } else {
        suffix
    };
    format!("{}_{}.xlsx", prefix, tail)
}

/// "22-31 Desember 2025_BGR_..." → "INVOICE GLOBAL JET EXPRESS-BGR 22-31 DESEMBER 2025.xlsx"
/// 不匹配时 → "INVOICE <文件名主干大写>.xlsx"
pub fn invoice_filename(client_label: &str, first_source_file: Option<&str>) -> String {
    let source = match first_source_file {
        Some(s) if !s.trim().is_empty() => s,
        _ => return EMPTY_INVOICE_FILENAME.to_string(),
    };
    match source_name_parts(source) {
        Some((date_part, code)) => format!("INVOICE {}-{} {}.xlsx", client_label, code, date_part),
        None => {
            let stem = Path::new(source)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(source);
            format!("INVOICE {}.xlsx", stem.to_uppercase())
        }
    }
}

/// "Rekap_Invoice_YYYYMMDD_HHMMSS.xlsx"
pub fn recap_filename(now: NaiveDateTime) -> String {
    format!("Rekap_Invoice_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}
