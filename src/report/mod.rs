// ==========================================
// 运费账单对账系统 - 报表层
// ==========================================
// 职责: 合并对账表 / 发票工作簿 / 发票汇总表
// 聚合逻辑与单元格样式分文件存放
// ==========================================

pub mod consolidated_writer;
pub mod error;
pub mod filename;
pub mod invoice_builder;
pub mod invoice_writer;
pub mod period;
pub mod recap;
pub mod terbilang;

pub use consolidated_writer::write_consolidated;
pub use error::{ReportError, ReportResult};
pub use filename::{consolidated_filename, invoice_filename, recap_filename, sanitize_suffix};
pub use invoice_builder::{trip_type, InvoiceBuilder};
pub use invoice_writer::{write_invoice, InvoiceLabels};
pub use period::period_label;
pub use recap::{write_recap, RecapReader};
pub use terbilang::{amount_in_words, rupiah_in_words};
