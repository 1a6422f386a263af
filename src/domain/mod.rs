// ==========================================
// 运费账单对账系统 - 领域层
// ==========================================
// 职责: 原始表格、规范化记录、主数据、汇总与发票对象
// ==========================================

pub mod invoice;
pub mod master;
pub mod record;
pub mod sheet;
pub mod summary;
pub mod types;

pub use invoice::{
    InvoiceDocument, InvoiceHeader, InvoiceLine, InvoiceRecap, InvoiceTotals, RecapOutcome,
    RecapStatus, TripDetail, RECAP_COLUMNS,
};
pub use master::{MasterEntry, MasterMapping};
pub use record::{ExportValue, NormalizedRecord, DISPLAY_COLUMNS};
pub use sheet::{Cell, RawSheet};
pub use summary::{AggregationResult, FileSummary};
pub use types::{FileStatus, RoutePolicy, SingleDotPolicy, TaxMode};
