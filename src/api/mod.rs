// ==========================================
// 运费账单对账系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行或外部服务调用
// ==========================================

pub mod error;
pub mod invoice_api;
pub mod recap_api;
pub mod recon_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use invoice_api::{InvoiceApi, InvoiceRequest, InvoiceResponse};
pub use recap_api::{RecapApi, RecapExport, RecapResponse};
pub use recon_api::{load_master_mapping, ReconApi, ReconRequest, ReconResponse, ReconSummary};
