// ==========================================
// 运费账单对账系统 - 核心库
// ==========================================
// 输入: 运单表格（固定列布局）+ 主数据（编码 → 路线名）
// 输出: 合并对账表 / 发票工作簿 / 发票汇总表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格、记录与发票对象
pub mod domain;

// 配置层 - 列布局与系统配置
pub mod config;

// 导入层 - 解析、规范化、对账
pub mod importer;

// 报表层 - 工作簿输出
pub mod report;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::types::{FileStatus, RoutePolicy, SingleDotPolicy, TaxMode};

pub use domain::{
    AggregationResult, FileSummary, InvoiceDocument, InvoiceHeader, InvoiceRecap, MasterMapping,
    NormalizedRecord, RawSheet,
};

pub use config::{ConfigManager, ReconConfig, ReconConfigReader};

pub use api::{ApiError, ApiResult, InvoiceApi, RecapApi, ReconApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "运费账单对账系统";
