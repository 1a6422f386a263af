// ==========================================
// 运费账单对账系统 - 配置层
// ==========================================
// 职责: 系统配置管理，支持文件与环境变量覆写
// 存储: 内存 key-value
// ==========================================

pub mod column_layout;
pub mod config_manager;
pub mod recon_config_trait;

// 重导出核心配置管理器
pub use column_layout::ColumnLayout;
pub use config_manager::{config_keys, ConfigManager};
pub use recon_config_trait::{ReconConfig, ReconConfigReader};
