// ==========================================
// 运费账单对账系统 - API层错误类型
// ==========================================
// 职责: 定义请求级错误，转换导入层/报表层错误为调用方可读的消息
// 只有请求级失败才走这里；行级、文件级问题体现在响应的汇总与警告中
// ==========================================

use crate::importer::error::ImportError;
use crate::report::error::ReportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    /// 未上传任何运单文件
    #[error("未提供运单文件")]
    EmptyInput,

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 下层错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("报表生成失败: {0}")]
    ReportError(String),

    /// 没有可汇总的发票
    #[error("无可输出的数据: {0}")]
    NothingToExport(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::PastedDataError(msg) => {
                ApiError::InvalidInput(format!("粘贴的主数据无法解析: {}", msg))
            }
            // 粘贴内容找不到编码/名称列时同样属于调用方输入问题
            e @ ImportError::MasterColumnsNotFound { .. } => ApiError::InvalidInput(e.to_string()),
            e @ (ImportError::ConfigReadError { .. } | ImportError::ConfigValueError { .. }) => {
                ApiError::ConfigError(e.to_string())
            }
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ReportError 转换
// ==========================================
impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            e @ ReportError::EmptyRecap => ApiError::NothingToExport(e.to_string()),
            // 金额来自上传文件，属于输入问题
            e @ ReportError::AmountOverflow(_) => ApiError::InvalidInput(e.to_string()),
            ReportError::Xlsx(e) => ApiError::ReportError(e.to_string()),
            ReportError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
