// ==========================================
// 运费账单对账系统 - 报表层错误类型
// ==========================================

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("工作簿写入失败: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("没有可汇总的发票")]
    EmptyRecap,

    /// 金额运算超出 Decimal 范围
    #[error("金额超出可表示范围: {0}")]
    AmountOverflow(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
