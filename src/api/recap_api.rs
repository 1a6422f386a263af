// ==========================================
// 运费账单对账系统 - 发票汇总API
// ==========================================
// 职责: 已开具的发票工作簿 → 每个文件的读取结果 + Rekap Invoice 表
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::invoice::{InvoiceRecap, RecapOutcome, RecapStatus};
use crate::importer::SourceFile;
use crate::report::{recap_filename, write_recap, RecapReader};
use chrono::Local;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// 读取结果（逐文件，顺序与输入一致）
#[derive(Debug, Clone, Serialize)]
pub struct RecapResponse {
    pub results: Vec<RecapOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl RecapResponse {
    /// 读取成功的汇总行
    pub fn recaps(&self) -> Vec<InvoiceRecap> {
        self.results.iter().filter_map(|r| r.data.clone()).collect()
    }
}

/// 汇总表导出结果
#[derive(Debug, Clone, Serialize)]
pub struct RecapExport {
    pub filename: String,
    pub rows: usize,
    #[serde(skip)]
    pub generated_file: Vec<u8>,
}

/// 发票汇总API
#[derive(Default)]
pub struct RecapApi {
    reader: Arc<RecapReader>,
}

impl RecapApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 并发读取多个发票文件，单个文件失败不影响其他文件
    pub async fn read_invoices(&self, files: Vec<SourceFile>) -> ApiResult<RecapResponse> {
        if files.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let tasks = files.into_iter().map(|file| {
            let reader = Arc::clone(&self.reader);
            let filename = file.filename.clone();
            async move {
                let handle =
                    tokio::task::spawn_blocking(move || reader.read(&file.filename, &file.bytes));
                match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(file = %filename, error = %e, "发票读取任务异常终止");
                        RecapOutcome::failed(filename, format!("Error processing file: {}", e))
                    }
                }
            }
        });
        let results = join_all(tasks).await;

        let succeeded = results
            .iter()
            .filter(|r| r.status == RecapStatus::Success)
            .count();
        let failed = results.len() - succeeded;
        info!(succeeded, failed, "发票读取完成");

        Ok(RecapResponse {
            results,
            succeeded,
            failed,
        })
    }

    /// 导出汇总表；无数据时返回 NothingToExport
    pub fn export(&self, recaps: &[InvoiceRecap]) -> ApiResult<RecapExport> {
        let generated_file = write_recap(recaps)?;
        Ok(RecapExport {
            filename: recap_filename(Local::now().naive_local()),
            rows: recaps.len(),
            generated_file,
        })
    }
}
