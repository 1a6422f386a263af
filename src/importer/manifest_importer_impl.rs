// ==========================================
// 运费账单对账系统 - 运单导入器实现
// ==========================================
// 职责: 并发处理多个运单文件并合并结果
// 流程: spawn_blocking(解析 → 抽取) × N → join_all（保持输入顺序）→ 合并
// ==========================================

use crate::config::ReconConfig;
use crate::domain::master::MasterMapping;
use crate::domain::summary::AggregationResult;
use crate::domain::types::FileStatus;
use crate::importer::file_aggregator::{combine, FileAggregator, FileOutcome};
use crate::importer::manifest_importer_trait::{ManifestImporter, SourceFile};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// ManifestImporterImpl - 运单导入器实现
// ==========================================
pub struct ManifestImporterImpl {
    aggregator: Arc<FileAggregator>,
}

impl ManifestImporterImpl {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            aggregator: Arc::new(FileAggregator::new(config)),
        }
    }
}

#[async_trait]
impl ManifestImporter for ManifestImporterImpl {
    #[instrument(skip(self, files, mapping), fields(run_id = %Uuid::new_v4(), files = files.len()))]
    async fn import_batch(
        &self,
        files: Vec<SourceFile>,
        mapping: MasterMapping,
    ) -> AggregationResult {
        info!(count = files.len(), master_entries = mapping.len(), "开始批量导入运单");

        let mapping = Arc::new(mapping);
        let tasks = files.into_iter().map(|file| {
            let aggregator = Arc::clone(&self.aggregator);
            let mapping = Arc::clone(&mapping);
            let filename = file.filename.clone();
            async move {
                let handle = tokio::task::spawn_blocking(move || {
                    aggregator.process_file(&file.filename, &file.bytes, &mapping)
                });
                match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        // 任务 panic 或被取消：只影响该文件
                        error!(file = %filename, error = %e, "文件处理任务异常终止");
                        FileOutcome::failed(filename, FileStatus::Error)
                    }
                }
            }
        });

        // join_all 按输入顺序返回
        let outcomes = join_all(tasks).await;
        combine(outcomes)
    }
}
