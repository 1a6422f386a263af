// ==========================================
// 运费账单对账系统 - 对账API
// ==========================================
// 职责: 运单文件 + 主数据 → 规范化记录、汇总与合并对账表
// 流程:
//   1. 主数据文件按顺序加载，粘贴数据最后合并（后者覆盖前者）
//   2. 运单文件并发导入（结果顺序与输入一致）
//   3. 生成合并对账表
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReconConfig;
use crate::domain::master::MasterMapping;
use crate::domain::record::{NormalizedRecord, DISPLAY_COLUMNS};
use crate::domain::summary::FileSummary;
use crate::importer::file_aggregator::dedup_warnings;
use crate::importer::{ManifestImporter, ManifestImporterImpl, MasterDataLoader, SourceFile};
use crate::report::{consolidated_filename, write_consolidated};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 对账请求
#[derive(Debug, Clone, Default)]
pub struct ReconRequest {
    /// 运单文件（顺序即输出顺序）
    pub manifests: Vec<SourceFile>,
    /// 主数据文件
    pub master_files: Vec<SourceFile>,
    /// 粘贴的主数据（JSON 数组或带表头的分隔文本）
    pub pasted_master: Option<String>,
    /// 输出文件名后缀，空时使用日期
    pub filename_suffix: Option<String>,
}

/// 汇总信息
#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_files: usize,
    pub total_rows: usize,
    /// 超出可表示范围时为 null（并附带警告）
    pub total_amount: Option<Decimal>,
    pub output_filename: String,
    pub file_details: Vec<FileSummary>,
    pub warnings: Vec<String>,
    pub missing_codes: Vec<String>,
}

/// 对账响应
#[derive(Debug, Clone, Serialize)]
pub struct ReconResponse {
    pub records: Vec<NormalizedRecord>,
    pub display_columns: Vec<String>,
    pub summary: ReconSummary,
    /// 合并对账表（xlsx 字节），由调用方落盘或下载
    #[serde(skip)]
    pub generated_file: Vec<u8>,
}

/// 对账API
pub struct ReconApi {
    config: ReconConfig,
    importer: Arc<dyn ManifestImporter>,
}

impl ReconApi {
    pub fn new(config: ReconConfig) -> Self {
        let importer = Arc::new(ManifestImporterImpl::new(&config));
        Self { config, importer }
    }

    /// 使用自定义导入器（测试用）
    pub fn with_importer(config: ReconConfig, importer: Arc<dyn ManifestImporter>) -> Self {
        Self { config, importer }
    }

    /// 执行一次完整对账
    ///
    /// # 返回
    /// - Err(ApiError::EmptyInput): 未提供运单文件（唯一的请求级失败）
    /// - Err(ApiError::InvalidInput): 粘贴的主数据无法解析
    pub async fn reconcile(&self, request: ReconRequest) -> ApiResult<ReconResponse> {
        if request.manifests.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let (mapping, master_warnings) =
            self.build_mapping(&request.master_files, request.pasted_master.as_deref())?;

        let total_files = request.manifests.len();
        let result = self.importer.import_batch(request.manifests, mapping).await;

        let output_filename = consolidated_filename(
            &self.config.consolidated_filename_prefix,
            request.filename_suffix.as_deref(),
            Local::now().naive_local(),
        );
        let generated_file = write_consolidated(&result.records)?;

        let total_rows = result.total_rows();
        let total_amount = result.total_amount();
        let warnings = dedup_warnings(master_warnings.into_iter().chain(result.warnings).collect());

        info!(
            files = total_files,
            rows = total_rows,
            total = ?total_amount,
            warnings = warnings.len(),
            missing_codes = result.missing_codes.len(),
            output = %output_filename,
            "对账完成"
        );

        Ok(ReconResponse {
            records: result.records,
            display_columns: DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            summary: ReconSummary {
                total_files,
                total_rows,
                total_amount,
                output_filename,
                file_details: result.file_summaries,
                warnings,
                missing_codes: result.missing_codes,
            },
            generated_file,
        })
    }

    pub fn build_mapping(
        &self,
        master_files: &[SourceFile],
        pasted: Option<&str>,
    ) -> ApiResult<(MasterMapping, Vec<String>)> {
        load_master_mapping(&self.config, master_files, pasted)
    }
}

/// 合并主数据文件与粘贴数据
///
/// 主数据文件的错误转为警告；粘贴数据的错误直接返回
pub fn load_master_mapping(
    config: &ReconConfig,
    master_files: &[SourceFile],
    pasted: Option<&str>,
) -> ApiResult<(MasterMapping, Vec<String>)> {
    let loader = MasterDataLoader::new(Default::default(), config.master_header_row);
    let (mut mapping, warnings) = loader.load_files(master_files);

    if let Some(raw) = pasted.filter(|s| !s.trim().is_empty()) {
        let entries = loader.parse_pasted(raw)?;
        info!(entries = entries.len(), "合并粘贴的主数据");
        mapping.extend_entries(entries);
    }

    Ok((mapping, warnings))
}
