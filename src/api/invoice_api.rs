// ==========================================
// 运费账单对账系统 - 发票API
// ==========================================
// 职责: 运单文件（或已对账记录）+ 发票抬头 → 发票工作簿
// 工作表: INVOICE / KWITANSI / RINCIAN RITASE / RINCIAN KENDARAAN
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::recon_api::load_master_mapping;
use crate::config::ReconConfig;
use crate::domain::invoice::{InvoiceDocument, InvoiceHeader};
use crate::domain::record::NormalizedRecord;
use crate::domain::types::TaxMode;
use crate::importer::file_aggregator::dedup_warnings;
use crate::importer::{ManifestImporter, ManifestImporterImpl, SourceFile};
use crate::report::{invoice_filename, write_invoice, InvoiceBuilder, InvoiceLabels};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 发票请求
#[derive(Debug, Clone, Default)]
pub struct InvoiceRequest {
    pub manifests: Vec<SourceFile>,
    pub master_files: Vec<SourceFile>,
    pub pasted_master: Option<String>,
    pub header: InvoiceHeader,
    pub tax_mode: TaxMode,
}

/// 发票响应
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub filename: String,
    pub document: InvoiceDocument,
    /// 导入警告与组内单价不一致提示
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub generated_file: Vec<u8>,
}

/// 发票API
pub struct InvoiceApi {
    config: ReconConfig,
    importer: Arc<dyn ManifestImporter>,
}

impl InvoiceApi {
    pub fn new(config: ReconConfig) -> Self {
        let importer = Arc::new(ManifestImporterImpl::new(&config));
        Self { config, importer }
    }

    /// 从运单文件生成发票
    pub async fn create_invoice(&self, request: InvoiceRequest) -> ApiResult<InvoiceResponse> {
        if request.manifests.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let (mapping, master_warnings) = load_master_mapping(
            &self.config,
            &request.master_files,
            request.pasted_master.as_deref(),
        )?;
        let result = self.importer.import_batch(request.manifests, mapping).await;

        let mut response = self.invoice_from_records(&result.records, request.header, request.tax_mode)?;
        let warnings = master_warnings
            .into_iter()
            .chain(result.warnings)
            .chain(response.warnings)
            .collect();
        response.warnings = dedup_warnings(warnings);
        Ok(response)
    }

    /// 从已对账记录生成发票；无记录时输出 "No Data" 发票
    pub fn invoice_from_records(
        &self,
        records: &[NormalizedRecord],
        header: InvoiceHeader,
        tax_mode: TaxMode,
    ) -> ApiResult<InvoiceResponse> {
        let document = InvoiceBuilder::new(&self.config).build(records, header, tax_mode)?;
        let generated_file = write_invoice(&document, &InvoiceLabels::from_config(&self.config))?;
        let filename = invoice_filename(
            &self.config.invoice_client_label,
            records.first().map(|r| r.source_file.as_str()),
        );

        info!(
            records = records.len(),
            lines = document.lines.len(),
            tax_mode = %tax_mode,
            payable = %document.totals.payable,
            filename = %filename,
            "发票生成完成"
        );

        Ok(InvoiceResponse {
            filename,
            warnings: document.price_variance_warnings(),
            document,
            generated_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::filename::EMPTY_INVOICE_FILENAME;

    #[tokio::test]
    async fn test_empty_manifest_list_is_rejected() {
        let api = InvoiceApi::new(ReconConfig::default());
        let result = api.create_invoice(InvoiceRequest::default()).await;
        assert!(matches!(result, Err(ApiError::EmptyInput)));
    }

    #[test]
    fn test_no_records_still_writes_workbook() {
        let api = InvoiceApi::new(ReconConfig::default());
        let response = api
            .invoice_from_records(&[], InvoiceHeader::default(), TaxMode::NoTax)
            .unwrap();

        assert_eq!(response.filename, EMPTY_INVOICE_FILENAME);
        assert!(response.document.lines.is_empty());
        assert!(!response.generated_file.is_empty());
    }
}
