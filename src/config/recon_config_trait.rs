// ==========================================
// 运费账单对账系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义导入与报表所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::column_layout::ColumnLayout;
use crate::domain::types::{RoutePolicy, SingleDotPolicy};
use crate::importer::error::ImportResult;
use rust_decimal::Decimal;
use serde::Serialize;

// ==========================================
// ReconConfig - 配置快照
// ==========================================
// 一次请求内只读使用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconConfig {
    pub layout: ColumnLayout,
    pub master_header_row: usize,
    pub valid_vehicle_types: Vec<String>,
    pub footer_keywords: Vec<String>,
    pub route_policy: RoutePolicy,
    pub single_dot_policy: SingleDotPolicy,
    pub warn_unparseable_amounts: bool,
    pub vat_rate: Decimal,
    pub pph_rate: Decimal,
    pub consolidated_filename_prefix: String,
    pub invoice_client_label: String,
    pub issuer_name: String,
    pub client_name: String,
    pub project_prefix: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::default(),
            master_header_row: 0,
            valid_vehicle_types: defaults::VALID_VEHICLE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            footer_keywords: defaults::FOOTER_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            route_policy: RoutePolicy::default(),
            single_dot_policy: SingleDotPolicy::default(),
            warn_unparseable_amounts: false,
            vat_rate: Decimal::new(11, 3),
            pph_rate: Decimal::new(2, 2),
            consolidated_filename_prefix: defaults::CONSOLIDATED_FILENAME_PREFIX.to_string(),
            invoice_client_label: defaults::INVOICE_CLIENT_LABEL.to_string(),
            issuer_name: defaults::ISSUER_NAME.to_string(),
            client_name: defaults::CLIENT_NAME.to_string(),
            project_prefix: defaults::PROJECT_PREFIX.to_string(),
        }
    }
}

/// 默认值
pub mod defaults {
    pub const VALID_VEHICLE_TYPES: [&str; 2] = ["CDDL", "TWB"];
    pub const FOOTER_KEYWORDS: [&str; 7] = [
        "dicek oleh",
        "diketahui oleh",
        "dibuatkan",
        "disetujui oleh",
        "bill periode",
        "total",
        "print date",
    ];
    pub const CONSOLIDATED_FILENAME_PREFIX: &str = "Rekonsiliasi_Tagihan";
    pub const INVOICE_CLIENT_LABEL: &str = "GLOBAL JET EXPRESS";
    pub const ISSUER_NAME: &str = "PT CHIJUN SMART FREIGHT";
    pub const CLIENT_NAME: &str = "PT GLOBAL JET EXPRESS";
    pub const PROJECT_PREFIX: &str = "PROJEK J&T EXPRESS";
}

// ==========================================
// ReconConfigReader Trait
// ==========================================
// 实现者: ConfigManager（内存 KV，可由 JSON 文件与环境变量覆写）
pub trait ReconConfigReader: Send + Sync {
    // ===== 表格布局 =====

    /// 运单列布局（含表头行）
    fn get_column_layout(&self) -> ImportResult<ColumnLayout>;

    /// 主数据表头行（0-based，默认 0）
    fn get_master_header_row(&self) -> ImportResult<usize>;

    // ===== 行校验 =====

    /// 合法车型代码（Jenis Mobil 需包含其一）
    fn get_valid_vehicle_types(&self) -> ImportResult<Vec<String>>;

    /// 页脚/签名行关键字（小写，包含匹配）
    fn get_footer_keywords(&self) -> ImportResult<Vec<String>>;

    /// 非空但无法解析的金额是否提示
    fn get_warn_unparseable_amounts(&self) -> ImportResult<bool>;

    // ===== 规范化策略 =====

    fn get_route_policy(&self) -> ImportResult<RoutePolicy>;

    fn get_single_dot_policy(&self) -> ImportResult<SingleDotPolicy>;

    // ===== 发票 =====

    /// PPN 税率（默认 0.011）
    fn get_vat_rate(&self) -> ImportResult<Decimal>;

    /// PPH 税率（默认 0.02）
    fn get_pph_rate(&self) -> ImportResult<Decimal>;

    fn get_consolidated_filename_prefix(&self) -> ImportResult<String>;

    fn get_invoice_client_label(&self) -> ImportResult<String>;

    fn get_issuer_name(&self) -> ImportResult<String>;

    fn get_client_name(&self) -> ImportResult<String>;

    fn get_project_prefix(&self) -> ImportResult<String>;

    /// 解析全部配置为快照
    fn snapshot(&self) -> ImportResult<ReconConfig> {
        Ok(ReconConfig {
            layout: self.get_column_layout()?,
            master_header_row: self.get_master_header_row()?,
            valid_vehicle_types: self.get_valid_vehicle_types()?,
            footer_keywords: self.get_footer_keywords()?,
            route_policy: self.get_route_policy()?,
            single_dot_policy: self.get_single_dot_policy()?,
            warn_unparseable_amounts: self.get_warn_unparseable_amounts()?,
            vat_rate: self.get_vat_rate()?,
            pph_rate: self.get_pph_rate()?,
            consolidated_filename_prefix: self.get_consolidated_filename_prefix()?,
            invoice_client_label: self.get_invoice_client_label()?,
            issuer_name: self.get_issuer_name()?,
            client_name: self.get_client_name()?,
            project_prefix: self.get_project_prefix()?,
        })
    }
}
