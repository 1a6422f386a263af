// ==========================================
// 运费账单对账系统 - 导入层
// ==========================================
// 职责: 运单/主数据文件 → 规范化记录与汇总
// 支持: Excel (.xlsx/.xlsm/.xls/.ods), CSV, 粘贴的主数据
// ==========================================

// 模块声明
pub mod amount_parser;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod file_aggregator;
pub mod file_parser;
pub mod manifest_importer_impl;
pub mod manifest_importer_trait;
pub mod master_loader;
pub mod route_resolver;
pub mod row_extractor;

// 重导出核心类型
pub use amount_parser::{normalize, AmountParser, ParsedAmount};
pub use data_cleaner::DataCleaner;
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use file_aggregator::{FileAggregator, FileOutcome};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use manifest_importer_impl::ManifestImporterImpl;
pub use master_loader::{AliasTable, MasterDataLoader};
pub use route_resolver::{Resolution, RouteResolver};
pub use row_extractor::{DropReason, ExtractionOutcome, RowExtractor};

// 重导出 Trait 接口
pub use manifest_importer_trait::{FileParser, ManifestImporter, SourceFile};
