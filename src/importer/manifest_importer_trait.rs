// ==========================================
// 运费账单对账系统 - 运单导入 Trait
// ==========================================
// 职责: 定义运单导入接口（不包含实现）
// ==========================================

use crate::domain::master::MasterMapping;
use crate::domain::sheet::RawSheet;
use crate::domain::summary::AggregationResult;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

/// 一个上传文件（原始文件名 + 字节）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

// ==========================================
// ManifestImporter Trait
// ==========================================
// 用途: 运单批量导入主接口
// 实现者: ManifestImporterImpl
#[async_trait]
pub trait ManifestImporter: Send + Sync {
    /// 批量导入运单文件
    ///
    /// # 参数
    /// - files: 按上传顺序排列的文件
    /// - mapping: 已合并的主数据（可为空）
    ///
    /// # 说明
    /// - 文件之间互相独立，单个文件失败只影响自身的 FileSummary
    /// - 返回的 file_summaries 顺序与输入顺序一致
    async fn import_batch(
        &self,
        files: Vec<SourceFile>,
        mapping: MasterMapping,
    ) -> AggregationResult;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件的第一个工作表
    ///
    /// # 参数
    /// - filename: 原始文件名（用于判断格式与溯源）
    /// - bytes: 文件内容
    fn parse_sheet(&self, filename: &str, bytes: &[u8]) -> ImportResult<RawSheet>;
}
