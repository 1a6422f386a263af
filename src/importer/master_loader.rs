// ==========================================
// 运费账单对账系统 - 主数据加载器
// ==========================================
// 职责: 主数据表 → Kode Tugas / 路线名 映射
// 表头匹配: 别名表（数据）+ 纯函数匹配
//   - 表头清洗: 小写、换行转空格、TRIM
//   - 别名按列表顺序优先；同一别名取表中最靠左的列
// 粘贴数据: JSON 数组 [{code,name}] 或带分隔符的文本
// ==========================================

use crate::domain::master::{MasterEntry, MasterMapping};
use crate::domain::sheet::RawSheet;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::manifest_importer_trait::{FileParser, SourceFile};
use csv::ReaderBuilder;
use tracing::{debug, warn};

/// 编码列别名（按优先级）
pub const CODE_ALIASES: [&str; 5] = ["kode", "tugas id", "kode tugas", "id", "任务单号"];

/// 名称列别名（按优先级）
pub const NAME_ALIASES: [&str; 6] = [
    "rute",
    "ritase",
    "kode ritase",
    "nama rute",
    "nama tugas",
    "线路",
];

/// 粘贴文本的候选分隔符（按优先级）
const PASTE_DELIMITERS: [u8; 4] = [b'\t', b',', b';', b'|'];

/// 粘贴数据在错误信息中的名称
pub const PASTED_SOURCE_NAME: &str = "Pasted Data";

/// 主数据加载失败的警告前缀
pub const MASTER_ERROR_PREFIX: &str = "Master Data Error";

// ==========================================
// AliasTable - 表头别名表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    pub code: Vec<String>,
    pub name: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            code: CODE_ALIASES.iter().map(|s| s.to_string()).collect(),
            name: NAME_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AliasTable {
    /// 匹配 (编码列, 名称列)；名称列不会与编码列重合
    pub fn resolve(&self, cleaned_headers: &[String]) -> Option<(usize, usize)> {
        let code_idx = match_column(cleaned_headers, &self.code, None)?;
        let name_idx = match_column(cleaned_headers, &self.name, Some(code_idx))?;
        Some((code_idx, name_idx))
    }
}

/// 表头清洗
pub fn clean_header(header: &str) -> String {
    header
        .to_lowercase()
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// 第一个命中的别名胜出；同一别名下取最靠左的列
pub fn match_column(headers: &[String], aliases: &[String], exclude: Option<usize>) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != exclude)
            .find(|(_, header)| !header.is_empty() && header.contains(alias.as_str()))
            .map(|(idx, _)| idx)
    })
}

// ==========================================
// MasterDataLoader - 主数据加载器
// ==========================================
#[derive(Debug, Clone)]
pub struct MasterDataLoader {
    aliases: AliasTable,
    header_row: usize,
}

impl Default for MasterDataLoader {
    fn default() -> Self {
        Self::new(AliasTable::default(), 0)
    }
}

impl MasterDataLoader {
    pub fn new(aliases: AliasTable, header_row: usize) -> Self {
        Self {
            aliases,
            header_row,
        }
    }

    /// 从文件字节加载
    pub fn load_bytes(&self, filename: &str, bytes: &[u8]) -> ImportResult<MasterMapping> {
        let sheet = UniversalFileParser.parse_sheet(filename, bytes)?;
        self.load_sheet(&sheet)
    }

    /// 按顺序加载多个主数据文件，后者覆盖前者
    ///
    /// 单个文件失败不会中断，错误转为警告返回，该文件贡献为空
    pub fn load_files(&self, files: &[SourceFile]) -> (MasterMapping, Vec<String>) {
        let mut mapping = MasterMapping::new();
        let mut warnings = Vec::new();
        for file in files {
            match self.load_bytes(&file.filename, &file.bytes) {
                Ok(loaded) => mapping.merge(loaded),
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "主数据加载失败");
                    warnings.push(format!("{}: {}", MASTER_ERROR_PREFIX, e));
                }
            }
        }
        (mapping, warnings)
    }

    /// 从工作表加载，编码与名称任一为空的行跳过
    pub fn load_sheet(&self, sheet: &RawSheet) -> ImportResult<MasterMapping> {
        let cleaned: Vec<String> = sheet
            .row_text(self.header_row)
            .iter()
            .map(|h| clean_header(h))
            .collect();

        let (code_idx, name_idx) =
            self.aliases
                .resolve(&cleaned)
                .ok_or_else(|| ImportError::MasterColumnsNotFound {
                    file: sheet.name().to_string(),
                    headers: cleaned.iter().filter(|h| !h.is_empty()).cloned().collect(),
                })?;

        let cleaner = DataCleaner;
        let mut mapping = MasterMapping::new();
        for (_, row) in sheet.rows().skip(self.header_row + 1) {
            let code = row.get(code_idx).and_then(|c| cleaner.cell_text(c));
            let name = row.get(name_idx).and_then(|c| cleaner.cell_text(c));
            if let (Some(code), Some(name)) = (code, name) {
                mapping.insert(&code, &name);
            }
        }

        debug!(
            file = %sheet.name(),
            code_column = code_idx,
            name_column = name_idx,
            entries = mapping.len(),
            "主数据加载完成"
        );
        Ok(mapping)
    }

    /// 解析粘贴的主数据：JSON 数组或分隔文本
    pub fn parse_pasted(&self, raw: &str) -> ImportResult<Vec<MasterEntry>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        if trimmed.starts_with('[') {
            self.parse_pasted_json(trimmed)
        } else {
            self.parse_pasted_text(trimmed)
        }
    }

    /// [{"code": "...", "name": "..."}]（也接受 kode / nama）
    pub fn parse_pasted_json(&self, raw: &str) -> ImportResult<Vec<MasterEntry>> {
        let entries: Vec<MasterEntry> = serde_json::from_str(raw)?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.code.trim().is_empty() && !e.name.trim().is_empty())
            .collect())
    }

    /// 首行为表头；分隔符取首个能把表头切成多列的候选
    pub fn parse_pasted_text(&self, raw: &str) -> ImportResult<Vec<MasterEntry>> {
        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let first = match lines.first() {
            Some(line) => *line,
            None => return Ok(Vec::new()),
        };

        let delimiter = PASTE_DELIMITERS
            .iter()
            .copied()
            .find(|d| first.as_bytes().contains(d))
            .unwrap_or(b'\t');

        let body = lines.join("\n");
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(body.as_bytes());

        let mut records = reader.records();
        let header_record = match records.next() {
            Some(record) => record?,
            None => return Ok(Vec::new()),
        };
        let cleaned: Vec<String> = header_record.iter().map(clean_header).collect();

        let (code_idx, name_idx) =
            self.aliases
                .resolve(&cleaned)
                .ok_or_else(|| ImportError::MasterColumnsNotFound {
                    file: PASTED_SOURCE_NAME.to_string(),
                    headers: header_record.iter().map(|h| h.trim().to_string()).collect(),
                })?;

        let mut entries = Vec::new();
        for record in records {
            let record = record?;
            let code = record.get(code_idx).map(str::trim).unwrap_or("");
            let name = record.get(name_idx).map(str::trim).unwrap_or("");
            if !code.is_empty() && !name.is_empty() {
                entries.push(MasterEntry {
                    code: code.to_string(),
                    name: name.to_string(),
                });
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheet::Cell;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|h| clean_header(h)).collect()
    }

    #[test]
    fn test_clean_header() {
        assert_eq!(clean_header("  Kode\nTugas "), "kode tugas");
        assert_eq!(clean_header("NAMA RUTE\r\n"), "nama rute");
    }

    #[test]
    fn test_alias_priority_beats_column_order() {
        let aliases = AliasTable::default();
        // "kode" 是首个别名，命中最左侧含 "kode" 的列
        let cols = headers(&["Tugas ID", "Kode Tugas", "Nama Rute"]);
        assert_eq!(aliases.resolve(&cols), Some((1, 2)));

        // 无 "kode" 时回落到 "tugas id"
        let cols = headers(&["No", "Tugas ID", "Ritase"]);
        assert_eq!(aliases.resolve(&cols), Some((1, 2)));
    }

    #[test]
    fn test_name_column_never_reuses_code_column() {
        let aliases = AliasTable::default();
        let cols = headers(&["Kode Rute"]);
        assert_eq!(aliases.resolve(&cols), None);
    }

    #[test]
    fn test_load_sheet_last_write_wins() {
        let sheet = RawSheet::new(
            "master.xlsx",
            vec![
                vec![Cell::from("No"), Cell::from("Kode\nTugas"), Cell::from("Nama Tugas")],
                vec![Cell::Number(1.0), Cell::from(" A1 "), Cell::from("R-ONE")],
                vec![Cell::Number(2.0), Cell::Number(12345.0), Cell::from("R-TWO")],
                vec![Cell::Number(3.0), Cell::from("A1"), Cell::from("R-THREE")],
                vec![Cell::Number(4.0), Cell::from("C3"), Cell::Empty],
            ],
        );

        let mapping = MasterDataLoader::default().load_sheet(&sheet).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("A1"), Some("R-THREE"));
        assert_eq!(mapping.get("12345"), Some("R-TWO"));
        assert_eq!(mapping.get("C3"), None);
    }

    #[test]
    fn test_missing_columns_error_names_file_and_headers() {
        let sheet = RawSheet::from_text_rows("bad.xlsx", vec![vec!["No", "Keterangan"]]);
        let err = MasterDataLoader::default().load_sheet(&sheet).unwrap_err();
        match err {
            ImportError::MasterColumnsNotFound { file, headers } => {
                assert_eq!(file, "bad.xlsx");
                assert_eq!(headers, vec!["no", "keterangan"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_load_files_isolates_failures() {
        let files = vec![
            SourceFile::new("one.csv", b"Kode,Rute\nA1,R-OLD\nB2,R-B\n".to_vec()),
            SourceFile::new("broken.csv", b"foo,bar\n1,2\n".to_vec()),
            SourceFile::new("two.csv", b"Kode,Rute\nA1,R-NEW\n".to_vec()),
        ];
        let (mapping, warnings) = MasterDataLoader::default().load_files(&files);

        assert_eq!(mapping.get("A1"), Some("R-NEW"));
        assert_eq!(mapping.get("B2"), Some("R-B"));
        assert_eq!(
            warnings,
            vec![r#"Master Data Error: Columns not found in broken.csv. Found: ["foo", "bar"]"#.to_string()]
        );
    }

    #[test]
    fn test_parse_pasted_json_and_text() {
        let loader = MasterDataLoader::default();

        let json = loader
            .parse_pasted(r#"[{"kode":"A1","nama":"R1"},{"code":"","name":"skip"}]"#)
            .unwrap();
        assert_eq!(json.len(), 1);

        let tab = loader
            .parse_pasted("Kode Tugas\tNama Rute\nA1\tR1\n\nB2\t\nC3\tR3\n")
            .unwrap();
        assert_eq!(
            tab,
            vec![
                MasterEntry { code: "A1".to_string(), name: "R1".to_string() },
                MasterEntry { code: "C3".to_string(), name: "R3".to_string() },
            ]
        );

        let semi = loader.parse_pasted("kode;rute\nX9;BGR-SOC").unwrap();
        assert_eq!(semi[0].name, "BGR-SOC");
    }

    #[test]
    fn test_parse_pasted_text_without_known_headers() {
        let err = MasterDataLoader::default()
            .parse_pasted("foo,bar\n1,2")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Columns not found in Pasted Data. Found: ["foo", "bar"]"#
        );
    }
}
