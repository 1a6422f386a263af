// ==========================================
// 运费账单对账系统 - 主数据映射
// ==========================================
// 职责: Kode Tugas → 路线名 映射
// 合并规则: 后写覆盖（文件顺序，其后粘贴顺序）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 外部粘贴的一条主数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEntry {
    #[serde(alias = "kode")]
    pub code: String,
    #[serde(alias = "nama")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterMapping {
    entries: HashMap<String, String>,
}

impl MasterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一条映射，code 会被 trim；空 code 忽略
    pub fn insert(&mut self, code: &str, name: &str) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        self.entries.insert(code.to_string(), name.trim().to_string());
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 合并另一份映射，other 覆盖 self
    pub fn merge(&mut self, other: MasterMapping) {
        self.entries.extend(other.entries);
    }

    pub fn extend_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = MasterEntry>,
    {
        for entry in entries {
            self.insert(&entry.code, &entry.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut first = MasterMapping::new();
        first.insert(" A1 ", "X-Y-Z");
        first.insert("B2", "OLD");

        let mut second = MasterMapping::new();
        second.insert("B2", "NEW");

        first.merge(second);
        first.extend_entries(vec![MasterEntry {
            code: "A1".to_string(),
            name: "PASTED".to_string(),
        }]);

        assert_eq!(first.len(), 2);
        assert_eq!(first.get("A1"), Some("PASTED"));
        assert_eq!(first.get("B2"), Some("NEW"));
    }

    #[test]
    fn test_entry_accepts_indonesian_keys() {
        let entries: Vec<MasterEntry> =
            serde_json::from_str(r#"[{"kode":"A1","nama":"R1"},{"code":"B2","name":"R2"}]"#)
                .unwrap();
        assert_eq!(entries[0].code, "A1");
        assert_eq!(entries[1].name, "R2");
    }

    #[test]
    fn test_blank_code_is_ignored() {
        let mut mapping = MasterMapping::new();
        mapping.insert("   ", "X");
        assert!(mapping.is_empty());
    }
}
