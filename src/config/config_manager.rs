// ==========================================
// 运费账单对账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value；来源优先级 环境变量 > JSON 文件 > 默认值
// ==========================================

use crate::config::column_layout::ColumnLayout;
use crate::config::recon_config_trait::{defaults, ReconConfigReader};
use crate::domain::types::{RoutePolicy, SingleDotPolicy};
use crate::importer::error::{ImportError, ImportResult};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// 环境变量覆写前缀，例如 FREIGHT_RECON_VAT_RATE=0.011
pub const ENV_PREFIX: &str = "FREIGHT_RECON_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从扁平 JSON 对象加载
    ///
    /// 值可以是字符串、数字、布尔或数组；非字符串按 JSON 文本保存
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| ImportError::ConfigReadError {
                key: "*".to_string(),
                message: e.to_string(),
            })?;

        let values = map
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect();

        Ok(Self { values })
    }

    /// 从 JSON 文件加载
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let manager = Self::from_json_str(&raw)?;
        debug!(path = %path.as_ref().display(), keys = manager.values.len(), "配置文件已加载");
        Ok(manager)
    }

    /// 默认配置文件路径: <系统配置目录>/freight-recon/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("freight-recon").join("config.json"))
    }

    /// 应用进程环境变量覆写
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(std::env::vars())
    }

    /// 应用覆写：仅处理带 ENV_PREFIX 的变量，键名转小写
    pub fn with_overrides_from<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                debug!(key = %key.to_lowercase(), "环境变量覆写配置");
                self.values.insert(key.to_lowercase(), value);
            }
        }
        self
    }

    /// 写入单个配置项
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }

    /// 获取所有显式配置的快照（JSON，按 key 排序）
    pub fn get_config_snapshot(&self) -> ImportResult<String> {
        let ordered: BTreeMap<&String, &String> = self.values.iter().collect();
        serde_json::to_string(&ordered).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })
    }

    // ===== 解析辅助 =====

    fn parse_value<T>(&self, key: &str) -> ImportResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// 列表值：JSON 数组或逗号分隔
    fn parse_list(&self, key: &str) -> ImportResult<Option<Vec<String>>> {
        let raw = match self.get_config_value(key) {
            None => return Ok(None),
            Some(raw) => raw.trim(),
        };

        if raw.starts_with('[') {
            let items: Vec<String> =
                serde_json::from_str(raw).map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                })?;
            return Ok(Some(items));
        }

        Ok(Some(
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        ))
    }

    fn parse_rate(&self, key: &str, default: Decimal) -> ImportResult<Decimal> {
        let rate = self.parse_value::<Decimal>(key)?.unwrap_or(default);
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ImportError::ConfigValueError {
                key: key.to_string(),
                value: rate.to_string(),
                message: "税率必须在 [0, 1] 区间".to_string(),
            });
        }
        Ok(rate)
    }
}

impl ReconConfigReader for ConfigManager {
    fn get_column_layout(&self) -> ImportResult<ColumnLayout> {
        let mut layout = match self.get_config_value(config_keys::COLUMN_LAYOUT) {
            None => ColumnLayout::default(),
            Some(raw) => {
                serde_json::from_str(raw).map_err(|e| ImportError::ConfigValueError {
                    key: config_keys::COLUMN_LAYOUT.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                })?
            }
        };
        if let Some(row) = self.parse_value::<usize>(config_keys::MANIFEST_HEADER_ROW)? {
            layout.header_row = row;
        }
        Ok(layout)
    }

    fn get_master_header_row(&self) -> ImportResult<usize> {
        Ok(self
            .parse_value::<usize>(config_keys::MASTER_HEADER_ROW)?
            .unwrap_or(0))
    }

    fn get_valid_vehicle_types(&self) -> ImportResult<Vec<String>> {
        Ok(self
            .parse_list(config_keys::VALID_VEHICLE_TYPES)?
            .map(|v| v.into_iter().map(|s| s.to_uppercase()).collect())
            .unwrap_or_else(|| {
                defaults::VALID_VEHICLE_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }))
    }

    fn get_footer_keywords(&self) -> ImportResult<Vec<String>> {
        Ok(self
            .parse_list(config_keys::FOOTER_KEYWORDS)?
            .map(|v| v.into_iter().map(|s| s.to_lowercase()).collect())
            .unwrap_or_else(|| {
                defaults::FOOTER_KEYWORDS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }))
    }

    fn get_warn_unparseable_amounts(&self) -> ImportResult<bool> {
        Ok(self
            .parse_value::<bool>(config_keys::WARN_UNPARSEABLE_AMOUNTS)?
            .unwrap_or(false))
    }

    fn get_route_policy(&self) -> ImportResult<RoutePolicy> {
        Ok(self
            .parse_value::<RoutePolicy>(config_keys::ROUTE_POLICY)?
            .unwrap_or_default())
    }

    fn get_single_dot_policy(&self) -> ImportResult<SingleDotPolicy> {
        Ok(self
            .parse_value::<SingleDotPolicy>(config_keys::SINGLE_DOT_POLICY)?
            .unwrap_or_default())
    }

    fn get_vat_rate(&self) -> ImportResult<Decimal> {
        self.parse_rate(config_keys::VAT_RATE, Decimal::new(11, 3))
    }

    fn get_pph_rate(&self) -> ImportResult<Decimal> {
        self.parse_rate(config_keys::PPH_RATE, Decimal::new(2, 2))
    }

    fn get_consolidated_filename_prefix(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(
            config_keys::CONSOLIDATED_FILENAME_PREFIX,
            defaults::CONSOLIDATED_FILENAME_PREFIX,
        ))
    }

    fn get_invoice_client_label(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(
            config_keys::INVOICE_CLIENT_LABEL,
            defaults::INVOICE_CLIENT_LABEL,
        ))
    }

    fn get_issuer_name(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::ISSUER_NAME, defaults::ISSUER_NAME))
    }

    fn get_client_name(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::CLIENT_NAME, defaults::CLIENT_NAME))
    }

    fn get_project_prefix(&self) -> ImportResult<String> {
        Ok(self.get_config_or_default(config_keys::PROJECT_PREFIX, defaults::PROJECT_PREFIX))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 表格布局
    pub const COLUMN_LAYOUT: &str = "column_layout"; // ColumnLayout (JSON)
    pub const MANIFEST_HEADER_ROW: &str = "manifest_header_row";
    pub const MASTER_HEADER_ROW: &str = "master_header_row";

    // 行校验
    pub const VALID_VEHICLE_TYPES: &str = "valid_vehicle_types";
    pub const FOOTER_KEYWORDS: &str = "footer_keywords";
    pub const WARN_UNPARSEABLE_AMOUNTS: &str = "warn_unparseable_amounts";

    // 规范化策略
    pub const ROUTE_POLICY: &str = "route_policy";
    pub const SINGLE_DOT_POLICY: &str = "single_dot_policy";

    // 税率
    pub const VAT_RATE: &str = "vat_rate";
    pub const PPH_RATE: &str = "pph_rate";

    // 输出命名
    pub const CONSOLIDATED_FILENAME_PREFIX: &str = "consolidated_filename_prefix";
    pub const INVOICE_CLIENT_LABEL: &str = "invoice_client_label";
    pub const ISSUER_NAME: &str = "issuer_name";
    pub const CLIENT_NAME: &str = "client_name";
    pub const PROJECT_PREFIX: &str = "project_prefix";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_when_empty() {
        let config = ConfigManager::new().snapshot().unwrap();
        assert_eq!(config.layout, ColumnLayout::default());
        assert_eq!(config.valid_vehicle_types, vec!["CDDL", "TWB"]);
        assert_eq!(config.vat_rate, dec!(0.011));
        assert_eq!(config.pph_rate, dec!(0.02));
        assert_eq!(config.route_policy, RoutePolicy::JoinFirstThree);
        assert!(!config.warn_unparseable_amounts);
    }

    #[test]
    fn test_json_values_and_lists() {
        let manager = ConfigManager::from_json_str(
            r#"{
                "valid_vehicle_types": ["cddl", "twb", "fuso"],
                "footer_keywords": "Total, Print Date",
                "manifest_header_row": 2,
                "warn_unparseable_amounts": true,
                "route_policy": "abbreviate_segments"
            }"#,
        )
        .unwrap();

        let config = manager.snapshot().unwrap();
        assert_eq!(config.valid_vehicle_types, vec!["CDDL", "TWB", "FUSO"]);
        assert_eq!(config.footer_keywords, vec!["total", "print date"]);
        assert_eq!(config.layout.header_row, 2);
        assert_eq!(config.layout.actual_total, 22);
        assert!(config.warn_unparseable_amounts);
        assert_eq!(config.route_policy, RoutePolicy::AbbreviateSegments);
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let manager = ConfigManager::from_json_str(r#"{"vat_rate": "0.02"}"#)
            .unwrap()
            .with_overrides_from(vec![
                ("FREIGHT_RECON_VAT_RATE".to_string(), "0.011".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ]);
        assert_eq!(manager.get_vat_rate().unwrap(), dec!(0.011));
        assert!(manager.get_config_value("unrelated").is_none());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::PPH_RATE, "abc");
        assert!(matches!(
            manager.get_pph_rate(),
            Err(ImportError::ConfigValueError { .. })
        ));

        manager.set(config_keys::PPH_RATE, "2");
        assert!(manager.get_pph_rate().is_err());

        manager.set(config_keys::SINGLE_DOT_POLICY, "sometimes");
        assert!(manager.snapshot().is_err());
    }

    #[test]
    fn test_snapshot_is_sorted_json() {
        let mut manager = ConfigManager::new();
        manager.set("b", "2");
        manager.set("a", "1");
        assert_eq!(manager.get_config_snapshot().unwrap(), r#"{"a":"1","b":"2"}"#);
    }
}
