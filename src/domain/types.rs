// ==========================================
// 运费账单对账系统 - 领域类型定义
// ==========================================
// 职责: 税务模式 / 路线截断策略 / 金额小数点策略 / 文件处理状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 税务模式 (Tax Mode)
// ==========================================
// with_tax: 计算 PPN 并扣减 PPH
// no_tax: 应付 = DPP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    #[default]
    WithTax,
    NoTax,
}

impl fmt::Display for TaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxMode::WithTax => write!(f, "with_tax"),
            TaxMode::NoTax => write!(f, "no_tax"),
        }
    }
}

impl FromStr for TaxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "with_tax" | "" => Ok(TaxMode::WithTax),
            "no_tax" => Ok(TaxMode::NoTax),
            other => Err(format!("未知税务模式: {}", other)),
        }
    }
}

// ==========================================
// 路线名截断策略 (Route Policy)
// ==========================================
// 无主数据或主数据未命中时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutePolicy {
    /// "BGR-SOC-A001-X" → "BGR-SOC-A001"
    #[default]
    JoinFirstThree,
    /// "BOGOR-SOCIAL-A001" → "BOG - SOC - A00"
    AbbreviateSegments,
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePolicy::JoinFirstThree => write!(f, "JOIN_FIRST_THREE"),
            RoutePolicy::AbbreviateSegments => write!(f, "ABBREVIATE_SEGMENTS"),
        }
    }
}

impl FromStr for RoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "JOIN_FIRST_THREE" => Ok(RoutePolicy::JoinFirstThree),
            "ABBREVIATE_SEGMENTS" => Ok(RoutePolicy::AbbreviateSegments),
            other => Err(format!("未知路线策略: {}", other)),
        }
    }
}

// ==========================================
// 单点金额策略 (Single Dot Policy)
// ==========================================
// 仅含一个 "." 且小数部分恰好 3 位时的解释方式
// "1.500" 无上下文时无法判定是 1500 还是 1.5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SingleDotPolicy {
    /// "14.500" → 14500
    #[default]
    ThreeDigitGroup,
    /// "14.500" → 14.5
    Decimal,
}

impl fmt::Display for SingleDotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingleDotPolicy::ThreeDigitGroup => write!(f, "THREE_DIGIT_GROUP"),
            SingleDotPolicy::Decimal => write!(f, "DECIMAL"),
        }
    }
}

impl FromStr for SingleDotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "THREE_DIGIT_GROUP" => Ok(SingleDotPolicy::ThreeDigitGroup),
            "DECIMAL" => Ok(SingleDotPolicy::Decimal),
            other => Err(format!("未知金额策略: {}", other)),
        }
    }
}

// ==========================================
// 文件处理状态 (File Status)
// ==========================================
// 序列化格式与前端约定一致: "Error" 前缀即失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    #[serde(rename = "Success")]
    Success,
    #[serde(rename = "Warning")]
    Warning,
    #[serde(rename = "Error")]
    Error,
    #[serde(rename = "Error: Columns")]
    ErrorColumns,
}

impl FileStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, FileStatus::Error | FileStatus::ErrorColumns)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Success => write!(f, "Success"),
            FileStatus::Warning => write!(f, "Warning"),
            FileStatus::Error => write!(f, "Error"),
            FileStatus::ErrorColumns => write!(f, "Error: Columns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_mode_parse() {
        assert_eq!("with_tax".parse::<TaxMode>().unwrap(), TaxMode::WithTax);
        assert_eq!(" NO_TAX ".parse::<TaxMode>().unwrap(), TaxMode::NoTax);
        assert_eq!("".parse::<TaxMode>().unwrap(), TaxMode::WithTax);
        assert!("half".parse::<TaxMode>().is_err());
    }

    #[test]
    fn test_file_status_serialization() {
        assert_eq!(
            serde_json::to_string(&FileStatus::ErrorColumns).unwrap(),
            "\"Error: Columns\""
        );
        assert!(FileStatus::ErrorColumns.is_error());
        assert!(!FileStatus::Warning.is_error());
    }

    #[test]
    fn test_policy_round_trip_through_display() {
        let policy: RoutePolicy = RoutePolicy::AbbreviateSegments.to_string().parse().unwrap();
        assert_eq!(policy, RoutePolicy::AbbreviateSegments);
        let dot: SingleDotPolicy = "decimal".parse().unwrap();
        assert_eq!(dot, SingleDotPolicy::Decimal);
    }
}
