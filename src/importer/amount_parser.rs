// ==========================================
// 运费账单对账系统 - 金额解析器
// ==========================================
// 职责: 印尼格式金额文本 → 精确十进制
// 规则:
//   - 去掉 Rp / IDR 与空白
//   - 同时含 "." 与 ",": 靠右者为小数点
//   - 仅含 ".": 多个为千分位；单个且小数部分 3 位按 SingleDotPolicy
//   - 仅含 ",": 视为小数点；出现多个时无法解析
//   - 括号表示负数，单独的 "-" 视为空
// ==========================================

use crate::domain::sheet::Cell;
use crate::domain::types::SingleDotPolicy;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 解析结果：区分"空"与"无法解析"
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedAmount {
    Value(Decimal),
    Absent,
    Unparseable(String),
}

impl ParsedAmount {
    /// 宽松取值：空与无法解析均为 0
    pub fn or_zero(&self) -> Decimal {
        match self {
            ParsedAmount::Value(v) => *v,
            _ => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AmountParser {
    single_dot: SingleDotPolicy,
}

impl AmountParser {
    pub fn new(single_dot: SingleDotPolicy) -> Self {
        Self { single_dot }
    }

    /// 宽松规范化：任何失败都降级为 0
    pub fn normalize(&self, cell: &Cell) -> Decimal {
        self.parse_cell(cell).or_zero()
    }

    pub fn parse_cell(&self, cell: &Cell) -> ParsedAmount {
        match cell {
            Cell::Empty => ParsedAmount::Absent,
            Cell::Number(n) => Decimal::from_f64(*n)
                .map(ParsedAmount::Value)
                .unwrap_or_else(|| ParsedAmount::Unparseable(n.to_string())),
            Cell::Text(s) => self.parse_text(s),
            Cell::Date(_) => ParsedAmount::Unparseable(cell.as_text()),
        }
    }

    pub fn parse_text(&self, raw: &str) -> ParsedAmount {
        let cleaned: String = raw
            .to_lowercase()
            .replace("idr", "")
            .replace("rp", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if cleaned.is_empty() || cleaned == "-" {
            return ParsedAmount::Absent;
        }

        // 会计记法 (1.000) → -1000
        let (negative, body) = match cleaned
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
        {
            Some(inner) => (true, inner),
            None => match cleaned.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, cleaned.as_str()),
            },
        };

        let canonical = self.canonicalize_separators(body);
        match Decimal::from_str(&canonical) {
            Ok(v) if negative => ParsedAmount::Value(-v),
            Ok(v) => ParsedAmount::Value(v),
            Err(_) => ParsedAmount::Unparseable(raw.trim().to_string()),
        }
    }

    /// 统一为 "." 作小数点、无千分位的形式
    fn canonicalize_separators(&self, s: &str) -> String {
        let dot_count = s.matches('.').count();
        let comma_count = s.matches(',').count();

        match (dot_count, comma_count) {
            (0, 0) => s.to_string(),
            (_, 0) if dot_count > 1 => s.replace('.', ""),
            (_, 0) => {
                let fraction_len = s.rsplit('.').next().map(str::len).unwrap_or(0);
                if fraction_len == 3 && self.single_dot == SingleDotPolicy::ThreeDigitGroup {
                    s.replace('.', "")
                } else {
                    s.to_string()
                }
            }
            (0, _) => s.replace(',', "."),
            _ => {
                let last_dot = s.rfind('.').unwrap_or(0);
                let last_comma = s.rfind(',').unwrap_or(0);
                if last_comma > last_dot {
                    s.replace('.', "").replace(',', ".")
                } else {
                    s.replace(',', "")
                }
            }
        }
    }
}

/// 默认策略下的宽松规范化
pub fn normalize(raw: &str) -> Decimal {
    AmountParser::default().parse_text(raw).or_zero()
}
