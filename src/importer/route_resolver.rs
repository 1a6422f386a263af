// ==========================================
// 运费账单对账系统 - 路线名解析器
// ==========================================
// 优先级: 主数据命中 > 截断规则
// 主数据存在但未命中时，返回未命中的 Kode Tugas 供调用方汇总
// ==========================================

use crate::domain::master::MasterMapping;
use crate::domain::types::RoutePolicy;

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub route_name: String,
    /// 主数据未命中的编码
    pub missing: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteResolver {
    policy: RoutePolicy,
}

impl RouteResolver {
    pub fn new(policy: RoutePolicy) -> Self {
        Self { policy }
    }

    /// 解析路线名
    ///
    /// # 参数
    /// - task_code: Kode Tugas（空或 "nan" 时跳过查表）
    /// - raw_route: 源表中的路线文本
    /// - mapping: 主数据（为空表示未提供）
    pub fn resolve(&self, task_code: &str, raw_route: &str, mapping: &MasterMapping) -> Resolution {
        let code = task_code.trim();
        let lookup_allowed = !code.is_empty() && !code.eq_ignore_ascii_case("nan");

        if lookup_allowed && !mapping.is_empty() {
            if let Some(name) = mapping.get(code) {
                return Resolution {
                    route_name: name.to_string(),
                    missing: None,
                };
            }
            return Resolution {
                route_name: self.truncate(raw_route),
                missing: Some(code.to_string()),
            };
        }

        Resolution {
            route_name: self.truncate(raw_route),
            missing: None,
        }
    }

    /// 截断规则
    pub fn truncate(&self, raw_route: &str) -> String {
        let raw = raw_route.trim();
        match self.policy {
            RoutePolicy::JoinFirstThree => {
                let segments: Vec<&str> = raw.split('-').collect();
                if segments.len() >= 3 {
                    segments[..3].join("-")
                } else {
                    raw.to_string()
                }
            }
            RoutePolicy::AbbreviateSegments => raw
                .split('-')
                .map(|seg| seg.trim().chars().take(3).collect::<String>())
                .collect::<Vec<_>>()
                .join(" - "),
        }
    }
}
