// ==========================================
// 运费账单对账系统 - 发票内容构建
// ==========================================
// 职责: NormalizedRecord → InvoiceDocument（不涉及单元格样式）
// 规则:
//   - 单价取 Tarif Sistem
//   - 趟次类型 = Mode Operasi 大写，含 SEPIHAK → SINGLE TRIP
//   - 按 (路线, 车型, 趟次类型) 分组，按路线排序
//   - 行 PPN = 行合计 × vat_rate（with_tax），否则 0
//   - PPH = DPP × pph_rate
//   - 应付 = DPP + PPN - PPH（with_tax），否则 = DPP
// ==========================================

use crate::config::ReconConfig;
use crate::domain::invoice::{InvoiceDocument, InvoiceHeader, InvoiceLine, InvoiceTotals, TripDetail};
use crate::domain::record::NormalizedRecord;
use crate::domain::summary::checked_sum;
use crate::domain::types::TaxMode;
use crate::report::error::{ReportError, ReportResult};
use crate::report::period::period_label;
use crate::report::terbilang::rupiah_in_words;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

/// 源文件名中的 "<日期>_<代码>_" 前缀
static SOURCE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)_([A-Za-z0-9]+)_").expect("valid source name pattern"));

/// 趟次类型映射
pub fn trip_type(operation_mode: &str) -> String {
    let upper = operation_mode.trim().to_uppercase();
    if upper.contains("SEPIHAK") {
        "SINGLE TRIP".to_string()
    } else {
        upper
    }
}

/// 从源文件名中取 (日期部分, 代码)，均为大写
pub fn source_name_parts(filename: &str) -> Option<(String, String)> {
    let caps = SOURCE_NAME_REGEX.captures(filename)?;
    Some((
        caps.get(1)?.as_str().trim().to_uppercase(),
        caps.get(2)?.as_str().trim().to_uppercase(),
    ))
}

/// "PROJEK J&T EXPRESS BGR"；文件名不含代码时只用前缀
pub fn project_name(prefix: &str, first_source_file: Option<&str>) -> String {
    match first_source_file.and_then(source_name_parts) {
        Some((_, code)) => format!("{} {}", prefix, code),
        None => prefix.to_string(),
    }
}

pub struct InvoiceBuilder {
    vat_rate: Decimal,
    pph_rate: Decimal,
    project_prefix: String,
}

impl InvoiceBuilder {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            vat_rate: config.vat_rate,
            pph_rate: config.pph_rate,
            project_prefix: config.project_prefix.clone(),
        }
    }

    pub fn build(
        &self,
        records: &[NormalizedRecord],
        header: InvoiceHeader,
        tax_mode: TaxMode,
    ) -> ReportResult<InvoiceDocument> {
        let trips = trips_from_records(records);
        let lines = self.group_lines(&trips, tax_mode)?;
        let totals = self.compute_totals(&lines, tax_mode)?;

        debug!(
            trips = trips.len(),
            lines = lines.len(),
            dpp = %totals.dpp,
            payable = %totals.payable,
            "发票内容构建完成"
        );

        Ok(InvoiceDocument {
            header,
            tax_mode,
            period_label: period_label(records.iter().filter_map(|r| r.departure_date)),
            project_name: project_name(
                &self.project_prefix,
                records.first().map(|r| r.source_file.as_str()),
            ),
            amount_in_words: rupiah_in_words(totals.payable),
            lines,
            trips,
            totals,
        })
    }

    /// 分组生成发票行
    pub fn group_lines(
        &self,
        trips: &[TripDetail],
        tax_mode: TaxMode,
    ) -> ReportResult<Vec<InvoiceLine>> {
        let mut groups: BTreeMap<(&str, &str, &str), Vec<Decimal>> = BTreeMap::new();
        for trip in trips {
            groups
                .entry((
                    trip.route.as_str(),
                    trip.vehicle_type.as_str(),
                    trip.trip_type.as_str(),
                ))
                .or_default()
                .push(trip.price);
        }

        groups
            .into_iter()
            .enumerate()
            .map(|(idx, ((route, vehicle_type, trip_type), prices))| -> ReportResult<InvoiceLine> {
                let unit_price = prices.first().copied().unwrap_or_default();
                let amount = checked_sum(prices.iter().copied())
                    .ok_or_else(|| overflow(format!("{} {} {}", route, vehicle_type, trip_type)))?;
                let vat = match tax_mode {
                    TaxMode::WithTax => amount
                        .checked_mul(self.vat_rate)
                        .ok_or_else(|| overflow(format!("PPN {}", route)))?,
                    TaxMode::NoTax => Decimal::ZERO,
                };
                Ok(InvoiceLine {
                    no: idx + 1,
                    route: route.to_string(),
                    vehicle_type: vehicle_type.to_string(),
                    trip_type: trip_type.to_string(),
                    trip_count: prices.len(),
                    unit_price,
                    amount,
                    vat,
                    price_varies: prices.iter().any(|p| *p != unit_price),
                })
            })
            .collect()
    }

    pub fn compute_totals(
        &self,
        lines: &[InvoiceLine],
        tax_mode: TaxMode,
    ) -> ReportResult<InvoiceTotals> {
        let dpp = checked_sum(lines.iter().map(|l| l.amount)).ok_or_else(|| overflow("DPP"))?;
        let vat = checked_sum(lines.iter().map(|l| l.vat)).ok_or_else(|| overflow("PPN"))?;
        let pph = dpp
            .checked_mul(self.pph_rate)
            .ok_or_else(|| overflow("PPH"))?;
        let payable = match tax_mode {
            TaxMode::WithTax => dpp
                .checked_add(vat)
                .and_then(|v| v.checked_sub(pph))
                .ok_or_else(|| overflow("Total Bayar"))?,
            TaxMode::NoTax => dpp,
        };
        Ok(InvoiceTotals {
            discount: Decimal::ZERO,
            dpp,
            vat,
            pph,
            payable,
        })
    }
}

fn overflow(what: impl Into<String>) -> ReportError {
    ReportError::AmountOverflow(what.into())
}

/// 每条记录一趟
pub fn trips_from_records(records: &[NormalizedRecord]) -> Vec<TripDetail> {
    records
        .iter()
        .enumerate()
        .map(|(idx, r)| TripDetail {
            no: idx + 1,
            date: r.departure_date,
            route: r.route_name.clone(),
            task_code: r.task_code.clone(),
            vehicle_type: r.vehicle_type.trim().to_uppercase(),
            trip_type: trip_type(&r.operation_mode),
            plate_number: r.plate_number.clone(),
            price: r.system_rate,
            source_file: r.source_file.clone(),
        })
        .collect()
}
