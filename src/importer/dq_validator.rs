// ==========================================
// 运费账单对账系统 - 数据质量校验器实现
// ==========================================
// 职责: 行级格式校验（只产生警告，不丢弃行）
//   - Jenis Mobil 必须包含有效车型代码
//   - PPH 应为负数（代扣）
//   - PPN 应为非负数
//   - 可选: 非空但无法解析的金额
// ==========================================

use crate::domain::record::NormalizedRecord;
use rust_decimal::Decimal;

pub struct DqValidator {
    valid_vehicle_types: Vec<String>, // 大写
}

impl DqValidator {
    pub fn new(valid_vehicle_types: &[String]) -> Self {
        Self {
            valid_vehicle_types: valid_vehicle_types
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// 对一条已接受的记录执行全部校验
    pub fn validate(&self, record: &NormalizedRecord) -> Vec<String> {
        [
            self.check_vehicle_type(record),
            self.check_tax_withheld(record),
            self.check_vat(record),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// 车型校验（大小写不敏感的包含匹配）
    pub fn check_vehicle_type(&self, record: &NormalizedRecord) -> Option<String> {
        if self.valid_vehicle_types.is_empty() {
            return None;
        }
        let upper = record.vehicle_type.to_uppercase();
        if self
            .valid_vehicle_types
            .iter()
            .any(|code| upper.contains(code.as_str()))
        {
            return None;
        }
        Some(format!(
            "Row {}: Jenis Mobil is '{}' (Expected: '{}')",
            record.row_number,
            record.vehicle_type,
            self.valid_vehicle_types.join("/")
        ))
    }

    pub fn check_tax_withheld(&self, record: &NormalizedRecord) -> Option<String> {
        (record.tax_withheld > Decimal::ZERO).then(|| {
            format!(
                "Row {}: PPH is '{}' (Expected: negative)",
                record.row_number, record.tax_withheld
            )
        })
    }

    pub fn check_vat(&self, record: &NormalizedRecord) -> Option<String> {
        (record.vat_amount < Decimal::ZERO).then(|| {
            format!(
                "Row {}: PPN is '{}' (Expected: zero or positive)",
                record.row_number, record.vat_amount
            )
        })
    }

    /// 非空但无法解析的金额单元格
    pub fn unparseable_amount(row_number: usize, field: &str, raw: &str) -> String {
        format!("Row {}: {} value '{}' is not a number", row_number, field, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(vehicle_type: &str, ppn: Decimal, pph: Decimal) -> NormalizedRecord {
        NormalizedRecord {
            operating_agent: "AGEN".to_string(),
            task_code: "T1".to_string(),
            route_name: "R".to_string(),
            plate_number: "B 1234 XX".to_string(),
            vehicle_type: vehicle_type.to_string(),
            operation_mode: "sepihak".to_string(),
            calculation_method: "trip".to_string(),
            weight: String::new(),
            rate_per_kg: String::new(),
            system_rate: dec!(1500000),
            vat_amount: ppn,
            tax_withheld: pph,
            actual_total: dec!(1486500),
            source_file: "a.xlsx".to_string(),
            departure_date: None,
            row_number: 7,
        }
    }

    fn validator() -> DqValidator {
        DqValidator::new(&["CDDL".to_string(), "TWB".to_string()])
    }

    #[test]
    fn test_valid_record_has_no_warnings() {
        let r = record("cddl long", dec!(16500), dec!(-30000));
        assert!(validator().validate(&r).is_empty());
    }

    #[test]
    fn test_vehicle_type_warning_text() {
        let r = record("FUSO", dec!(0), dec!(-30000));
        assert_eq!(
            validator().validate(&r),
            vec!["Row 7: Jenis Mobil is 'FUSO' (Expected: 'CDDL/TWB')".to_string()]
        );
    }

    #[test]
    fn test_tax_sign_checks() {
        let r = record("TWB", dec!(-1), dec!(30000));
        let warnings = validator().validate(&r);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Row 7: PPH is '30000'"));
        assert!(warnings[1].starts_with("Row 7: PPN is '-1'"));
    }

    #[test]
    fn test_empty_vehicle_list_disables_check() {
        let r = record("FUSO", dec!(0), dec!(0));
        assert!(DqValidator::new(&[]).validate(&r).is_empty());
    }
}
