// ==========================================
// 运费账单对账系统 - 运单列布局
// ==========================================
// 职责: 语义字段 → 固定列索引（0-based）
// 说明: 运单表头文字不可靠，一律按位置取列
// ==========================================

use crate::domain::sheet::RawSheet;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// 表头所在行（0-based），数据从下一行开始
    pub header_row: usize,

    pub operating_agent: usize,    // B
    pub task_code: usize,          // D
    pub route: usize,              // G
    pub plate_number: usize,       // H
    pub vehicle_type: usize,       // I
    pub operation_mode: usize,     // J
    pub departure_date: usize,     // K
    pub calculation_method: usize, // O
    pub system_rate: usize,        // P
    pub vat_amount: usize,         // U
    pub tax_withheld: usize,       // V
    pub actual_total: usize,       // W
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            header_row: 3,
            operating_agent: 1,
            task_code: 3,
            route: 6,
            plate_number: 7,
            vehicle_type: 8,
            operation_mode: 9,
            departure_date: 10,
            calculation_method: 14,
            system_rate: 15,
            vat_amount: 20,
            tax_withheld: 21,
            actual_total: 22,
        }
    }
}

impl ColumnLayout {
    fn indices(&self) -> [usize; 12] {
        [
            self.operating_agent,
            self.task_code,
            self.route,
            self.plate_number,
            self.vehicle_type,
            self.operation_mode,
            self.departure_date,
            self.calculation_method,
            self.system_rate,
            self.vat_amount,
            self.tax_withheld,
            self.actual_total,
        ]
    }

    /// 工作表至少需要的列数
    pub fn required_width(&self) -> usize {
        self.indices().iter().copied().max().unwrap_or(0) + 1
    }

    pub fn first_data_row(&self) -> usize {
        self.header_row + 1
    }

    /// 每张表只校验一次：列数不足则整表拒绝
    pub fn validate(&self, sheet: &RawSheet) -> ImportResult<()> {
        let required = self.required_width();
        if sheet.width() < required {
            return Err(ImportError::InsufficientColumns {
                found: sheet.width(),
                required,
            });
        }
        Ok(())
    }
}
