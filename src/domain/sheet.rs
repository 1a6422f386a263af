// ==========================================
// 运费账单对账系统 - 原始工作表模型
// ==========================================
// 职责: 与文件格式无关的单元格网格（行 × 列）
// 坐标: 0-based 绝对坐标，与源文件中的位置一致
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// 单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 文本表示（不做 trim）
    ///
    /// 整数值的数字不带 ".0"，以便编码类字段（如数字型 Kode Tugas）保持原样
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Excel 可表示的最大序列日期（不含），对应 10000-01-01
pub const EXCEL_SERIAL_LIMIT: f64 = 2_958_466.0;

/// Excel 序列日期 → 日期时间（1900 日期系统，纪元 1899-12-30）
///
/// 超出 Excel 日期范围的数值视为非日期
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..EXCEL_SERIAL_LIMIT).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(TimeDelta::try_days(days)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

// ==========================================
// RawSheet - 原始工作表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// 由字符串网格构造（CSV 与测试使用）
    pub fn from_text_rows(name: impl Into<String>, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Cell::from).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 列数（所有行中的最大宽度）
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 读取单元格，越界视为空
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// 遍历 (行索引, 行数据)
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows.iter().enumerate().map(|(i, r)| (i, r.as_slice()))
    }

    /// 指定行的文本（表头读取）
    pub fn row_text(&self, row: usize) -> Vec<String> {
        (0..self.width).map(|c| self.cell(row, c).as_text()).collect()
    }
}
