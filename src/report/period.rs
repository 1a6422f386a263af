// ==========================================
// 运费账单对账系统 - 账期文本
// ==========================================
// 同月:   "Periode 1-7 Desember 2025"
// 同年:   "Periode 28 November - 4 Desember 2025"
// 跨年:   "Periode 29 Desember 2025 - 2 Januari 2026"
// 无日期: "Periode -"
// ==========================================

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// 月份的印尼语名称
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[date.month0() as usize]
}

pub fn period_label<I>(dates: I) -> String
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut iter = dates.into_iter();
    let first = match iter.next() {
        Some(d) => d,
        None => return "Periode -".to_string(),
    };
    let (min, max) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

    if min.year() == max.year() && min.month() == max.month() {
        format!(
            "Periode {}-{} {} {}",
            min.day(),
            max.day(),
            month_name(min),
            min.year()
        )
    } else if min.year() == max.year() {
        format!(
            "Periode {} {} - {} {} {}",
            min.day(),
            month_name(min),
            max.day(),
            month_name(max),
            max.year()
        )
    } else {
        format!(
            "Periode {} {} {} - {} {} {}",
            min.day(),
            month_name(min),
            min.year(),
            max.day(),
            month_name(max),
            max.year()
        )
    }
}

/// 收据日期: "18 Oktober 2026"
pub fn long_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date), date.year())
}
