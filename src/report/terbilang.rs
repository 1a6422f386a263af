// ==========================================
// 运费账单对账系统 - 金额大写（印尼语）
// ==========================================
// 范围: 0 ..= 999_999_999_999，不支持小数与负数
// ==========================================

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const UNITS: [&str; 12] = [
    "", "SATU", "DUA", "TIGA", "EMPAT", "LIMA", "ENAM", "TUJUH", "DELAPAN", "SEMBILAN", "SEPULUH",
    "SEBELAS",
];

/// 可拼读的上限（不含）
pub const TERBILANG_LIMIT: u64 = 1_000_000_000_000;

/// 整数 → 印尼语大写，超出范围返回 None
pub fn amount_in_words(n: u64) -> Option<String> {
    if n >= TERBILANG_LIMIT {
        return None;
    }
    if n == 0 {
        return Some("NOL".to_string());
    }
    let mut words = Vec::new();
    spell(n, &mut words);
    Some(words.join(" "))
}

/// 金额（取整数部分）→ 大写 + " RUPIAH"；负数或超范围为空串
pub fn rupiah_in_words(amount: Decimal) -> String {
    amount
        .trunc()
        .to_u64()
        .and_then(amount_in_words)
        .map(|w| format!("{} RUPIAH", w))
        .unwrap_or_default()
}

fn spell(n: u64, out: &mut Vec<&'static str>) {
    match n {
        0 => {}
        1..=11 => out.push(UNITS[n as usize]),
        12..=19 => {
            spell(n % 10, out);
            out.push("BELAS");
        }
        20..=99 => {
            spell(n / 10, out);
            out.push("PULUH");
            spell(n % 10, out);
        }
        100..=199 => {
            out.push("SERATUS");
            spell(n - 100, out);
        }
        200..=999 => {
            spell(n / 100, out);
            out.push("RATUS");
            spell(n % 100, out);
        }
        1_000..=1_999 => {
            out.push("SERIBU");
            spell(n - 1_000, out);
        }
        2_000..=999_999 => {
            spell(n / 1_000, out);
            out.push("RIBU");
            spell(n % 1_000, out);
        }
        1_000_000..=999_999_999 => {
            spell(n / 1_000_000, out);
            out.push("JUTA");
            spell(n % 1_000_000, out);
        }
        _ => {
            spell(n / 1_000_000_000, out);
            out.push("MILYAR");
            spell(n % 1_000_000_000, out);
        }
    }
}
