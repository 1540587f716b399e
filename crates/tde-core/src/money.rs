//! Brazilian number formatting for user-facing text.
//!
//! Values are rounded to two decimals only when rendered. Nothing in the
//! engine rounds monetary values during computation.

/// `1234.5` → `"1.234,50"`.
pub fn format_decimal_br(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round();
    let integer = (cents / 100.0).trunc() as u64;
    let fraction = (cents - (integer as f64) * 100.0) as u64;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative && (integer > 0 || fraction > 0) {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{fraction:02}")
}

/// `1234.5` → `"R$ 1.234,50"`.
pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format_decimal_br(value))
}

/// Fraction rendered as a percentage: `0.0565` → `"5,65%"`.
pub fn format_percent_br(fraction: f64) -> String {
    format!("{}%", format_decimal_br(fraction * 100.0))
}
