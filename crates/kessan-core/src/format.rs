//! Numeric-to-text formatting for generated answers
//!
//! Currency is rendered in yen with three scales:
//! - `億円` for |v| ≥ 10^8 (one decimal)
//! - `万円` for |v| ≥ 10^4 (whole number)
//! - `円` below that
//!
//! The breakpoints and rounding are part of the output contract.

const OKU: f64 = 100_000_000.0;
const MAN: f64 = 10_000.0;

/// Round half toward positive infinity (`Math.round` semantics).
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Round to one decimal place, half toward positive infinity.
fn round_one_decimal(v: f64) -> f64 {
    round_half_up(v * 10.0) / 10.0
}

/// Format a yen amount using the 億/万/円 scale
pub fn format_currency(v: f64) -> String {
    let abs = v.abs();
    if abs >= OKU {
        format!("{:.1}億円", round_one_decimal(v / OKU))
    } else if abs >= MAN {
        format!("{}万円", round_half_up(v / MAN) as i64)
    } else {
        format!("{}円", round_half_up(v) as i64)
    }
}

/// Format a ratio as a percentage with one decimal (0.253 -> "25.3%")
pub fn format_percent(v: f64) -> String {
    format!("{:.1}%", round_one_decimal(v * 100.0))
}

/// Format a signed currency delta with an explicit `+` for gains
pub fn format_signed_currency(v: f64) -> String {
    if v >= 0.0 {
        format!("+{}", format_currency(v))
    } else {
        format_currency(v)
    }
}

/// Safe share: `part / whole`, or zero when `whole` is not positive
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}
