//! Derived metrics over P&L series
//!
//! Secondary facts the answer builders cite: the year a quantity turns
//! non-negative, year-over-year deltas, margins and growth rates.

use crate::format::ratio;
use crate::model::{Series, YEARS};

/// First index `i >= 1` where `series[i-1] < 0 <= series[i]`.
///
/// A series that starts non-negative and never dips, or that never
/// recovers once negative, has no crossover.
pub fn find_crossover(series: &[f64]) -> Option<usize> {
    (1..series.len()).find(|&i| series[i - 1] < 0.0 && series[i] >= 0.0)
}

/// Year-over-year deltas (`series[i] - series[i-1]`), one fewer than the input
pub fn yoy_deltas(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Year-over-year growth rates, zero where the prior year is not positive
pub fn yoy_growth(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| ratio(w[1] - w[0], w[0]))
        .collect()
}

/// Compound annual growth rate between the first and last element.
///
/// Returns `None` when either endpoint is not positive.
pub fn cagr(series: &[f64]) -> Option<f64> {
    let (first, last) = (*series.first()?, *series.last()?);
    let periods = series.len().checked_sub(1).filter(|&p| p > 0)?;
    if first <= 0.0 || last <= 0.0 {
        return None;
    }
    Some((last / first).powf(1.0 / periods as f64) - 1.0)
}

/// Element-wise `numerator / denominator` with guarded division
pub fn margins(numerator: &Series, denominator: &Series) -> Series {
    let mut out = [0.0; YEARS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = ratio(numerator[i], denominator[i]);
    }
    out
}

pub fn total(series: &[f64]) -> f64 {
    series.iter().sum()
}

/// Peak funding requirement: the depth of the lowest cumulative cash point.
///
/// Returns `None` if cumulative cash never goes negative.
pub fn peak_funding_need(cumulative: &[f64]) -> Option<f64> {
    let min = cumulative.iter().copied().fold(f64::INFINITY, f64::min);
    (min < 0.0).then_some(-min)
}

/// Project FY1..FY5 revenue from a starting value and a constant growth rate
pub fn project_revenue(revenue_fy1: f64, growth_rate: f64) -> Series {
    let mut out = [0.0; YEARS];
    let mut current = revenue_fy1;
    for slot in out.iter_mut() {
        *slot = current;
        current *= 1.0 + growth_rate;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_crossover() {
        assert_eq!(find_crossover(&[-5.0, -3.0, -1.0, 2.0, 5.0]), Some(3));
        assert_eq!(find_crossover(&[1.0, 2.0, 3.0]), None);
        assert_eq!(find_crossover(&[-1.0, -2.0, -3.0]), None);
        assert_eq!(find_crossover(&[-1.0, 0.0, 1.0]), Some(1));
        assert_eq!(find_crossover(&[]), None);
        assert_eq!(find_crossover(&[-1.0]), None);
    }

    #[test]
    fn test_crossover_takes_first_recovery() {
        assert_eq!(find_crossover(&[1.0, -1.0, 2.0, -3.0, 4.0]), Some(2));
    }

    #[test]
    fn test_yoy() {
        assert_eq!(yoy_deltas(&[100.0, 130.0, 120.0]), vec![30.0, -10.0]);
        assert_eq!(yoy_growth(&[0.0, 100.0, 150.0]), vec![0.0, 0.5]);
    }

    #[test]
    fn test_cagr() {
        let growth = cagr(&[100.0, 0.0, 0.0, 0.0, 1600.0]).unwrap();
        assert!((growth - 1.0).abs() < 1e-9);
        assert_eq!(cagr(&[0.0, 10.0]), None);
        assert_eq!(cagr(&[10.0]), None);
    }

    #[test]
    fn test_margins_guard_zero_revenue() {
        let op = [-10.0, 0.0, 10.0, 20.0, 30.0];
        let rev = [0.0, 100.0, 100.0, 100.0, 100.0];
        assert_eq!(margins(&op, &rev), [0.0, 0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_peak_funding_need() {
        assert_eq!(peak_funding_need(&[-10.0, -30.0, -5.0, 20.0]), Some(30.0));
        assert_eq!(peak_funding_need(&[0.0, 5.0]), None);
    }

    #[test]
    fn test_project_revenue() {
        let projected = project_revenue(100.0, 0.5);
        assert_eq!(projected[0], 100.0);
        assert_eq!(projected[2], 225.0);
    }
}
