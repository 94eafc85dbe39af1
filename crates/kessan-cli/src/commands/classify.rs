//! Driver classification command

use anyhow::Result;
use kessan_core::{
    format::{format_currency, format_percent},
    BenchmarkCatalog, BenchmarkRange, Deviation, Driver,
};

/// Classify `value` for `driver` against the named industry
pub fn classify_value(
    catalog: &BenchmarkCatalog,
    industry: &str,
    driver: &str,
    value: f64,
) -> Result<(Driver, Deviation, BenchmarkRange)> {
    let benchmark = catalog.require(industry)?;
    let driver: Driver = driver.parse().map_err(anyhow::Error::msg)?;
    if !value.is_finite() {
        anyhow::bail!("Value must be a finite number");
    }
    let range = benchmark.range(driver).clone();
    Ok((driver, range.classify(value), range))
}

/// Render a driver value as a percentage or yen amount
pub fn format_driver_value(driver: Driver, value: f64) -> String {
    if driver.is_rate() {
        format_percent(value)
    } else {
        format_currency(value)
    }
}

pub fn cmd_classify(catalog: &BenchmarkCatalog, industry: &str, driver: &str, value: f64) -> Result<()> {
    let (driver, deviation, range) = classify_value(catalog, industry, driver, value)?;
    let benchmark = catalog.require(industry)?;

    println!();
    println!("🔍 {} ({})", range.label, benchmark.label);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Value: {}", format_driver_value(driver, value));
    println!(
        "   Range: {} / {} / {} (low / mid / high)",
        format_driver_value(driver, range.low),
        format_driver_value(driver, range.mid),
        format_driver_value(driver, range.high)
    );
    println!("   Result: {} ({})", deviation, deviation.tone());

    Ok(())
}
