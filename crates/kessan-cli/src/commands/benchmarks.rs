//! Benchmark dataset commands (list, show, path)

use anyhow::Result;
use kessan_core::{benchmark::default_override_path, BenchmarkCatalog, Driver};

use super::{format_driver_value, truncate};

pub fn cmd_benchmarks_list(catalog: &BenchmarkCatalog) -> Result<()> {
    println!();
    println!("🏭 Industries ({})", catalog.industries().len());
    println!("   ─────────────────────────────────────────────────────────────");
    for industry in catalog.industries() {
        println!(
            "   {:<15} {:<15} {}",
            industry.key,
            industry.name,
            truncate(&industry.label, 20)
        );
    }
    Ok(())
}

pub fn cmd_benchmarks_show(catalog: &BenchmarkCatalog, industry: &str) -> Result<()> {
    let benchmark = catalog.require(industry)?;

    println!();
    println!("🏭 {} ({})", benchmark.label, benchmark.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Valuation multiple: {:.1}x revenue", benchmark.valuation_multiple);

    println!();
    println!("   Drivers (low / mid / high):");
    for driver in Driver::all() {
        let range = benchmark.range(*driver);
        println!(
            "     {:<12} {} / {} / {}",
            range.label,
            format_driver_value(*driver, range.low),
            format_driver_value(*driver, range.mid),
            format_driver_value(*driver, range.high)
        );
    }

    if !benchmark.kpis.is_empty() {
        println!();
        println!("   KPIs:");
        for kpi in &benchmark.kpis {
            println!("     • {} - {} (目安: {})", kpi.name, kpi.description, kpi.benchmark);
        }
    }

    if !benchmark.competitors.is_empty() {
        println!();
        println!("   Competitors:");
        for competitor in &benchmark.competitors {
            println!("     • {} - {}", competitor.name, competitor.description);
        }
    }

    if !benchmark.trends.is_empty() {
        println!();
        println!("   Trends:");
        for trend in &benchmark.trends {
            println!("     • {}: {}", trend.title, trend.description);
            println!("       → {}", trend.impact);
        }
    }

    let env = &benchmark.competitive_environment;
    if !env.market_structure.is_empty() {
        println!();
        println!("   Market structure: {}", env.market_structure);
        if !env.key_success_factors.is_empty() {
            println!("   Key success factors: {}", env.key_success_factors.join(", "));
        }
        if !env.entry_barriers.is_empty() {
            println!("   Entry barriers: {}", env.entry_barriers);
        }
    }

    Ok(())
}

pub fn cmd_benchmarks_path(catalog: &BenchmarkCatalog) -> Result<()> {
    println!();
    match catalog.source() {
        Some(path) => println!("   Loaded from: {}", path.display()),
        None => println!("   Loaded from: (embedded)"),
    }

    match default_override_path() {
        Some(path) => {
            let status = if path.exists() { "present" } else { "not present" };
            println!("   Override file: {} ({})", path.display(), status);
        }
        None => println!("   Override file: (no data directory on this platform)"),
    }

    Ok(())
}
