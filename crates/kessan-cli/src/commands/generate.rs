//! Q&A generation command

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use kessan_core::{
    export::export_deck, BenchmarkCatalog, ExportFormat, QaContext, QaDeck, QaEngine, QaSettings,
};

/// Build settings from the raw CLI strings
pub fn parse_settings(target: &str, detail: &str, length: &str, count: i64) -> Result<QaSettings> {
    Ok(QaSettings {
        target: target.parse().map_err(anyhow::Error::msg)?,
        detail_level: detail.parse().map_err(anyhow::Error::msg)?,
        answer_length: length.parse().map_err(anyhow::Error::msg)?,
        count,
    })
}

/// Read a context file
pub fn load_context(path: &Path) -> Result<QaContext> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    QaContext::from_json_str(&content)
        .with_context(|| format!("Invalid context JSON: {}", path.display()))
}

/// Run the engine and wrap the result as a deck
pub fn generate_deck(
    catalog: BenchmarkCatalog,
    context: &QaContext,
    settings: QaSettings,
) -> QaDeck {
    if let Some(industry) = context.industry.as_deref() {
        if catalog.get(industry).is_none() {
            tracing::warn!(industry, "Unknown industry, falling back to Other");
        }
    }

    let engine = QaEngine::with_benchmarks(catalog);
    let industry = engine
        .benchmarks()
        .resolve(context.industry.as_deref())
        .name
        .clone();
    let items = engine.generate(context, &settings);

    QaDeck::new(industry, settings, items)
}

/// Render a deck as text or one of the export formats
pub fn render_deck(deck: &QaDeck, format: &str) -> Result<String> {
    if format.eq_ignore_ascii_case("text") {
        return Ok(render_text(deck));
    }
    let format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;
    export_deck(deck, format).context("Failed to export Q&A deck")
}

fn render_text(deck: &QaDeck) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "📋 想定問答 ({} / {} / {}件)\n",
        deck.industry,
        deck.settings.target,
        deck.items.len()
    ));
    out.push_str("   ─────────────────────────────────────────────────────────────\n");

    if deck.items.is_empty() {
        out.push_str("   No questions generated.\n");
        return out;
    }

    for item in &deck.items {
        out.push('\n');
        out.push_str(&format!(
            "   [{}] {} ・ 優先度 {}\n",
            item.id,
            item.category.label(),
            item.priority
        ));
        out.push_str(&format!("   Q. {}\n", item.question));
        for (i, line) in item.answer.lines().enumerate() {
            if i == 0 {
                out.push_str(&format!("   A. {}\n", line));
            } else if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("      {}\n", line));
            }
        }
    }

    out
}

pub fn cmd_generate(
    catalog: BenchmarkCatalog,
    context_path: &Path,
    settings: QaSettings,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let context = load_context(context_path)?;
    let deck = generate_deck(catalog, &context, settings);
    let rendered = render_deck(&deck, format)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(rendered.as_bytes())?;
            println!(
                "✅ Exported {} questions to {}",
                deck.items.len(),
                path.display()
            );
        }
        None => {
            // Write to stdout
            print!("{}", rendered);
        }
    }

    Ok(())
}
