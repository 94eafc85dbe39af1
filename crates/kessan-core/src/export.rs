//! Export functionality for generated Q&A decks
//!
//! Supports:
//! - JSON with a generation timestamp and the settings used
//! - Markdown, one section per question
//! - CSV, one row per question

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::qa::{QaItem, QaSettings};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Csv => "csv",
        }
    }

    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!(
                "Unknown export format: {}. Available: json, markdown, csv",
                s
            )),
        }
    }
}

/// A generated deck with the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaDeck {
    /// RFC 3339 generation time
    pub generated_at: String,
    /// Benchmark industry name the deck was generated against
    pub industry: String,
    pub settings: QaSettings,
    pub items: Vec<QaItem>,
}

impl QaDeck {
    /// Wrap generated items, stamping the current time
    pub fn new(industry: impl Into<String>, settings: QaSettings, items: Vec<QaItem>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            industry: industry.into(),
            settings,
            items,
        }
    }
}

/// Serialize a deck in the given format
pub fn export_deck(deck: &QaDeck, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_json(deck),
        ExportFormat::Markdown => Ok(export_markdown(deck)),
        ExportFormat::Csv => export_csv(&deck.items),
    }
}

pub fn export_json(deck: &QaDeck) -> Result<String> {
    Ok(serde_json::to_string_pretty(deck)?)
}

/// Markdown document: a header, then one `##` section per question
pub fn export_markdown(deck: &QaDeck) -> String {
    let mut out = String::new();
    out.push_str("# 想定問答集\n\n");
    out.push_str(&format!(
        "- 業界: {}\n- 想定読者: {}\n- 詳細度: {}\n- 回答の長さ: {}\n- 生成日時: {}\n",
        deck.industry,
        deck.settings.target,
        deck.settings.detail_level,
        deck.settings.answer_length,
        deck.generated_at
    ));

    for (i, item) in deck.items.iter().enumerate() {
        out.push_str(&format!("\n## Q{}. {}\n\n", i + 1, item.question));
        out.push_str(&format!(
            "*{}* ・ 優先度 {}",
            item.category.label(),
            item.priority
        ));
        if !item.tags.is_empty() {
            out.push_str(&format!(" ・ {}", item.tags.join(", ")));
        }
        out.push_str("\n\n");
        out.push_str(item.answer.trim_end());
        out.push('\n');
    }

    out
}

/// CSV with columns id, category, priority, question, answer, tags
pub fn export_csv(items: &[QaItem]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "category", "priority", "question", "answer", "tags"])?;

    for item in items {
        let priority = item.priority.to_string();
        let tags = item.tags.join(",");
        writer.write_record([
            item.id.as_str(),
            item.category.as_str(),
            priority.as_str(),
            item.question.as_str(),
            item.answer.as_str(),
            tags.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| crate::Error::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qa::{Audience, QaCategory};

    fn sample_deck() -> QaDeck {
        let items = vec![
            QaItem {
                id: "qa_7".to_string(),
                category: QaCategory::Funding,
                question: "調達資金の使途は？".to_string(),
                answer: "採用に40%を充てます。\n\n- 採用・人件費: 40%".to_string(),
                priority: 11,
                tags: vec!["資金調達".to_string(), "資金使途".to_string()],
            },
            QaItem {
                id: "qa_1".to_string(),
                category: QaCategory::Revenue,
                question: "初年度の売上目標は、どのような根拠ですか？".to_string(),
                answer: "初年度売上は**1.0億円**です。".to_string(),
                priority: 8,
                tags: Vec::new(),
            },
        ];
        QaDeck::new(
            "SaaS",
            QaSettings {
                target: Audience::Banker,
                ..Default::default()
            },
            items,
        )
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_export_json() {
        let deck = sample_deck();
        let json = export_json(&deck).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["generatedAt"].is_string());
        assert_eq!(value["industry"], "SaaS");
        assert_eq!(value["settings"]["target"], "banker");
        assert_eq!(value["items"][0]["category"], "funding");
        assert_eq!(value["items"][0]["priority"], 11);

        let parsed: QaDeck = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, deck);
    }

    #[test]
    fn test_export_markdown() {
        let md = export_markdown(&sample_deck());
        assert!(md.starts_with("# 想定問答集\n"));
        assert!(md.contains("- 想定読者: banker"));
        assert!(md.contains("## Q1. 調達資金の使途は？"));
        assert!(md.contains("*資金調達* ・ 優先度 11 ・ 資金調達, 資金使途"));
        assert!(md.contains("## Q2. 初年度の売上目標"));
        assert!(md.ends_with("初年度売上は**1.0億円**です。\n"));
    }

    #[test]
    fn test_export_csv_quotes_multiline_answers() {
        let csv = export_csv(&sample_deck().items).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,category,priority,question,answer,tags"));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "qa_7");
        assert_eq!(&rows[0][4], "採用に40%を充てます。\n\n- 採用・人件費: 40%");
        assert_eq!(&rows[0][5], "資金調達,資金使途");
        assert_eq!(&rows[1][3], "初年度の売上目標は、どのような根拠ですか？");
    }

    #[test]
    fn test_export_deck_dispatch() {
        let deck = sample_deck();
        assert!(export_deck(&deck, ExportFormat::Csv)
            .unwrap()
            .starts_with("id,"));
        assert!(export_deck(&deck, ExportFormat::Markdown)
            .unwrap()
            .starts_with("# "));
    }
}
