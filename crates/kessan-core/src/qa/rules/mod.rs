//! Built-in answer-builder rules, one module per category
//!
//! Answers are written as paragraph blocks joined by a blank line so the
//! compressor can cut them to length. The first paragraph of every answer
//! is a one-sentence summary.

pub mod cost;
pub mod funding;
pub mod growth;
pub mod market;
pub mod operations;
pub mod profitability;
pub mod revenue;
pub mod risk;

use crate::benchmark::{IndustryBenchmark, Trend};

use super::compress::PARAGRAPH_DELIMITER;

/// Join paragraph blocks, skipping empty ones
pub(crate) fn join_paragraphs(blocks: Vec<String>) -> String {
    blocks
        .into_iter()
        .filter(|b| !b.trim().is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_DELIMITER)
}

/// Render lines as a `- ` bullet list
pub(crate) fn bullets<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|l| format!("- {}", l.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headcount-style number: integer when whole, else one decimal
pub(crate) fn format_count(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}

/// Parse a fiscal-year label ("FY3") into a series index
pub(crate) fn parse_fy(label: &str) -> Option<usize> {
    let n: usize = label.trim().strip_prefix("FY")?.parse().ok()?;
    (1..=crate::model::YEARS).contains(&n).then(|| n - 1)
}

/// First trend whose impact mentions `keyword`, else the first trend
pub(crate) fn trend_about<'a>(benchmark: &'a IndustryBenchmark, keyword: &str) -> Option<&'a Trend> {
    benchmark
        .trends
        .iter()
        .find(|t| t.impact.contains(keyword))
        .or_else(|| benchmark.trends.first())
}

/// Non-empty explicit year from the KPI summary
pub(crate) fn kpi_year(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_paragraphs_skips_empty() {
        let joined = join_paragraphs(vec!["A。".into(), String::new(), "B。".into()]);
        assert_eq!(joined, "A。\n\nB。");
    }

    #[test]
    fn test_bullets() {
        assert_eq!(bullets(["a", "b"]), "- a\n- b");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(12.0), "12");
        assert_eq!(format_count(2.5), "2.5");
    }

    #[test]
    fn test_parse_fy() {
        assert_eq!(parse_fy("FY3"), Some(2));
        assert_eq!(parse_fy(" FY1 "), Some(0));
        assert_eq!(parse_fy("FY6"), None);
        assert_eq!(parse_fy("FY0"), None);
        assert_eq!(parse_fy("2027"), None);
    }

    #[test]
    fn test_kpi_year() {
        assert_eq!(kpi_year(Some("  ")), None);
        assert_eq!(kpi_year(Some("FY2")), Some("FY2"));
        assert_eq!(kpi_year(None), None);
    }
}
