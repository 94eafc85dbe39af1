//! Core types for the Q&A engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Q&A categories, in catalog declaration order.
///
/// The derived `Ord` follows this order and defines generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaCategory {
    Revenue,
    Cost,
    Profitability,
    Growth,
    Risk,
    Market,
    Operations,
    Funding,
}

impl QaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QaCategory::Revenue => "revenue",
            QaCategory::Cost => "cost",
            QaCategory::Profitability => "profitability",
            QaCategory::Growth => "growth",
            QaCategory::Risk => "risk",
            QaCategory::Market => "market",
            QaCategory::Operations => "operations",
            QaCategory::Funding => "funding",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            QaCategory::Revenue => "売上",
            QaCategory::Cost => "コスト",
            QaCategory::Profitability => "収益性",
            QaCategory::Growth => "成長性",
            QaCategory::Risk => "リスク",
            QaCategory::Market => "市場",
            QaCategory::Operations => "オペレーション",
            QaCategory::Funding => "資金調達",
        }
    }

    pub fn all() -> &'static [QaCategory] {
        &[
            QaCategory::Revenue,
            QaCategory::Cost,
            QaCategory::Profitability,
            QaCategory::Growth,
            QaCategory::Risk,
            QaCategory::Market,
            QaCategory::Operations,
            QaCategory::Funding,
        ]
    }
}

impl fmt::Display for QaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QaCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Intended reader of the generated deck
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Investor,
    Banker,
    Board,
    Team,
    Partner,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Investor => "investor",
            Audience::Banker => "banker",
            Audience::Board => "board",
            Audience::Team => "team",
            Audience::Partner => "partner",
        }
    }

    /// Whether funding questions are relevant to this audience
    pub fn wants_funding(&self) -> bool {
        matches!(self, Audience::Investor | Audience::Banker)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investor" => Ok(Audience::Investor),
            "banker" => Ok(Audience::Banker),
            "board" => Ok(Audience::Board),
            "team" => Ok(Audience::Team),
            "partner" => Ok(Audience::Partner),
            _ => Err(format!(
                "Unknown audience: {}. Available: investor, banker, board, team, partner",
                s
            )),
        }
    }
}

/// How much supporting detail answers carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Executive,
    #[default]
    Standard,
    Detailed,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Executive => "executive",
            DetailLevel::Standard => "standard",
            DetailLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "executive" => Ok(DetailLevel::Executive),
            "standard" => Ok(DetailLevel::Standard),
            "detailed" => Ok(DetailLevel::Detailed),
            _ => Err(format!(
                "Unknown detail level: {}. Available: executive, standard, detailed",
                s
            )),
        }
    }
}

/// Length tier applied to rendered answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerLength {
    Short,
    Medium,
    #[default]
    Long,
}

impl AnswerLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLength::Short => "short",
            AnswerLength::Medium => "medium",
            AnswerLength::Long => "long",
        }
    }
}

impl fmt::Display for AnswerLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnswerLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(AnswerLength::Short),
            "medium" => Ok(AnswerLength::Medium),
            "long" => Ok(AnswerLength::Long),
            _ => Err(format!(
                "Unknown answer length: {}. Available: short, medium, long",
                s
            )),
        }
    }
}

/// Audience and format settings for one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaSettings {
    #[serde(default)]
    pub target: Audience,
    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default)]
    pub answer_length: AnswerLength,
    /// Maximum number of items; zero or negative yields an empty deck
    pub count: i64,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            target: Audience::default(),
            detail_level: DetailLevel::default(),
            answer_length: AnswerLength::default(),
            count: 10,
        }
    }
}

/// Question/answer content produced by a rule (before ranking)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaDraft {
    pub question: String,
    pub answer: String,
    pub tags: Vec<String>,
}

impl QaDraft {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            tags: Vec::new(),
        }
    }

    /// Add keyword tags
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }
}

/// A generated question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaItem {
    /// Sequential id (`qa_1`, `qa_2`, ...) in generation order
    pub id: String,
    pub category: QaCategory,
    pub question: String,
    pub answer: String,
    /// Ranking weight; only the relative order is meaningful
    pub priority: i32,
    /// Keywords for downstream filtering
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_matches_declaration() {
        let mut shuffled = vec![
            QaCategory::Funding,
            QaCategory::Revenue,
            QaCategory::Market,
            QaCategory::Cost,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                QaCategory::Revenue,
                QaCategory::Cost,
                QaCategory::Market,
                QaCategory::Funding
            ]
        );
        assert_eq!(QaCategory::all().len(), 8);
    }

    #[test]
    fn test_enum_string_round_trip() {
        assert_eq!(QaCategory::from_str("risk").unwrap(), QaCategory::Risk);
        assert!(QaCategory::from_str("legal").is_err());
        assert_eq!(Audience::from_str("banker").unwrap(), Audience::Banker);
        assert_eq!(
            DetailLevel::from_str("detailed").unwrap(),
            DetailLevel::Detailed
        );
        assert_eq!(AnswerLength::from_str("short").unwrap(), AnswerLength::Short);
        assert!(AnswerLength::from_str("tiny").is_err());
    }

    #[test]
    fn test_settings_json_shape() {
        let settings: QaSettings = serde_json::from_str(
            r#"{"target":"team","detailLevel":"executive","answerLength":"medium","count":3}"#,
        )
        .unwrap();
        assert_eq!(settings.target, Audience::Team);
        assert_eq!(settings.detail_level, DetailLevel::Executive);
        assert_eq!(settings.answer_length, AnswerLength::Medium);
        assert_eq!(settings.count, 3);

        let minimal: QaSettings = serde_json::from_str(r#"{"count":-1}"#).unwrap();
        assert_eq!(minimal.target, Audience::Investor);
        assert_eq!(minimal.answer_length, AnswerLength::Long);
    }

    #[test]
    fn test_audience_funding_scope() {
        assert!(Audience::Investor.wants_funding());
        assert!(Audience::Banker.wants_funding());
        assert!(!Audience::Board.wants_funding());
        assert!(!Audience::Team.wants_funding());
        assert!(!Audience::Partner.wants_funding());
    }

    #[test]
    fn test_item_serializes_lowercase_category() {
        let item = QaItem {
            id: "qa_1".to_string(),
            category: QaCategory::Funding,
            question: "Q".to_string(),
            answer: "A".to_string(),
            priority: 9,
            tags: vec!["資金".to_string()],
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["category"], "funding");
        assert_eq!(json["priority"], 9);
    }
}
