//! Industry benchmarks and deviation classification
//!
//! Benchmarks are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/kessan/config/benchmarks.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Lookups never fail: an unknown industry resolves to the generic `Other`
//! entry with neutral ranges.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default dataset (compiled into binary)
const DEFAULT_BENCHMARKS: &str = include_str!("../../../config/benchmarks.toml");

/// Key of the generic fallback industry
pub const OTHER_KEY: &str = "other";

/// Values below `low * BELOW_FACTOR` are classified `below`
pub const BELOW_FACTOR: f64 = 0.8;
/// Values above `high * AGGRESSIVE_FACTOR` are classified `aggressive`
pub const AGGRESSIVE_FACTOR: f64 = 1.2;

/// Position of a value relative to an industry range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deviation {
    Below,
    Normal,
    Above,
    Aggressive,
}

impl Deviation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Deviation::Below => "below",
            Deviation::Normal => "normal",
            Deviation::Above => "above",
            Deviation::Aggressive => "aggressive",
        }
    }

    /// Narrative tone used in answers
    pub fn tone(&self) -> &'static str {
        match self {
            Deviation::Below => "業界水準を下回る保守的な水準",
            Deviation::Normal => "業界標準の範囲内",
            Deviation::Above => "業界上限をやや上回る水準",
            Deviation::Aggressive => "業界水準を大きく上回るアグレッシブな水準",
        }
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Low/mid/high reference range for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub label: String,
}

impl BenchmarkRange {
    pub fn new(low: f64, mid: f64, high: f64, label: impl Into<String>) -> Self {
        Self {
            low,
            mid,
            high,
            label: label.into(),
        }
    }

    pub fn classify(&self, value: f64) -> Deviation {
        classify(value, self.low, self.high)
    }
}

/// Classify `value` against a `[low, high]` benchmark band.
///
/// - `below`: `value < low * 0.8`
/// - `aggressive`: `value > high * 1.2`
/// - `above`: `value > high`
/// - `normal`: everything else
pub fn classify(value: f64, low: f64, high: f64) -> Deviation {
    if value < low * BELOW_FACTOR {
        Deviation::Below
    } else if value > high * AGGRESSIVE_FACTOR {
        Deviation::Aggressive
    } else if value > high {
        Deviation::Above
    } else {
        Deviation::Normal
    }
}

/// Model drivers that carry a benchmark range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    RevenueFy1,
    GrowthRate,
    CogsRate,
    OpexBase,
    OpexGrowth,
}

impl Driver {
    /// Parameter key for this driver
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RevenueFy1 => "revenue_fy1",
            Self::GrowthRate => "growth_rate",
            Self::CogsRate => "cogs_rate",
            Self::OpexBase => "opex_base",
            Self::OpexGrowth => "opex_growth",
        }
    }

    pub fn all() -> &'static [Driver] {
        &[
            Self::RevenueFy1,
            Self::GrowthRate,
            Self::CogsRate,
            Self::OpexBase,
            Self::OpexGrowth,
        ]
    }

    /// Whether the driver is a ratio (rendered as a percentage)
    pub fn is_rate(&self) -> bool {
        matches!(self, Self::GrowthRate | Self::CogsRate | Self::OpexGrowth)
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "revenue_fy1" => Ok(Self::RevenueFy1),
            "growth_rate" => Ok(Self::GrowthRate),
            "cogs_rate" => Ok(Self::CogsRate),
            "opex_base" => Ok(Self::OpexBase),
            "opex_growth" => Ok(Self::OpexGrowth),
            _ => Err(format!(
                "Unknown driver: {}. Available: revenue_fy1, growth_rate, cogs_rate, opex_base, opex_growth",
                s
            )),
        }
    }
}

/// Ranges for the five model drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRanges {
    pub revenue_fy1: BenchmarkRange,
    pub growth_rate: BenchmarkRange,
    pub cogs_rate: BenchmarkRange,
    pub opex_base: BenchmarkRange,
    pub opex_growth: BenchmarkRange,
}

impl DriverRanges {
    /// Neutral ranges used when an industry omits a driver
    pub fn neutral() -> Self {
        Self {
            revenue_fy1: BenchmarkRange::new(10_000_000.0, 50_000_000.0, 200_000_000.0, "初年度売上"),
            growth_rate: BenchmarkRange::new(0.05, 0.15, 0.4, "売上成長率"),
            cogs_rate: BenchmarkRange::new(0.2, 0.4, 0.6, "売上原価率"),
            opex_base: BenchmarkRange::new(20_000_000.0, 50_000_000.0, 150_000_000.0, "初年度販管費"),
            opex_growth: BenchmarkRange::new(0.03, 0.08, 0.15, "販管費成長率"),
        }
    }

    pub fn get(&self, driver: Driver) -> &BenchmarkRange {
        match driver {
            Driver::RevenueFy1 => &self.revenue_fy1,
            Driver::GrowthRate => &self.growth_rate,
            Driver::CogsRate => &self.cogs_rate,
            Driver::OpexBase => &self.opex_base,
            Driver::OpexGrowth => &self.opex_growth,
        }
    }
}

/// Industry KPI definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkKpi {
    pub name: String,
    pub description: String,
    pub benchmark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub description: String,
}

/// Market trend with its expected P&L impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub title: String,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveEnvironment {
    pub market_structure: String,
    pub key_success_factors: Vec<String>,
    pub entry_barriers: String,
}

/// Benchmark data for one industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryBenchmark {
    /// Lookup key (lowercase table name in the dataset)
    pub key: String,
    /// Canonical name (e.g. "SaaS")
    pub name: String,
    /// Display label
    pub label: String,
    pub drivers: DriverRanges,
    pub kpis: Vec<BenchmarkKpi>,
    pub competitors: Vec<Competitor>,
    pub trends: Vec<Trend>,
    pub competitive_environment: CompetitiveEnvironment,
    /// Revenue multiple for the valuation heuristic
    pub valuation_multiple: f64,
}

impl IndustryBenchmark {
    /// Generic fallback with neutral ranges and no market data
    pub fn generic() -> Self {
        Self {
            key: OTHER_KEY.to_string(),
            name: "Other".to_string(),
            label: "その他".to_string(),
            drivers: DriverRanges::neutral(),
            kpis: Vec::new(),
            competitors: Vec::new(),
            trends: Vec::new(),
            competitive_environment: CompetitiveEnvironment::default(),
            valuation_multiple: 1.5,
        }
    }

    pub fn range(&self, driver: Driver) -> &BenchmarkRange {
        self.drivers.get(driver)
    }

    /// Classify a driver value against this industry's range
    pub fn classify(&self, driver: Driver, value: f64) -> Deviation {
        self.range(driver).classify(value)
    }
}

static GENERIC: Lazy<IndustryBenchmark> = Lazy::new(IndustryBenchmark::generic);

/// The full benchmark dataset
#[derive(Debug, Clone)]
pub struct BenchmarkCatalog {
    industries: Vec<IndustryBenchmark>,
    source: Option<PathBuf>,
}

impl BenchmarkCatalog {
    /// Load the dataset: override file in the data dir if present, else embedded
    pub fn load() -> Result<Self> {
        if let Some(path) = default_override_path() {
            if path.exists() {
                return Self::from_path(&path);
            }
        }
        Self::builtin()
    }

    /// The embedded dataset
    pub fn builtin() -> Result<Self> {
        tracing::debug!("Using embedded benchmark dataset");
        Self::parse(DEFAULT_BENCHMARKS)
    }

    /// Load the dataset from an explicit file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Benchmark file {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        let mut catalog = Self::parse(&content)?;
        tracing::info!(path = %path.display(), "Loaded benchmark override");
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Parse a dataset from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawDataset = toml::from_str(content)?;

        let mut industries = Vec::with_capacity(raw.industries.len() + 1);
        for (key, industry) in raw.industries {
            industries.push(industry.into_benchmark(key.to_lowercase())?);
        }

        if !industries.iter().any(|i| i.key == OTHER_KEY) {
            industries.push(IndustryBenchmark::generic());
        }

        Ok(Self {
            industries,
            source: None,
        })
    }

    /// Path the dataset was loaded from (None for embedded)
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn industries(&self) -> &[IndustryBenchmark] {
        &self.industries
    }

    /// Case-insensitive lookup by key or canonical name
    pub fn get(&self, industry: &str) -> Option<&IndustryBenchmark> {
        let needle = industry.trim().to_lowercase();
        self.industries
            .iter()
            .find(|i| i.key == needle || i.name.to_lowercase() == needle)
    }

    /// Strict lookup that reports unknown industries
    pub fn require(&self, industry: &str) -> Result<&IndustryBenchmark> {
        self.get(industry)
            .ok_or_else(|| Error::UnknownIndustry(industry.to_string()))
    }

    /// The generic fallback entry
    pub fn other(&self) -> &IndustryBenchmark {
        self.get(OTHER_KEY).unwrap_or(&*GENERIC)
    }

    /// Lookup that falls back to `Other` for missing or unknown industries
    pub fn resolve(&self, industry: Option<&str>) -> &IndustryBenchmark {
        match industry.and_then(|key| self.get(key)) {
            Some(found) => found,
            None => {
                if let Some(key) = industry {
                    tracing::debug!(industry = key, "Unknown industry, using Other benchmark");
                }
                self.other()
            }
        }
    }
}

/// Get the default override path
pub fn default_override_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kessan").join("config").join("benchmarks.toml"))
}

/// Raw dataset structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    industries: BTreeMap<String, RawIndustry>,
}

#[derive(Debug, Deserialize)]
struct RawIndustry {
    name: Option<String>,
    label: Option<String>,
    valuation_multiple: Option<f64>,
    #[serde(default)]
    drivers: RawDrivers,
    #[serde(default)]
    kpis: Vec<BenchmarkKpi>,
    #[serde(default)]
    competitors: Vec<Competitor>,
    #[serde(default)]
    trends: Vec<Trend>,
    #[serde(default)]
    competitive_environment: CompetitiveEnvironment,
}

#[derive(Debug, Default, Deserialize)]
struct RawDrivers {
    revenue_fy1: Option<BenchmarkRange>,
    growth_rate: Option<BenchmarkRange>,
    cogs_rate: Option<BenchmarkRange>,
    opex_base: Option<BenchmarkRange>,
    opex_growth: Option<BenchmarkRange>,
}

impl RawIndustry {
    fn into_benchmark(self, key: String) -> Result<IndustryBenchmark> {
        let neutral = DriverRanges::neutral();
        let drivers = DriverRanges {
            revenue_fy1: self.drivers.revenue_fy1.unwrap_or(neutral.revenue_fy1),
            growth_rate: self.drivers.growth_rate.unwrap_or(neutral.growth_rate),
            cogs_rate: self.drivers.cogs_rate.unwrap_or(neutral.cogs_rate),
            opex_base: self.drivers.opex_base.unwrap_or(neutral.opex_base),
            opex_growth: self.drivers.opex_growth.unwrap_or(neutral.opex_growth),
        };

        for driver in Driver::all() {
            let range = drivers.get(*driver);
            if !(range.low <= range.mid && range.mid <= range.high) {
                return Err(Error::InvalidData(format!(
                    "Industry '{}' has an unordered {} range ({} / {} / {})",
                    key,
                    driver.as_str(),
                    range.low,
                    range.mid,
                    range.high
                )));
            }
        }

        Ok(IndustryBenchmark {
            name: self.name.unwrap_or_else(|| key.clone()),
            label: self.label.unwrap_or_else(|| key.clone()),
            valuation_multiple: self.valuation_multiple.unwrap_or(1.5),
            drivers,
            kpis: self.kpis,
            competitors: self.competitors,
            trends: self.trends,
            competitive_environment: self.competitive_environment,
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_boundaries() {
        let (low, high) = (0.2, 1.0);
        assert_eq!(classify(low, low, high), Deviation::Normal);
        assert_eq!(classify(high, low, high), Deviation::Normal);
        assert_eq!(classify(low * 0.79, low, high), Deviation::Below);
        assert_eq!(classify(low * 0.8, low, high), Deviation::Normal);
        assert_eq!(classify(high * 1.21, low, high), Deviation::Aggressive);
        assert_eq!(classify(high * 1.1, low, high), Deviation::Above);
        assert_eq!(classify(high * 1.2, low, high), Deviation::Above);
    }

    #[test]
    fn test_parse_default_dataset() {
        let catalog = BenchmarkCatalog::builtin().unwrap();
        assert!(catalog.industries().len() >= 6);
        assert!(catalog.source().is_none());

        let saas = catalog.get("SaaS").unwrap();
        assert_eq!(saas.key, "saas");
        assert_eq!(saas.range(Driver::GrowthRate).low, 0.2);
        assert_eq!(saas.range(Driver::GrowthRate).high, 1.0);
        assert_eq!(saas.classify(Driver::GrowthRate, 0.3), Deviation::Normal);
        assert!(saas.trends.len() >= 3);
        assert!(!saas.competitors.is_empty());
        assert!(saas.valuation_multiple > 1.0);
    }

    #[test]
    fn test_unknown_industry_resolves_to_other() {
        let catalog = BenchmarkCatalog::builtin().unwrap();
        assert_eq!(catalog.resolve(Some("space mining")).key, OTHER_KEY);
        assert_eq!(catalog.resolve(None).key, OTHER_KEY);
        assert_eq!(catalog.resolve(Some(" saas ")).name, "SaaS");
        assert!(matches!(
            catalog.require("space mining"),
            Err(Error::UnknownIndustry(_))
        ));
    }

    #[test]
    fn test_parse_fills_missing_other_and_drivers() {
        let content = r#"
[industries.biotech]
name = "Biotech"

[industries.biotech.drivers]
growth_rate = { low = 0.1, mid = 0.3, high = 0.8, label = "売上成長率" }
"#;
        let catalog = BenchmarkCatalog::parse(content).unwrap();
        let biotech = catalog.get("biotech").unwrap();
        assert_eq!(biotech.range(Driver::GrowthRate).high, 0.8);
        assert_eq!(biotech.range(Driver::CogsRate), &DriverRanges::neutral().cogs_rate);
        assert_eq!(catalog.other(), &IndustryBenchmark::generic());
    }

    #[test]
    fn test_parse_rejects_unordered_range() {
        let content = r#"
[industries.bad.drivers]
cogs_rate = { low = 0.5, mid = 0.4, high = 0.6, label = "売上原価率" }
"#;
        assert!(matches!(
            BenchmarkCatalog::parse(content),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            BenchmarkCatalog::parse("industries = 3"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[industries.custom]\nname = \"Custom\"").unwrap();

        let catalog = BenchmarkCatalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.source(), Some(file.path()));
        assert!(catalog.get("custom").is_some());

        let missing = BenchmarkCatalog::from_path(Path::new("/nonexistent/benchmarks.toml"));
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_driver_from_str() {
        assert_eq!("cogs_rate".parse::<Driver>().unwrap(), Driver::CogsRate);
        assert!("margin".parse::<Driver>().is_err());
        assert!(Driver::GrowthRate.is_rate());
        assert!(!Driver::OpexBase.is_rate());
    }
}
