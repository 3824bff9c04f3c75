use crate::criteria::FilterCriteria;
use crate::errors::DataError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Admission year, e.g. `2024`.
pub type Year = u16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub own_university_name: String,
    pub reference_program_key: String,
    pub year: Year,
    pub metric: Metric,
    pub sort_by: SortBy,
    pub custom_range_min: Option<f64>,
    pub custom_range_max: Option<f64>,
    pub record_limit: usize,
    pub supported_years: Vec<Year>,
    pub price_years: Vec<Year>,
    // Data source configuration
    pub data_source_mode: DataSourceMode,
    pub data_directory: Option<String>,
    pub internet_base_url: Option<String>,
    pub programs_file: String,
    pub prices_file: String,
    pub preferences_file: Option<String>,
    pub output_directory: Option<String>,
    pub cache_ttl_secs: u64,
    // Tables go last so the TOML output stays readable
    pub buffer: Option<Buffer>,
    pub filters: FilterCriteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceMode {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "internet")]
    Internet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            own_university_name: "HALİÇ ÜNİVERSİTESİ".to_string(),
            reference_program_key: "".to_string(),
            year: 2024,
            metric: Metric::Rank,
            sort_by: SortBy::Spread,
            custom_range_min: None,
            custom_range_max: None,
            record_limit: 10,
            supported_years: vec![2022, 2023, 2024],
            price_years: vec![2024, 2025],
            data_source_mode: DataSourceMode::Local,
            data_directory: Some("data".to_string()),
            internet_base_url: Some("https://example.com/assets/data".to_string()),
            programs_file: "all_universities_combined.csv".to_string(),
            prices_file: "all_programs_prices_processed.csv".to_string(),
            preferences_file: Some("preference_stats.csv".to_string()),
            output_directory: Some("output".to_string()),
            cache_ttl_secs: 600,
            buffer: None,
            filters: FilterCriteria {
                university_type: Some(UniversityType::Foundation),
                ..FilterCriteria::default()
            },
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = file_path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = file_path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UniversityType {
    #[serde(rename = "Devlet")]
    State,
    #[serde(rename = "Vakıf")]
    Foundation,
    #[serde(rename = "KKTC")]
    Trnc,
}

impl UniversityType {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "Devlet" | "DEVLET" => Some(Self::State),
            "Vakıf" | "VAKIF" | "Vakif" => Some(Self::Foundation),
            "KKTC" | "Kktc" => Some(Self::Trnc),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::State => "Devlet",
            Self::Foundation => "Vakıf",
            Self::Trnc => "KKTC",
        }
    }
}

/// Exam score type a program admits on (`puan_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreTrack {
    Quantitative,
    EqualWeight,
    Verbal,
    Language,
    Vocational,
}

impl ScoreTrack {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().as_str() {
            "SAY" => Some(Self::Quantitative),
            "EA" => Some(Self::EqualWeight),
            "SÖZ" | "SOZ" => Some(Self::Verbal),
            "DİL" | "DIL" => Some(Self::Language),
            "TYT" => Some(Self::Vocational),
            _ => None,
        }
    }
}

/// Which admission measure a comparison runs on.
///
/// Ranks improve downwards (1 is the best student in the country), scores
/// improve upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Rank,
    Score,
}

impl Metric {
    /// The numeric bound that holds the best admitted student.
    pub fn best_bound(self) -> Bound {
        match self {
            Metric::Rank => Bound::Lower,
            Metric::Score => Bound::Upper,
        }
    }

    pub fn worst_bound(self) -> Bound {
        self.best_bound().opposite()
    }
}

/// Numeric side of an admission range: `Lower` is the smaller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Lower,
    Upper,
}

impl Bound {
    pub fn opposite(self) -> Self {
        match self {
            Bound::Lower => Bound::Upper,
            Bound::Upper => Bound::Lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Spread,
    Price,
    Fulfillment,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferDirection {
    TowardBetter,
    TowardWorse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buffer {
    pub direction: BufferDirection,
    pub step: f64,
}

/// Admission figures of one program for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub capacity: Option<u32>,
    pub placed: Option<u32>,
    /// `taban`: lowest admitted score.
    pub score_floor: Option<f64>,
    /// `tavan`: highest admitted score.
    pub score_ceiling: Option<f64>,
    /// `tbs`: rank of the weakest admitted student (numerically highest).
    pub rank_floor: Option<f64>,
    /// `tavan_bs`: rank of the strongest admitted student (numerically lowest).
    pub rank_ceiling: Option<f64>,
    pub available: bool,
}

impl YearStats {
    /// Column lookup for a metric and numeric bound.
    ///
    /// For ranks the "ceiling" column is the numerically lower one, so the
    /// column names flip relative to scores.
    pub fn bound(&self, metric: Metric, bound: Bound) -> Option<f64> {
        match (metric, bound) {
            (Metric::Rank, Bound::Lower) => self.rank_ceiling,
            (Metric::Rank, Bound::Upper) => self.rank_floor,
            (Metric::Score, Bound::Lower) => self.score_floor,
            (Metric::Score, Bound::Upper) => self.score_ceiling,
        }
    }
}

/// One program variant (program + scholarship) with its yearly admission history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub program_key: String,
    pub university: String,
    pub university_type: Option<UniversityType>,
    pub score_track: Option<ScoreTrack>,
    pub scholarship: String,
    pub faculty: String,
    pub program: String,
    pub program_detail: String,
    pub city: Option<String>,
    pub years: BTreeMap<Year, YearStats>,
    pub years_with_data: u32,
}

impl ProgramRecord {
    pub fn year(&self, year: Year) -> Option<&YearStats> {
        self.years.get(&year)
    }

    pub fn is_available(&self, year: Year) -> bool {
        self.year(year).map(|stats| stats.available).unwrap_or(false)
    }

    pub fn bound(&self, metric: Metric, bound: Bound, year: Year) -> Option<f64> {
        self.year(year).and_then(|stats| stats.bound(metric, bound))
    }

    pub fn capacity(&self, year: Year) -> Option<u32> {
        self.year(year).and_then(|stats| stats.capacity)
    }

    pub fn placed(&self, year: Year) -> Option<u32> {
        self.year(year).and_then(|stats| stats.placed)
    }

    /// Years this record is flagged as having data for, ascending.
    pub fn available_years(&self) -> Vec<Year> {
        self.years
            .iter()
            .filter(|(_, stats)| stats.available)
            .map(|(year, _)| *year)
            .collect()
    }

    /// Program name with its detail and scholarship, as shown in listings.
    pub fn display_name(&self) -> String {
        let mut name = self.program.clone();
        if !self.program_detail.is_empty() && self.program_detail != self.program {
            name.push(' ');
            name.push_str(&self.program_detail);
        }
        if !self.scholarship.is_empty() {
            name.push_str(&format!(" ({})", self.scholarship));
        }
        name
    }
}

/// Tuition discount bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScholarshipTier {
    None,
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl ScholarshipTier {
    pub fn percent(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Quarter => 25,
            Self::Half => 50,
            Self::ThreeQuarters => 75,
            Self::Full => 100,
        }
    }

    pub fn from_percent(percent: f64) -> Option<Self> {
        match percent.round() as i64 {
            0 => Some(Self::None),
            25 => Some(Self::Quarter),
            50 => Some(Self::Half),
            75 => Some(Self::ThreeQuarters),
            100 => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Program key with numeric artifacts removed.
    pub program_key: String,
    pub tier: ScholarshipTier,
    pub price_by_year: BTreeMap<Year, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceDimension {
    City,
    University,
    #[serde(rename = "program")]
    ProgramType,
}

impl PreferenceDimension {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "city" | "il" => Some(Self::City),
            "university" | "universite" | "üniversite" => Some(Self::University),
            "program" | "program_type" => Some(Self::ProgramType),
            _ => None,
        }
    }
}

/// How often the students placed in a program also listed a city, rival
/// university or rival program type among their preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub program_key: String,
    pub year: Year,
    pub dimension: PreferenceDimension,
    pub name: String,
    pub preference_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats() -> YearStats {
        YearStats {
            score_floor: Some(300.0),
            score_ceiling: Some(340.0),
            rank_floor: Some(90_000.0),
            rank_ceiling: Some(60_000.0),
            available: true,
            ..YearStats::default()
        }
    }

    #[test]
    fn test_rank_columns_are_inverted() {
        let stats = stats();
        assert_eq!(stats.bound(Metric::Rank, Bound::Lower), Some(60_000.0));
        assert_eq!(stats.bound(Metric::Rank, Bound::Upper), Some(90_000.0));
        assert_eq!(stats.bound(Metric::Score, Bound::Lower), Some(300.0));
        assert_eq!(stats.bound(Metric::Score, Bound::Upper), Some(340.0));
    }

    #[test]
    fn test_best_bound_follows_polarity() {
        assert_eq!(Metric::Rank.best_bound(), Bound::Lower);
        assert_eq!(Metric::Rank.worst_bound(), Bound::Upper);
        assert_eq!(Metric::Score.best_bound(), Bound::Upper);
        assert_eq!(Metric::Score.worst_bound(), Bound::Lower);
    }

    #[test]
    fn test_display_name_skips_repeated_detail() {
        let record = ProgramRecord {
            program: "Hukuk".to_string(),
            program_detail: "Hukuk".to_string(),
            scholarship: "Burslu".to_string(),
            ..ProgramRecord::default()
        };
        assert_eq!(record.display_name(), "Hukuk (Burslu)");

        let record = ProgramRecord {
            program: "Psikoloji".to_string(),
            program_detail: "İngilizce".to_string(),
            ..ProgramRecord::default()
        };
        assert_eq!(record.display_name(), "Psikoloji İngilizce");
    }

    #[test]
    fn test_available_years_sorted() {
        let mut record = ProgramRecord::default();
        record.years.insert(2024, stats());
        record.years.insert(2022, stats());
        record.years.insert(
            2023,
            YearStats {
                available: false,
                ..stats()
            },
        );
        assert_eq!(record.available_years(), vec![2022, 2024]);
        assert!(!record.is_available(2023));
        assert!(!record.is_available(2030));
    }

    #[test]
    fn test_track_and_type_parsing() {
        assert_eq!(ScoreTrack::parse("say"), Some(ScoreTrack::Quantitative));
        assert_eq!(ScoreTrack::parse("SÖZ"), Some(ScoreTrack::Verbal));
        assert_eq!(ScoreTrack::parse("dil"), Some(ScoreTrack::Language));
        assert_eq!(ScoreTrack::parse("?"), None);
        assert_eq!(UniversityType::parse(" Vakıf "), Some(UniversityType::Foundation));
        assert_eq!(UniversityType::parse("Özel"), None);
    }

    #[test]
    fn test_metric_cli_values() {
        assert_eq!(Metric::from_str("rank", true), Ok(Metric::Rank));
        assert_eq!(Metric::from_str("SCORE", true), Ok(Metric::Score));
        assert!(Metric::from_str("percentile", true).is_err());
    }

    #[test]
    fn test_scholarship_tier_from_percent() {
        assert_eq!(ScholarshipTier::from_percent(50.0), Some(ScholarshipTier::Half));
        assert_eq!(ScholarshipTier::from_percent(100.0), Some(ScholarshipTier::Full));
        assert_eq!(ScholarshipTier::from_percent(33.0), None);
    }

    #[test]
    fn test_default_config_survives_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            buffer: Some(Buffer {
                direction: BufferDirection::TowardWorse,
                step: 5000.0,
            }),
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.year, 2024);
        assert_eq!(loaded.metric, Metric::Rank);
        assert_eq!(loaded.buffer, config.buffer);
        assert_eq!(
            loaded.filters.university_type,
            Some(UniversityType::Foundation)
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            reference_program_key = "203910247"
            metric = "score"
            sort_by = "price"
            "#,
        )
        .unwrap();
        assert_eq!(config.reference_program_key, "203910247");
        assert_eq!(config.metric, Metric::Score);
        assert_eq!(config.sort_by, SortBy::Price);
        assert_eq!(config.record_limit, 10);
    }
}
