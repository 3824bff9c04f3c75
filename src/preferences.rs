//! Frequency distributions of what students placed in a program also preferred.

use crate::models::{PreferenceDimension, PreferenceRecord, Year};
use crate::parser::normalize_program_key;
use serde::Serialize;
use std::collections::HashMap;

/// `(name, count)` pairs for one dimension, most frequent first, ties by name.
pub fn frequency_distribution(
    preferences: &[PreferenceRecord],
    reference_key: &str,
    year: Year,
    dimension: PreferenceDimension,
) -> Vec<(String, u32)> {
    let reference_key = normalize_program_key(reference_key);
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for pref in preferences.iter().filter(|p| {
        p.year == year
            && p.dimension == dimension
            && normalize_program_key(&p.program_key) == reference_key
    }) {
        let count = counts.entry(pref.name.as_str()).or_insert(0);
        *count = count.saturating_add(pref.preference_count);
    }

    let mut distribution: Vec<(String, u32)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyData {
    pub cities: Vec<(String, u32)>,
    pub universities: Vec<(String, u32)>,
    pub programs: Vec<(String, u32)>,
}

impl FrequencyData {
    pub fn build(preferences: &[PreferenceRecord], reference_key: &str, year: Year) -> Self {
        let distribution =
            |dimension| frequency_distribution(preferences, reference_key, year, dimension);
        Self {
            cities: distribution(PreferenceDimension::City),
            universities: distribution(PreferenceDimension::University),
            programs: distribution(PreferenceDimension::ProgramType),
        }
    }

    pub fn distribution(&self, dimension: PreferenceDimension) -> &[(String, u32)] {
        match dimension {
            PreferenceDimension::City => &self.cities,
            PreferenceDimension::University => &self.universities,
            PreferenceDimension::ProgramType => &self.programs,
        }
    }

    /// Preference count for `name`, 0 when it never appears.
    pub fn count(&self, dimension: PreferenceDimension, name: &str) -> u32 {
        self.distribution(dimension)
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.universities.is_empty() && self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pref(key: &str, year: Year, dimension: PreferenceDimension, name: &str, count: u32) -> PreferenceRecord {
        PreferenceRecord {
            program_key: key.to_string(),
            year,
            dimension,
            name: name.to_string(),
            preference_count: count,
        }
    }

    #[test]
    fn test_distribution_sums_and_sorts() {
        let prefs = vec![
            pref("100", 2024, PreferenceDimension::City, "İZMİR", 12),
            pref("100", 2024, PreferenceDimension::City, "İSTANBUL", 40),
            pref("100.0", 2024, PreferenceDimension::City, "İZMİR", 28),
            pref("100", 2024, PreferenceDimension::City, "ANKARA", 40),
            pref("100", 2023, PreferenceDimension::City, "BURSA", 99),
            pref("200", 2024, PreferenceDimension::City, "BURSA", 99),
            pref("100", 2024, PreferenceDimension::University, "KOÇ ÜNİVERSİTESİ", 7),
        ];
        let cities = frequency_distribution(&prefs, "100", 2024, PreferenceDimension::City);
        assert_eq!(
            cities,
            vec![
                ("ANKARA".to_string(), 40),
                ("İSTANBUL".to_string(), 40),
                ("İZMİR".to_string(), 40),
            ]
        );

        let data = FrequencyData::build(&prefs, "100", 2024);
        assert_eq!(data.count(PreferenceDimension::University, "KOÇ ÜNİVERSİTESİ"), 7);
        assert_eq!(data.count(PreferenceDimension::ProgramType, "Hukuk"), 0);
        assert!(data.programs.is_empty());
        assert!(!data.is_empty());
    }

    #[test]
    fn test_large_counts_saturate() {
        let prefs = vec![
            pref("100", 2024, PreferenceDimension::City, "İSTANBUL", u32::MAX - 5),
            pref("100", 2024, PreferenceDimension::City, "İSTANBUL", 10),
        ];
        let cities = frequency_distribution(&prefs, "100", 2024, PreferenceDimension::City);
        assert_eq!(cities, vec![("İSTANBUL".to_string(), u32::MAX)]);
    }
}
