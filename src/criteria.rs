//! Category filters applied to annotated matches before ranking.

use crate::enrichment::AnnotatedProgram;
use crate::models::{PreferenceDimension, UniversityType};
use crate::preferences::FrequencyData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller-selected filters. Zero thresholds and empty sets filter nothing.
///
/// Each threshold keeps programs whose count is at least the threshold, or at
/// most the threshold when its `*_reversed` flag is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub university_type: Option<UniversityType>,
    pub min_city_preferences: u32,
    pub city_preferences_reversed: bool,
    pub min_university_preferences: u32,
    pub university_preferences_reversed: bool,
    pub min_program_preferences: u32,
    pub program_preferences_reversed: bool,
    pub min_fulfillment_rate: f64,
    pub fulfillment_reversed: bool,
    pub excluded_cities: BTreeSet<String>,
    pub excluded_universities: BTreeSet<String>,
    pub excluded_programs: BTreeSet<String>,
    pub excluded_scholarships: BTreeSet<String>,
}

fn passes(value: f64, threshold: f64, reversed: bool) -> bool {
    if threshold <= 0.0 {
        return true;
    }
    if reversed {
        value <= threshold
    } else {
        value >= threshold
    }
}

impl FilterCriteria {
    pub fn admits(&self, program: &AnnotatedProgram<'_>, frequencies: &FrequencyData) -> bool {
        let record = program.record;

        if let Some(kind) = self.university_type {
            if record.university_type != Some(kind) {
                return false;
            }
        }

        let city = record.city.as_deref().unwrap_or("");
        if self.excluded_cities.contains(city)
            || self.excluded_universities.contains(&record.university)
            || self.excluded_programs.contains(&record.program)
            || self.excluded_scholarships.contains(&record.scholarship)
        {
            return false;
        }

        let preference = |dimension, name: &str| frequencies.count(dimension, name) as f64;
        passes(
            preference(PreferenceDimension::City, city),
            self.min_city_preferences as f64,
            self.city_preferences_reversed,
        ) && passes(
            preference(PreferenceDimension::University, &record.university),
            self.min_university_preferences as f64,
            self.university_preferences_reversed,
        ) && passes(
            preference(PreferenceDimension::ProgramType, &record.program),
            self.min_program_preferences as f64,
            self.program_preferences_reversed,
        ) && passes(
            program.fulfillment_rate,
            self.min_fulfillment_rate,
            self.fulfillment_reversed,
        )
    }

    /// Keeps admitted programs in order. The reference program always stays.
    pub fn apply<'a>(
        &self,
        programs: Vec<AnnotatedProgram<'a>>,
        reference_key: &str,
        frequencies: &FrequencyData,
    ) -> Vec<AnnotatedProgram<'a>> {
        programs
            .into_iter()
            .filter(|p| p.key() == reference_key || self.admits(p, frequencies))
            .collect()
    }
}
