use crate::chart::{assemble, limit_for_chart, ChartData};
use crate::criteria::FilterCriteria;
use crate::enrichment::{annotate, assess_prices, own_average_price, AnnotatedProgram, PriceIndex};
use crate::errors::DataError;
use crate::models::{Buffer, Config, Metric, PreferenceRecord, ProgramRecord, SortBy, Year};
use crate::parser::normalize_program_key;
use crate::preferences::FrequencyData;
use crate::ranking::rank;
use crate::similarity::{find_similar, normalized_range, MatchedProgram};
use crate::window::{resolve_window, ComparisonWindow, WindowOverrides};
use std::collections::BTreeMap;

/// Everything one comparison pass depends on.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub reference_key: String,
    pub year: Year,
    pub metric: Metric,
    pub overrides: WindowOverrides,
    pub buffer: Option<Buffer>,
    pub sort_by: SortBy,
    pub filters: FilterCriteria,
    pub record_limit: usize,
    pub own_university_name: String,
}

impl ComparisonRequest {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reference_key: config.reference_program_key.clone(),
            year: config.year,
            metric: config.metric,
            overrides: WindowOverrides {
                min: config.custom_range_min,
                max: config.custom_range_max,
            },
            buffer: config.buffer,
            sort_by: config.sort_by,
            filters: config.filters.clone(),
            record_limit: config.record_limit,
            own_university_name: config.own_university_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome<'a> {
    pub reference: &'a ProgramRecord,
    pub window: Option<ComparisonWindow>,
    /// Full ranked list for tables; never capped.
    pub ranked: Vec<AnnotatedProgram<'a>>,
    /// Chart series for the first `record_limit` ranked programs.
    pub chart: ChartData,
    pub total_before_limit: usize,
    pub scholarship_counts: BTreeMap<String, usize>,
    pub frequencies: FrequencyData,
    pub own_average_price: Option<f64>,
    /// Matches whose floor and ceiling had to be swapped.
    pub corrected_keys: Vec<String>,
}

pub struct ComparisonAnalyzer<'a> {
    corpus: &'a [ProgramRecord],
    prices: &'a PriceIndex,
    preferences: &'a [PreferenceRecord],
}

impl<'a> ComparisonAnalyzer<'a> {
    pub fn new(
        corpus: &'a [ProgramRecord],
        prices: &'a PriceIndex,
        preferences: &'a [PreferenceRecord],
    ) -> Self {
        Self {
            corpus,
            prices,
            preferences,
        }
    }

    pub fn find_reference(&self, key: &str) -> Option<&'a ProgramRecord> {
        let key = normalize_program_key(key);
        self.corpus
            .iter()
            .find(|record| normalize_program_key(&record.program_key) == key)
    }

    /// Runs one full comparison pass for `request`.
    pub fn analyze(&self, request: &ComparisonRequest) -> Result<AnalysisOutcome<'a>, DataError> {
        let reference = self
            .find_reference(&request.reference_key)
            .ok_or_else(|| DataError::ReferenceNotFound(request.reference_key.clone()))?;
        let reference_key = reference.program_key.as_str();

        // Step 1: Resolve the comparison window around the reference
        let window = resolve_window(
            reference,
            request.year,
            request.metric,
            request.overrides,
            request.buffer,
        );
        let frequencies = FrequencyData::build(self.preferences, reference_key, request.year);

        let Some(window) = window else {
            tracing::info!(
                reference = reference_key,
                year = request.year,
                "reference has no admission range for this year"
            );
            return Ok(AnalysisOutcome {
                reference,
                window: None,
                ranked: Vec::new(),
                chart: ChartData::default(),
                total_before_limit: 0,
                scholarship_counts: BTreeMap::new(),
                frequencies,
                own_average_price: None,
                corrected_keys: Vec::new(),
            });
        };

        // Step 2: Scan the corpus for programs inside the window
        let mut matches = find_similar(
            self.corpus,
            Some(&window),
            request.year,
            reference.score_track,
        );
        tracing::debug!(matches = matches.len(), ?window, "similarity scan finished");

        // Step 3: Keep the reference on the chart even when the window excludes it
        if !matches.iter().any(|m| m.record.program_key == reference_key) {
            if let Some((min, max, range_corrected)) =
                normalized_range(reference, request.metric, request.year)
            {
                matches.insert(
                    0,
                    MatchedProgram {
                        record: reference,
                        min,
                        max,
                        range_corrected,
                    },
                );
            }
        }

        let corrected_keys: Vec<String> = matches
            .iter()
            .filter(|m| m.range_corrected)
            .map(|m| m.record.program_key.clone())
            .collect();
        if !corrected_keys.is_empty() {
            tracing::warn!(
                count = corrected_keys.len(),
                "matched programs had floor above ceiling and were swapped"
            );
        }

        // Step 4: Join fulfillment and price, then apply category filters
        let annotated = annotate(&matches, request.year, self.prices);
        let filtered = request
            .filters
            .apply(annotated, reference_key, &frequencies);

        let mut scholarship_counts = BTreeMap::new();
        for program in &filtered {
            *scholarship_counts
                .entry(program.record.scholarship.clone())
                .or_insert(0) += 1;
        }

        // Step 5: Rank with the reference pinned, then price against own programs
        let ranked = rank(filtered, reference_key, request.sort_by, request.metric);
        let ranked = assess_prices(ranked, &request.own_university_name);
        let own_average_price = own_average_price(&ranked, &request.own_university_name);

        // Step 6: Chart data for the capped leading slice
        let chart = assemble(
            limit_for_chart(&ranked, request.record_limit),
            &request.own_university_name,
        );

        Ok(AnalysisOutcome {
            reference,
            window: Some(window),
            total_before_limit: ranked.len(),
            ranked,
            chart,
            scholarship_counts,
            frequencies,
            own_average_price,
            corrected_keys,
        })
    }
}
