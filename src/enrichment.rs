//! Fulfillment rates, tuition prices and price assessment for matched programs.

use crate::models::{PriceRecord, ProgramRecord, ScholarshipTier, Year};
use crate::parser::normalize_program_key;
use crate::similarity::MatchedProgram;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Rate reported when a program has no usable capacity.
pub const DEFAULT_FULFILLMENT_RATE: f64 = 100.0;

/// Placed students as a percentage of capacity.
pub fn fulfillment_rate(capacity: Option<u32>, placed: Option<u32>) -> f64 {
    match capacity {
        Some(capacity) if capacity > 0 => placed.unwrap_or(0) as f64 / capacity as f64 * 100.0,
        _ => DEFAULT_FULFILLMENT_RATE,
    }
}

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(100|75|50|25)\b").expect("static pattern"))
}

/// Scholarship tier from a free-text label such as `"%50 İndirimli"` or `"Burslu"`.
pub fn scholarship_tier(label: &str) -> ScholarshipTier {
    let lowered = label.to_lowercase();
    let percents: BTreeSet<&str> = percent_pattern()
        .captures_iter(&lowered)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if percents.contains("100") || lowered.contains("tam burslu") {
        ScholarshipTier::Full
    } else if percents.contains("75") {
        ScholarshipTier::ThreeQuarters
    } else if percents.contains("50")
        || lowered.contains("yarım burslu")
        || lowered.contains("yarim burslu")
    {
        ScholarshipTier::Half
    } else if percents.contains("25") {
        ScholarshipTier::Quarter
    } else if lowered.contains("burslu") {
        ScholarshipTier::Full
    } else {
        ScholarshipTier::None
    }
}

/// Tuition prices keyed by normalized program key and scholarship tier.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    prices: HashMap<String, PriceRecord>,
    price_years: BTreeSet<Year>,
}

impl PriceIndex {
    pub fn new(
        records: impl IntoIterator<Item = PriceRecord>,
        price_years: impl IntoIterator<Item = Year>,
    ) -> Self {
        let prices = records
            .into_iter()
            .map(|record| (Self::price_key(&record.program_key, record.tier), record))
            .collect();
        Self {
            prices,
            price_years: price_years.into_iter().collect(),
        }
    }

    pub fn price_key(program_key: &str, tier: ScholarshipTier) -> String {
        format!("{}_{}", normalize_program_key(program_key), tier.percent())
    }

    pub fn is_price_year(&self, year: Year) -> bool {
        self.price_years.contains(&year)
    }

    /// Price of a program variant in `year`, 0 when unknown or not a price year.
    pub fn lookup(&self, record: &ProgramRecord, year: Year) -> f64 {
        if !self.is_price_year(year) {
            return 0.0;
        }
        let key = Self::price_key(&record.program_key, scholarship_tier(&record.scholarship));
        self.prices
            .get(&key)
            .and_then(|price| price.price_by_year.get(&year))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceVerdict {
    /// Price is in line with how well the program fills.
    Acceptable,
    /// Too expensive for its fulfillment, or the brand does not carry the price.
    Overpriced,
}

/// A matched program with the derived figures used for ranking and display.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedProgram<'a> {
    pub record: &'a ProgramRecord,
    pub min: f64,
    pub max: f64,
    pub range_corrected: bool,
    /// `max` was stretched so a zero-width range stays visible.
    pub range_padded: bool,
    pub capacity: Option<u32>,
    pub placed: Option<u32>,
    pub fulfillment_rate: f64,
    pub price: f64,
    pub price_index: Option<f64>,
    pub evaluation_score: Option<f64>,
    pub price_verdict: Option<PriceVerdict>,
}

impl AnnotatedProgram<'_> {
    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    pub fn key(&self) -> &str {
        &self.record.program_key
    }
}

pub fn annotate<'a>(
    matches: &[MatchedProgram<'a>],
    year: Year,
    prices: &PriceIndex,
) -> Vec<AnnotatedProgram<'a>> {
    matches
        .iter()
        .map(|matched| {
            let record = matched.record;
            let capacity = record.capacity(year);
            let placed = record.placed(year);
            AnnotatedProgram {
                record,
                min: matched.min,
                max: matched.max,
                range_corrected: matched.range_corrected,
                range_padded: false,
                capacity,
                placed,
                fulfillment_rate: fulfillment_rate(capacity, placed),
                price: prices.lookup(record, year),
                price_index: None,
                evaluation_score: None,
                price_verdict: None,
            }
        })
        .collect()
}

/// Mean non-zero price of the own university's programs.
pub fn own_average_price(programs: &[AnnotatedProgram<'_>], own_university: &str) -> Option<f64> {
    let prices: Vec<f64> = programs
        .iter()
        .filter(|p| p.record.university == own_university && p.price > 0.0)
        .map(|p| p.price)
        .collect();
    if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    }
}

/// Prices every program relative to the own university's average price.
pub fn assess_prices<'a>(
    programs: Vec<AnnotatedProgram<'a>>,
    own_university: &str,
) -> Vec<AnnotatedProgram<'a>> {
    let own_average = own_average_price(&programs, own_university);
    programs
        .into_iter()
        .map(|mut program| {
            let price_index = if program.record.university == own_university {
                Some(1.0)
            } else {
                match own_average {
                    Some(average) if program.price > 0.0 && average > 0.0 => {
                        Some(program.price / average)
                    }
                    _ => None,
                }
            };
            program.price_index = price_index;
            program.evaluation_score =
                price_index.map(|index| index * program.fulfillment_rate / 100.0);
            program.price_verdict = program.evaluation_score.map(|score| {
                if score <= 1.0 {
                    PriceVerdict::Acceptable
                } else {
                    PriceVerdict::Overpriced
                }
            });
            program
        })
        .collect()
}
