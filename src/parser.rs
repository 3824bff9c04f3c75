//! Turkish-locale numeric parsing and row conversion.
//!
//! Scores use a decimal comma (`"358,17297"`), rankings use dots as
//! thousands separators (`"1.383.482"`). Blank cells, `Dolmadı` ("not
//! filled") and a bare `0` all mean "no value".

use crate::models::{
    PreferenceDimension, PreferenceRecord, PriceRecord, ProgramRecord, ScholarshipTier,
    ScoreTrack, UniversityType, Year, YearStats,
};
use std::collections::{BTreeMap, HashMap};

/// A CSV row keyed by header name, before any parsing.
pub type RawRow = HashMap<String, String>;

const NOT_FILLED: &str = "Dolmadı";

fn is_null_sentinel(text: &str) -> bool {
    text.is_empty() || text == NOT_FILLED || text == "0"
}

fn unquote(text: &str) -> String {
    text.trim().replace('"', "").trim().to_string()
}

/// Parses a decimal-comma score, e.g. `"358,17297"` -> `358.17297`.
pub fn parse_score(text: &str) -> Option<f64> {
    let cleaned = unquote(text);
    if is_null_sentinel(&cleaned) {
        return None;
    }
    cleaned
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a dot-grouped ranking, e.g. `"92.887"` -> `92887`.
pub fn parse_ranking(text: &str) -> Option<f64> {
    let cleaned = unquote(text);
    if is_null_sentinel(&cleaned) {
        return None;
    }
    cleaned
        .replace('.', "")
        .parse::<i64>()
        .ok()
        .map(|value| value as f64)
}

/// Capacity and placement counts share the score format.
pub fn parse_count(text: &str) -> Option<u32> {
    parse_score(text)
        .filter(|value| *value >= 0.0)
        .map(|value| value.trunc() as u32)
}

/// Drops the `.0` a spreadsheet export leaves on numeric program codes.
pub fn normalize_program_key(key: &str) -> String {
    let key = key.trim();
    if key.contains('.') {
        if let Ok(value) = key.parse::<f64>() {
            if value.is_finite() {
                return format!("{}", value.round() as i64);
            }
        }
    }
    key.to_string()
}

fn field<'r>(raw: &'r RawRow, name: &str) -> &'r str {
    raw.get(name).map(|value| value.trim()).unwrap_or("")
}

fn year_field<'r>(raw: &'r RawRow, prefix: &str, year: Year) -> &'r str {
    field(raw, &format!("{}_{}", prefix, year))
}

pub fn parse_year_stats(raw: &RawRow, year: Year) -> YearStats {
    YearStats {
        capacity: parse_count(year_field(raw, "kontenjan", year)),
        placed: parse_count(year_field(raw, "yerlesen", year)),
        score_floor: parse_score(year_field(raw, "taban", year)),
        score_ceiling: parse_score(year_field(raw, "tavan", year)),
        rank_floor: parse_ranking(year_field(raw, "tbs", year)),
        rank_ceiling: parse_ranking(year_field(raw, "tavan_bs", year)),
        available: year_field(raw, "has", year) == "True",
    }
}

pub fn parse_program_row(raw: &RawRow, years: &[Year]) -> ProgramRecord {
    let city = field(raw, "city");
    ProgramRecord {
        program_key: field(raw, "yop_kodu").to_string(),
        university: field(raw, "university").to_string(),
        university_type: UniversityType::parse(field(raw, "university_type")),
        score_track: ScoreTrack::parse(field(raw, "puan_type")),
        scholarship: field(raw, "scholarship").to_string(),
        faculty: field(raw, "faculty").to_string(),
        program: field(raw, "program").to_string(),
        program_detail: field(raw, "program_detail").to_string(),
        city: (!city.is_empty()).then(|| city.to_string()),
        years: years
            .iter()
            .map(|year| (*year, parse_year_stats(raw, *year)))
            .collect(),
        years_with_data: field(raw, "years_with_data").parse().unwrap_or(0),
    }
}

/// Returns `None` for rows without a program code or with an unknown tier.
pub fn parse_price_row(raw: &RawRow, price_years: &[Year]) -> Option<PriceRecord> {
    let key = normalize_program_key(field(raw, "yop_kodu"));
    if key.is_empty() {
        return None;
    }
    let tier = field(raw, "scholarship_pct")
        .parse::<f64>()
        .ok()
        .and_then(ScholarshipTier::from_percent)?;

    let price_by_year: BTreeMap<Year, f64> = price_years
        .iter()
        .filter_map(|year| {
            year_field(raw, "discounted_price", *year)
                .parse::<f64>()
                .ok()
                .filter(|price| price.is_finite() && *price != 0.0)
                .map(|price| (*year, price))
        })
        .collect();

    Some(PriceRecord {
        program_key: key,
        tier,
        price_by_year,
    })
}

pub fn parse_preference_row(raw: &RawRow) -> Option<PreferenceRecord> {
    let key = normalize_program_key(field(raw, "yop_kodu"));
    let name = field(raw, "name");
    if key.is_empty() || name.is_empty() {
        return None;
    }
    Some(PreferenceRecord {
        program_key: key,
        year: field(raw, "year").parse().ok()?,
        dimension: PreferenceDimension::parse(field(raw, "dimension"))?,
        name: name.to_string(),
        preference_count: field(raw, "count").parse().ok()?,
    })
}

/// Two decimals with a decimal comma, `-` when missing.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.2}", value).replace('.', ","),
        None => "-".to_string(),
    }
}

/// Whole number with dot thousands separators, `-` when missing.
pub fn format_ranking(ranking: Option<f64>) -> String {
    let Some(value) = ranking else {
        return "-".to_string();
    };
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if rounded < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
