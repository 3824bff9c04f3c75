//! Label, series and color arrays for the range chart.

use crate::enrichment::AnnotatedProgram;
use crate::models::UniversityType;
use serde::Serialize;

pub const OWN_UNIVERSITY_COLOR: &str = "rgba(255, 193, 7, 0.8)";
pub const FALLBACK_COLOR: &str = "rgba(153, 102, 255, 0.6)";

/// A record limit at or above this shows every match.
pub const SHOW_ALL_LIMIT: usize = 200;

pub fn type_color(university_type: UniversityType) -> &'static str {
    match university_type {
        UniversityType::State => "rgba(54, 162, 235, 0.6)",
        UniversityType::Foundation => "rgba(255, 99, 132, 0.6)",
        UniversityType::Trnc => "rgba(75, 192, 192, 0.6)",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub min: f64,
    pub max: f64,
    pub fulfillment_rate: f64,
    pub capacity: Option<u32>,
    pub placed: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data_points: Vec<DataPoint>,
    pub price_points: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Leading slice of a ranked list shown on the chart. Tables use the full list.
pub fn limit_for_chart<'r, 'a>(
    ranked: &'r [AnnotatedProgram<'a>],
    record_limit: usize,
) -> &'r [AnnotatedProgram<'a>] {
    if record_limit >= SHOW_ALL_LIMIT {
        return ranked;
    }
    &ranked[..record_limit.max(1).min(ranked.len())]
}

fn color_for(program: &AnnotatedProgram<'_>, own_university_name: &str) -> &'static str {
    if program.record.university == own_university_name {
        OWN_UNIVERSITY_COLOR
    } else {
        program
            .record
            .university_type
            .map(type_color)
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// One chart entry per program, in the given order.
pub fn assemble(ranked: &[AnnotatedProgram<'_>], own_university_name: &str) -> ChartData {
    let mut chart = ChartData::default();
    for program in ranked {
        chart.labels.push(program.record.university.clone());
        chart.data_points.push(DataPoint {
            min: program.min,
            max: program.max,
            fulfillment_rate: program.fulfillment_rate,
            capacity: program.capacity,
            placed: program.placed,
        });
        chart.price_points.push(program.price);
        chart
            .colors
            .push(color_for(program, own_university_name).to_string());
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgramRecord;
    use pretty_assertions::assert_eq;

    fn record(key: &str, university: &str, kind: Option<UniversityType>) -> ProgramRecord {
        ProgramRecord {
            program_key: key.to_string(),
            university: university.to_string(),
            university_type: kind,
            ..ProgramRecord::default()
        }
    }

    fn annotated(record: &ProgramRecord, min: f64, max: f64, price: f64) -> AnnotatedProgram<'_> {
        AnnotatedProgram {
            record,
            min,
            max,
            range_corrected: false,
            range_padded: false,
            capacity: Some(50),
            placed: Some(40),
            fulfillment_rate: 80.0,
            price,
            price_index: None,
            evaluation_score: None,
            price_verdict: None,
        }
    }

    #[test]
    fn test_assemble_keeps_order_and_colors() {
        let recs = [
            record("1", "OWN", Some(UniversityType::Foundation)),
            record("2", "STATE U", Some(UniversityType::State)),
            record("3", "ISLAND U", Some(UniversityType::Trnc)),
            record("4", "UNKNOWN U", None),
        ];
        let ranked: Vec<_> = recs
            .iter()
            .enumerate()
            .map(|(i, r)| annotated(r, i as f64, i as f64 + 10.0, i as f64 * 1000.0))
            .collect();

        let chart = assemble(&ranked, "OWN");
        assert_eq!(chart.len(), 4);
        assert_eq!(chart.labels, vec!["OWN", "STATE U", "ISLAND U", "UNKNOWN U"]);
        assert_eq!(
            chart.colors,
            vec![
                OWN_UNIVERSITY_COLOR,
                "rgba(54, 162, 235, 0.6)",
                "rgba(75, 192, 192, 0.6)",
                FALLBACK_COLOR,
            ]
        );
        assert_eq!(chart.price_points, vec![0.0, 1000.0, 2000.0, 3000.0]);
        assert_eq!(
            chart.data_points[1],
            DataPoint {
                min: 1.0,
                max: 11.0,
                fulfillment_rate: 80.0,
                capacity: Some(50),
                placed: Some(40),
            }
        );
    }

    #[test]
    fn test_limit_for_chart() {
        let recs: Vec<_> = (0..5)
            .map(|i| record(&i.to_string(), "U", None))
            .collect();
        let ranked: Vec<_> = recs.iter().map(|r| annotated(r, 0.0, 1.0, 0.0)).collect();

        assert_eq!(limit_for_chart(&ranked, 3).len(), 3);
        assert_eq!(limit_for_chart(&ranked, 10).len(), 5);
        assert_eq!(limit_for_chart(&ranked, SHOW_ALL_LIMIT).len(), 5);
        assert_eq!(limit_for_chart(&ranked, 0).len(), 1);
        assert_eq!(limit_for_chart(&ranked[..0], 3).len(), 0);
    }
}
