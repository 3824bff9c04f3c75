//! Scans the corpus for programs whose admission range sits inside a window.

use crate::models::{Bound, Metric, ProgramRecord, ScoreTrack, Year};
use crate::window::ComparisonWindow;

/// A corpus record accepted by the filter, with its normalized range.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedProgram<'a> {
    pub record: &'a ProgramRecord,
    pub min: f64,
    pub max: f64,
    /// Source floor and ceiling were in the wrong order and got swapped.
    pub range_corrected: bool,
}

/// Normalized `(lower, upper, corrected)` range of a record for one year.
///
/// A missing floor (`taban` / `tbs`) with a present ceiling (`tavan` /
/// `tavan_bs`) is a cohort of one student, so the floor takes the ceiling value.
pub fn normalized_range(
    record: &ProgramRecord,
    metric: Metric,
    year: Year,
) -> Option<(f64, f64, bool)> {
    let ceiling = record.bound(metric, metric.best_bound(), year);
    let floor = record.bound(metric, metric.worst_bound(), year).or(ceiling);
    let (floor, ceiling) = (floor?, ceiling?);

    let (lower, upper) = match metric.best_bound() {
        Bound::Lower => (ceiling, floor),
        Bound::Upper => (floor, ceiling),
    };

    if lower > upper {
        tracing::debug!(
            program_key = %record.program_key,
            lower,
            upper,
            "floor and ceiling out of order, swapping"
        );
        Some((upper, lower, true))
    } else {
        Some((lower, upper, false))
    }
}

fn match_record<'a>(
    record: &'a ProgramRecord,
    window: &ComparisonWindow,
    year: Year,
    score_track: Option<ScoreTrack>,
) -> Option<MatchedProgram<'a>> {
    if !record.is_available(year) || record.score_track != score_track {
        return None;
    }
    let (min, max, range_corrected) = normalized_range(record, window.metric, year)?;
    window.contains(min, max).then_some(MatchedProgram {
        record,
        min,
        max,
        range_corrected,
    })
}

/// Records available in `year`, on the same score track, whose range is
/// fully contained in `window`. Output keeps corpus order.
pub fn find_similar<'a>(
    records: &'a [ProgramRecord],
    window: Option<&ComparisonWindow>,
    year: Year,
    score_track: Option<ScoreTrack>,
) -> Vec<MatchedProgram<'a>> {
    let Some(window) = window else {
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| match_record(record, window, year, score_track))
        .collect()
}

/// Same result as [`find_similar`], scanned `chunk_size` records at a time
/// with `between_chunks` called after every chunk but the last.
pub fn find_similar_chunked<'a, F>(
    records: &'a [ProgramRecord],
    window: Option<&ComparisonWindow>,
    year: Year,
    score_track: Option<ScoreTrack>,
    chunk_size: usize,
    mut between_chunks: F,
) -> Vec<MatchedProgram<'a>>
where
    F: FnMut(usize),
{
    let mut matches = Vec::new();
    let chunk_count = records.chunks(chunk_size.max(1)).len();
    for (index, chunk) in records.chunks(chunk_size.max(1)).enumerate() {
        matches.extend(find_similar(chunk, window, year, score_track));
        if index + 1 < chunk_count {
            between_chunks(index);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearStats;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn program(key: &str, floor: Option<f64>, ceiling: Option<f64>) -> ProgramRecord {
        let mut record = ProgramRecord {
            program_key: key.to_string(),
            university: format!("UNI {}", key),
            score_track: Some(ScoreTrack::Quantitative),
            ..ProgramRecord::default()
        };
        record.years.insert(
            2024,
            YearStats {
                score_floor: floor,
                score_ceiling: ceiling,
                available: true,
                ..YearStats::default()
            },
        );
        record
    }

    fn window(min: f64, max: f64) -> ComparisonWindow {
        ComparisonWindow {
            metric: Metric::Score,
            min,
            max,
            is_user_overridden: false,
        }
    }

    fn keys(matches: &[MatchedProgram<'_>]) -> Vec<String> {
        matches
            .iter()
            .map(|m| m.record.program_key.clone())
            .collect()
    }

    #[test]
    fn test_strict_containment() {
        let corpus = vec![
            program("inside", Some(310.0), Some(350.0)),
            program("below", Some(270.0), Some(350.0)),
            program("above", Some(310.0), Some(365.0)),
            program("edge", Some(280.0), Some(360.0)),
        ];
        let w = window(280.0, 360.0);
        let matches = find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative));
        assert_eq!(keys(&matches), vec!["inside", "edge"]);
    }

    #[test]
    fn test_rejects_unavailable_and_other_tracks() {
        let mut unavailable = program("off", Some(310.0), Some(320.0));
        unavailable.years.get_mut(&2024).unwrap().available = false;
        let mut verbal = program("verbal", Some(310.0), Some(320.0));
        verbal.score_track = Some(ScoreTrack::Verbal);
        let corpus = vec![unavailable, verbal, program("ok", Some(310.0), Some(320.0))];

        let w = window(300.0, 340.0);
        let matches = find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative));
        assert_eq!(keys(&matches), vec!["ok"]);
        assert!(find_similar(&corpus, Some(&w), 2023, Some(ScoreTrack::Quantitative)).is_empty());
    }

    #[test]
    fn test_single_student_cohort_uses_ceiling_as_floor() {
        let corpus = vec![
            program("single", None, Some(320.0)),
            program("no_ceiling", Some(320.0), None),
        ];
        let w = window(300.0, 340.0);
        let matches = find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative));
        assert_eq!(keys(&matches), vec!["single"]);
        assert_eq!((matches[0].min, matches[0].max), (320.0, 320.0));
    }

    #[test]
    fn test_single_student_cohort_for_ranks() {
        let mut record = program("single", None, None);
        let stats = record.years.get_mut(&2024).unwrap();
        stats.rank_ceiling = Some(95_000.0);
        assert_eq!(
            normalized_range(&record, Metric::Rank, 2024),
            Some((95_000.0, 95_000.0, false))
        );

        let stats = record.years.get_mut(&2024).unwrap();
        stats.rank_ceiling = None;
        stats.rank_floor = Some(95_000.0);
        assert_eq!(normalized_range(&record, Metric::Rank, 2024), None);
    }

    #[test]
    fn test_swaps_inverted_ranges_and_flags_them() {
        let corpus = vec![program("inverted", Some(330.0), Some(310.0))];
        let w = window(300.0, 340.0);
        let matches = find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative));
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].min, matches[0].max), (310.0, 330.0));
        assert!(matches[0].range_corrected);
    }

    #[test]
    fn test_no_window_means_no_matches() {
        let corpus = vec![program("a", Some(310.0), Some(320.0))];
        assert!(find_similar(&corpus, None, 2024, Some(ScoreTrack::Quantitative)).is_empty());
    }

    #[test]
    fn test_chunked_scan_matches_full_scan() {
        let corpus: Vec<ProgramRecord> = (0..23)
            .map(|i| {
                let floor = 280.0 + i as f64 * 3.0;
                program(&i.to_string(), Some(floor), Some(floor + 15.0))
            })
            .collect();
        let w = window(300.0, 340.0);
        let full = find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative));

        let mut yields = Vec::new();
        let chunked = find_similar_chunked(
            &corpus,
            Some(&w),
            2024,
            Some(ScoreTrack::Quantitative),
            5,
            |index| yields.push(index),
        );
        assert_eq!(keys(&chunked), keys(&full));
        assert_eq!(yields, vec![0, 1, 2, 3]);
    }

    proptest! {
        #[test]
        fn every_match_is_contained(
            ranges in prop::collection::vec((0.0f64..600.0, 0.0f64..600.0), 0..60),
            lo in 0.0f64..300.0,
            width in 0.0f64..300.0,
        ) {
            let corpus: Vec<ProgramRecord> = ranges
                .iter()
                .enumerate()
                .map(|(i, (a, b))| program(&i.to_string(), Some(*a), Some(*b)))
                .collect();
            let w = window(lo, lo + width);
            for m in find_similar(&corpus, Some(&w), 2024, Some(ScoreTrack::Quantitative)) {
                prop_assert!(m.min <= m.max);
                prop_assert!(m.min >= w.min && m.max <= w.max);
            }
        }
    }
}
