//! Date-level aggregation of metric series and the pairwise correlation
//! primitive used for every cross-metric comparison.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use insights_core::config::{AggregationMode, CorrelationConfig};
use insights_core::models::{Correlation, MetricPoint, SessionStrength};
use insights_core::statistics::{is_constant, mean, pearson};

// ── Contract A: daily strength ────────────────────────────────────────────────

/// Combine per-exercise session scores into one strength value per date.
///
/// Returns one point per date present in `scores`, sorted ascending. Dates
/// with no session are absent, never zero-filled.
pub fn aggregate_session_strength_by_date(
    scores: &[SessionStrength],
    mode: AggregationMode,
) -> Vec<MetricPoint> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for score in scores {
        by_date
            .entry(score.date)
            .or_default()
            .push(score.session_strength);
    }

    by_date
        .into_iter()
        .map(|(date, values)| MetricPoint {
            date,
            value: combine(&values, mode),
        })
        .collect()
}

/// Apply `mode` to the scores of a single date.
fn combine(values: &[f64], mode: AggregationMode) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match mode {
        AggregationMode::Sum => Some(values.iter().sum()),
        AggregationMode::Max => values.iter().copied().reduce(f64::max),
        AggregationMode::Average => mean(values),
    }
}

// ── Series normalization ──────────────────────────────────────────────────────

/// Sort `points` by date and fold duplicate dates into one point.
///
/// A duplicated date takes the mean of its non-null values, or `None` when
/// all of them are null. Non-finite values are treated as null.
pub fn normalize_series(points: &[MetricPoint]) -> Vec<MetricPoint> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in points {
        let slot = by_date.entry(point.date).or_default();
        if let Some(v) = point.value.filter(|v| v.is_finite()) {
            slot.push(v);
        }
    }

    by_date
        .into_iter()
        .map(|(date, values)| MetricPoint {
            date,
            value: mean(&values),
        })
        .collect()
}

// ── Contract B: correlation ───────────────────────────────────────────────────

/// Inner-join `a` and `b` on exact date; keep dates where both have a value.
pub fn align_series(a: &[MetricPoint], b: &[MetricPoint]) -> Vec<(NaiveDate, f64, f64)> {
    let b_values: BTreeMap<NaiveDate, f64> = normalize_series(b)
        .into_iter()
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect();

    normalize_series(a)
        .into_iter()
        .filter_map(|p| {
            let av = p.value?;
            let bv = b_values.get(&p.date)?;
            Some((p.date, av, *bv))
        })
        .collect()
}

/// Correlate two dated series.
///
/// * Fewer than `config.min_overlap_days` paired dates: `value` is `None`.
/// * Either side constant over the paired dates: `value` is `None`.
/// * Otherwise the Pearson coefficient, clamped to `[-1, 1]`.
///
/// Swapping `a` and `b` yields the same value.
pub fn correlate(
    label: impl Into<String>,
    a: &[MetricPoint],
    b: &[MetricPoint],
    config: &CorrelationConfig,
) -> Correlation {
    let pairs = align_series(a, b);
    let overlap_days = pairs.len();
    let label = label.into();

    if overlap_days < config.min_overlap_days {
        return Correlation {
            label,
            value: None,
            interpretation: format!(
                "Not enough overlapping days ({} of {} needed)",
                overlap_days, config.min_overlap_days
            ),
            overlap_days,
        };
    }

    let xs: Vec<f64> = pairs.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = pairs.iter().map(|(_, _, y)| *y).collect();

    if is_constant(&xs) || is_constant(&ys) {
        return constant_result(label, overlap_days);
    }

    match pearson(&xs, &ys) {
        Some(r) => Correlation {
            label,
            value: Some(r),
            interpretation: interpret_correlation(r, config),
            overlap_days,
        },
        None => Correlation {
            label,
            value: None,
            interpretation: "Correlation could not be computed for these values".to_string(),
            overlap_days,
        },
    }
}

fn constant_result(label: String, overlap_days: usize) -> Correlation {
    Correlation {
        label,
        value: None,
        interpretation: "One of the series is constant on overlapping days".to_string(),
        overlap_days,
    }
}

/// Describe `r` as `"{Strong|Moderate|Weak} {positive|negative} relationship"`.
pub fn interpret_correlation(r: f64, config: &CorrelationConfig) -> String {
    let magnitude = r.abs();
    let strength = if magnitude >= config.strong_threshold {
        "Strong"
    } else if magnitude >= config.moderate_threshold {
        "Moderate"
    } else {
        "Weak"
    };
    let direction = if r < 0.0 { "negative" } else { "positive" };
    format!("{} {} relationship", strength, direction)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn score(day: &str, exercise: &str, value: f64) -> SessionStrength {
        SessionStrength {
            date: date(day),
            exercise_name: exercise.to_string(),
            muscle_group: None,
            session_strength: value,
            set_summary: String::new(),
        }
    }

    fn series(values: &[(&str, f64)]) -> Vec<MetricPoint> {
        values
            .iter()
            .map(|(d, v)| MetricPoint::new(date(d), *v))
            .collect()
    }

    fn daily(start: &str, values: &[f64]) -> Vec<MetricPoint> {
        let first = date(start);
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricPoint::new(first + chrono::Duration::days(i as i64), *v))
            .collect()
    }

    // ── aggregate_session_strength_by_date ────────────────────────────────────

    #[test]
    fn test_aggregate_modes_on_same_date() {
        let scores = vec![
            score("2024-02-01", "Bench Press", 100.0),
            score("2024-02-01", "Row", 50.0),
        ];

        let sum = aggregate_session_strength_by_date(&scores, AggregationMode::Sum);
        assert_eq!(sum, vec![MetricPoint::new(date("2024-02-01"), 150.0)]);

        let max = aggregate_session_strength_by_date(&scores, AggregationMode::Max);
        assert_eq!(max, vec![MetricPoint::new(date("2024-02-01"), 100.0)]);

        let avg = aggregate_session_strength_by_date(&scores, AggregationMode::Average);
        assert_eq!(avg, vec![MetricPoint::new(date("2024-02-01"), 75.0)]);
    }

    #[test]
    fn test_aggregate_sorted_and_no_gap_filling() {
        let scores = vec![
            score("2024-02-05", "Squat", 200.0),
            score("2024-02-01", "Squat", 190.0),
            score("2024-02-03", "Squat", 195.0),
        ];
        let points = aggregate_session_strength_by_date(&scores, AggregationMode::Sum);
        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-02-01"), date("2024-02-03"), date("2024-02-05")]
        );
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_session_strength_by_date(&[], AggregationMode::Max).is_empty());
    }

    // ── normalize_series ──────────────────────────────────────────────────────

    #[test]
    fn test_normalize_sorts_and_merges_duplicates() {
        let points = vec![
            MetricPoint::new(date("2024-01-03"), 80.0),
            MetricPoint::new(date("2024-01-01"), 81.0),
            MetricPoint::new(date("2024-01-03"), 82.0),
            MetricPoint::empty(date("2024-01-03")),
        ];
        let normalized = normalize_series(&points);
        assert_eq!(
            normalized,
            vec![
                MetricPoint::new(date("2024-01-01"), 81.0),
                MetricPoint::new(date("2024-01-03"), 81.0),
            ]
        );
    }

    #[test]
    fn test_normalize_all_null_duplicate_stays_null() {
        let points = vec![
            MetricPoint::empty(date("2024-01-03")),
            MetricPoint {
                date: date("2024-01-03"),
                value: Some(f64::NAN),
            },
        ];
        assert_eq!(
            normalize_series(&points),
            vec![MetricPoint::empty(date("2024-01-03"))]
        );
    }

    // ── correlate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_correlate_below_threshold_is_none() {
        let config = CorrelationConfig::default();
        let a = daily("2024-01-01", &[1.0, 2.0, 3.0, 4.0]);
        let b = daily("2024-01-01", &[2.0, 4.0, 6.0, 8.0]);
        let corr = correlate("A vs B", &a, &b, &config);
        assert_eq!(corr.value, None);
        assert_eq!(corr.overlap_days, 4);
        assert_eq!(
            corr.interpretation,
            "Not enough overlapping days (4 of 5 needed)"
        );
    }

    #[test]
    fn test_correlate_identical_series_is_one() {
        let config = CorrelationConfig::default();
        let a = daily("2024-01-01", &[80.0, 80.5, 79.8, 81.2, 80.9, 82.0]);
        let corr = correlate("A vs A", &a, &a, &config);
        assert!((corr.value.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.overlap_days, 6);
        assert_eq!(corr.interpretation, "Strong positive relationship");
    }

    #[test]
    fn test_correlate_is_symmetric() {
        let config = CorrelationConfig::default();
        let a = daily("2024-01-01", &[3.0, 1.5, 4.0, 1.0, 5.9, 2.6]);
        let b = daily("2024-01-01", &[2.6, 5.3, 5.8, 9.7, 9.3, 2.4]);
        let ab = correlate("ab", &a, &b, &config);
        let ba = correlate("ba", &b, &a, &config);
        assert_eq!(ab.value, ba.value);
        assert_eq!(ab.overlap_days, ba.overlap_days);
    }

    #[test]
    fn test_correlate_counts_only_dates_with_both_values() {
        let config = CorrelationConfig::default();
        let mut a = daily("2024-01-01", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        a[2].value = None;
        let b = daily("2024-01-03", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // Shared dates: Jan 3..=6, and Jan 3 is null on `a`.
        let corr = correlate("gaps", &a, &b, &config);
        assert_eq!(corr.overlap_days, 3);
        assert!(corr.value.is_none());
    }

    #[test]
    fn test_correlate_constant_series_is_none() {
        let config = CorrelationConfig::default();
        let a = daily("2024-01-01", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = daily("2024-01-01", &[2000.0; 5]);
        let corr = correlate("flat", &a, &b, &config);
        assert!(corr.value.is_none());
        assert_eq!(corr.overlap_days, 5);
        assert!(corr.interpretation.contains("constant"));
    }

    #[test]
    fn test_correlate_negative_relationship() {
        let config = CorrelationConfig::default();
        let a = daily("2024-01-01", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = daily("2024-01-01", &[10.0, 8.0, 6.0, 4.0, 2.0]);
        let corr = correlate("neg", &a, &b, &config);
        assert!((corr.value.unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(corr.interpretation, "Strong negative relationship");
    }

    #[test]
    fn test_correlate_handles_unsorted_input() {
        let config = CorrelationConfig::default();
        let mut a = daily("2024-01-01", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        a.reverse();
        let b = daily("2024-01-01", &[2.0, 4.0, 6.0, 8.0, 10.0]);
        let corr = correlate("unsorted", &a, &b, &config);
        assert!((corr.value.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlate_respects_configured_minimum() {
        let config = CorrelationConfig {
            min_overlap_days: 3,
            ..CorrelationConfig::default()
        };
        let a = series(&[("2024-01-01", 1.0), ("2024-01-02", 2.0), ("2024-01-03", 3.0)]);
        let corr = correlate("small", &a, &a, &config);
        assert!(corr.value.is_some());
    }

    // ── interpret_correlation ─────────────────────────────────────────────────

    #[test]
    fn test_interpretation_bands() {
        let config = CorrelationConfig::default();
        assert_eq!(interpret_correlation(0.6, &config), "Strong positive relationship");
        assert_eq!(interpret_correlation(-0.45, &config), "Moderate negative relationship");
        assert_eq!(interpret_correlation(0.3, &config), "Moderate positive relationship");
        assert_eq!(interpret_correlation(-0.1, &config), "Weak negative relationship");
        assert_eq!(interpret_correlation(0.0, &config), "Weak positive relationship");
    }

    // ── extreme magnitudes ────────────────────────────────────────────────────

    #[test]
    fn test_correlate_huge_values_stays_in_range() {
        let config = CorrelationConfig::default();
        let values: Vec<f64> = (1..=5).map(|i| i as f64 * 1e200).collect();
        let a = daily("2024-01-01", &values);

        let corr = correlate("Huge", &a, &a, &config);
        let r = corr.value.expect("finite correlation");
        assert!((-1.0..=1.0).contains(&r));
        assert!((r - 1.0).abs() < 1e-9);
        assert_eq!(corr.interpretation, "Strong positive relationship");
    }
}
