//! Insights View Builder.
//!
//! Consumes the bodyweight, calories and strength series and derives the
//! facts, correlations, improvements, achievements and suggestions shown to
//! the user. Everything here is a pure function of [`InsightsInput`]: the
//! reference date comes from the input, never from the clock.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use insights_core::config::InsightsConfig;
use insights_core::formatting::{format_number, format_signed, format_with_unit};
use insights_core::models::{
    Achievement, Correlation, Fact, InsightsInput, InsightsView, MetricPoint, SessionStrength,
};
use insights_core::statistics::{mean, percent_change};

use crate::aggregator::{correlate, normalize_series};

// ── Series descriptors ────────────────────────────────────────────────────────

/// Display name, unit and precision of one input series.
#[derive(Debug, Clone, Copy)]
struct SeriesMeta {
    name: &'static str,
    unit: &'static str,
    decimals: u32,
}

const BODYWEIGHT: SeriesMeta = SeriesMeta {
    name: "Bodyweight",
    unit: "kg",
    decimals: 1,
};

const CALORIES: SeriesMeta = SeriesMeta {
    name: "Calories",
    unit: "kcal",
    decimals: 0,
};

const STRENGTH: SeriesMeta = SeriesMeta {
    name: "Strength",
    unit: "kg",
    decimals: 1,
};

/// A normalized series reduced to its logged `(date, value)` pairs.
type Logged = Vec<(NaiveDate, f64)>;

fn logged(points: &[MetricPoint]) -> Logged {
    normalize_series(points)
        .into_iter()
        .filter_map(|p| p.value.map(|v| (p.date, v)))
        .collect()
}

/// Values dated in `(end - days, end]`.
fn window(series: &[(NaiveDate, f64)], end: NaiveDate, days: i64) -> Vec<f64> {
    let start = end - Duration::days(days);
    series
        .iter()
        .filter(|(d, _)| *d > start && *d <= end)
        .map(|(_, v)| *v)
        .collect()
}

/// Current and preceding trend windows ending at `as_of`.
fn trend_windows(
    series: &[(NaiveDate, f64)],
    as_of: NaiveDate,
    days: i64,
) -> (Vec<f64>, Vec<f64>) {
    let recent = window(series, as_of, days);
    let previous = window(series, as_of - Duration::days(days), days);
    (recent, previous)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Build the insights payload.
///
/// Inputs may be unsorted or contain duplicate dates; they are normalized
/// first. Empty inputs yield a sparse but valid view. Calling this twice with
/// the same input returns equal views.
pub fn build_insights_view(input: &InsightsInput, config: &InsightsConfig) -> InsightsView {
    let bodyweight = logged(&input.bodyweight);
    let calories = logged(&input.calories);
    let strength = logged(&input.strength);

    let as_of = input.as_of.or_else(|| latest_date(&[&bodyweight, &calories, &strength]));

    let mut facts = Vec::new();
    facts.extend(series_facts(&bodyweight, BODYWEIGHT, config));
    if let Some(as_of) = as_of {
        facts.extend(bodyweight_trend_fact(&bodyweight, as_of, config));
    }
    facts.extend(series_facts(&calories, CALORIES, config));
    facts.extend(series_facts(&strength, STRENGTH, config));

    let correlations = build_correlations(input, config);

    let improvements = match as_of {
        Some(as_of) => build_improvements(&strength, as_of, config),
        None => Vec::new(),
    };

    let mut achievements = exercise_bests(&input.sessions, config);
    achievements.extend(longest_streak(&[&bodyweight, &calories, &strength], config));
    achievements.extend(most_active_month(&strength));

    let suggestions = build_suggestions(
        &bodyweight,
        &calories,
        &strength,
        &correlations,
        as_of,
        config,
    );

    InsightsView {
        facts,
        correlations,
        improvements,
        achievements,
        suggestions,
    }
}

/// Latest logged date across `series`.
fn latest_date(series: &[&Logged]) -> Option<NaiveDate> {
    series
        .iter()
        .filter_map(|s| s.last().map(|(d, _)| *d))
        .max()
}

// ── Facts ─────────────────────────────────────────────────────────────────────

fn series_facts(
    series: &[(NaiveDate, f64)],
    meta: SeriesMeta,
    config: &InsightsConfig,
) -> Vec<Fact> {
    let Some(&(latest_date, latest)) = series.last() else {
        return Vec::new();
    };

    let mut facts = vec![Fact {
        label: format!("Latest {}", meta.name),
        value: format_with_unit(latest, meta.decimals, meta.unit),
        detail: format!("Logged {}", latest_date),
    }];

    let recent = window(series, latest_date, config.short_window_days);
    if let Some(avg) = mean(&recent) {
        facts.push(Fact {
            label: format!("{} {}-day average", meta.name, config.short_window_days),
            value: format_with_unit(avg, meta.decimals, meta.unit),
            detail: format!(
                "Across {} {}",
                recent.len(),
                plural(recent.len(), "entry", "entries")
            ),
        });
    }

    for days in [config.short_window_days, config.long_window_days] {
        // Baseline must fall in (latest - 2N, latest - N].
        let cutoff = latest_date - Duration::days(days);
        let oldest = cutoff - Duration::days(days);
        let baseline = series
            .iter()
            .rev()
            .find(|(d, _)| *d <= cutoff)
            .filter(|(d, _)| *d > oldest);
        if let Some(&(base_date, base)) = baseline {
            facts.push(Fact {
                label: format!("{} {}-day change", meta.name, days),
                value: signed_with_unit(latest - base, meta),
                detail: format!("Since {}", base_date),
            });
        }
    }

    facts
}

/// Neutral comparison of the recent bodyweight average with the window
/// before it.
fn bodyweight_trend_fact(
    bodyweight: &[(NaiveDate, f64)],
    as_of: NaiveDate,
    config: &InsightsConfig,
) -> Option<Fact> {
    let days = config.trend_window_days;
    let (recent, previous) = trend_windows(bodyweight, as_of, days);
    if recent.len() < config.min_window_points || previous.len() < config.min_window_points {
        return None;
    }
    let recent_avg = mean(&recent)?;
    let previous_avg = mean(&previous)?;

    Some(Fact {
        label: format!("{} {}-day trend", BODYWEIGHT.name, days),
        value: signed_with_unit(recent_avg - previous_avg, BODYWEIGHT),
        detail: format!(
            "Average {} vs {} in the previous {} days",
            format_with_unit(recent_avg, BODYWEIGHT.decimals, BODYWEIGHT.unit),
            format_with_unit(previous_avg, BODYWEIGHT.decimals, BODYWEIGHT.unit),
            days
        ),
    })
}

fn signed_with_unit(value: f64, meta: SeriesMeta) -> String {
    format!("{} {}", format_signed(value, meta.decimals), meta.unit)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

// ── Correlations ──────────────────────────────────────────────────────────────

fn build_correlations(input: &InsightsInput, config: &InsightsConfig) -> Vec<Correlation> {
    let bodyweight = input.bodyweight.as_slice();
    let calories = input.calories.as_slice();
    let strength = input.strength.as_slice();
    let pairs = [
        ("Bodyweight vs Calories", bodyweight, calories),
        ("Bodyweight vs Strength", bodyweight, strength),
        ("Calories vs Strength", calories, strength),
    ];

    pairs
        .into_iter()
        .map(|(label, a, b)| correlate(label, a, b, &config.correlation))
        .collect()
}

// ── Improvements ──────────────────────────────────────────────────────────────

fn build_improvements(
    strength: &[(NaiveDate, f64)],
    as_of: NaiveDate,
    config: &InsightsConfig,
) -> Vec<String> {
    let days = config.trend_window_days;
    let mut improvements = Vec::new();

    if let Some(pct) = strength_change_pct(strength, as_of, config) {
        if pct >= config.strength_improvement_pct {
            improvements.push(format!(
                "Strength is up {}% over the last {} days",
                format_number(pct, 1),
                days
            ));
        }
    }

    let (recent, previous) = trend_windows(strength, as_of, days);
    if !previous.is_empty() && recent.len() > previous.len() {
        improvements.push(format!(
            "You trained on {} days in the last {} days, up from {}",
            recent.len(),
            days,
            previous.len()
        ));
    }

    improvements
}

/// Percent change of the recent strength average over the preceding window,
/// when both windows hold enough points.
fn strength_change_pct(
    strength: &[(NaiveDate, f64)],
    as_of: NaiveDate,
    config: &InsightsConfig,
) -> Option<f64> {
    let (recent, previous) = trend_windows(strength, as_of, config.trend_window_days);
    if recent.len() < config.min_window_points || previous.len() < config.min_window_points {
        return None;
    }
    percent_change(mean(&previous)?, mean(&recent)?)
}

// ── Achievements ──────────────────────────────────────────────────────────────

/// All-time best session per exercise, when it beats the first one logged.
fn exercise_bests(sessions: &[SessionStrength], config: &InsightsConfig) -> Vec<Achievement> {
    let mut by_exercise: BTreeMap<&str, Vec<&SessionStrength>> = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.session_strength.is_finite()) {
        by_exercise
            .entry(session.exercise_name.as_str())
            .or_default()
            .push(session);
    }

    let mut bests: Vec<(NaiveDate, &str, &SessionStrength)> = Vec::new();
    for (exercise, mut history) in by_exercise {
        if history.len() < 2 {
            continue;
        }
        history.sort_by_key(|s| s.date);
        let first = history[0];
        let best = history.iter().skip(1).fold(first, |best, s| {
            if s.session_strength > best.session_strength {
                s
            } else {
                best
            }
        });
        if best.session_strength > first.session_strength {
            bests.push((best.date, exercise, best));
        }
    }

    bests.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    bests
        .into_iter()
        .take(config.max_exercise_achievements)
        .map(|(date, exercise, best)| Achievement {
            period: date.to_string(),
            title: format!("New best: {}", exercise),
            detail: format!(
                "Estimated 1RM {} ({})",
                format_with_unit(best.session_strength, STRENGTH.decimals, STRENGTH.unit),
                best.set_summary
            ),
        })
        .collect()
}

/// Longest run of consecutive days with a log in any series.
fn longest_streak(series: &[&Logged], config: &InsightsConfig) -> Option<Achievement> {
    let days: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.iter().map(|(d, _)| *d))
        .collect();

    let mut best: Option<(NaiveDate, NaiveDate, usize)> = None;
    let mut current: Option<(NaiveDate, NaiveDate, usize)> = None;

    for day in days {
        current = match current {
            Some((start, end, len)) if end.succ_opt() == Some(day) => Some((start, day, len + 1)),
            _ => Some((day, day, 1)),
        };
        if let Some(run) = current {
            if best.map_or(true, |(_, _, len)| run.2 > len) {
                best = Some(run);
            }
        }
    }

    let (start, end, len) = best?;
    if len < config.min_streak_days {
        return None;
    }
    Some(Achievement {
        period: format!("{} – {}", start, end),
        title: "Longest logging streak".to_string(),
        detail: format!("Logged on {} consecutive days", len),
    })
}

/// Calendar month with the most training days.
fn most_active_month(strength: &[(NaiveDate, f64)]) -> Option<Achievement> {
    let mut by_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for (date, _) in strength {
        *by_month.entry((date.year(), date.month())).or_insert(0) += 1;
    }

    let mut best: Option<((i32, u32), usize)> = None;
    for (month, count) in by_month {
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((month, count));
        }
    }

    let ((year, month), count) = best?;
    Some(Achievement {
        period: format!("{:04}-{:02}", year, month),
        title: "Most active month".to_string(),
        detail: format!("{} training {}", count, plural(count, "day", "days")),
    })
}

// ── Suggestions ───────────────────────────────────────────────────────────────

fn build_suggestions(
    bodyweight: &[(NaiveDate, f64)],
    calories: &[(NaiveDate, f64)],
    strength: &[(NaiveDate, f64)],
    correlations: &[Correlation],
    as_of: Option<NaiveDate>,
    config: &InsightsConfig,
) -> Vec<String> {
    let stale = config.stale_log_days;
    let logged_recently =
        |series: &[(NaiveDate, f64)]| as_of.is_some_and(|d| !window(series, d, stale).is_empty());

    let mut suggestions = Vec::new();

    if !logged_recently(bodyweight) {
        suggestions.push(format!(
            "Log your bodyweight: no entry in the last {} days",
            stale
        ));
    }
    if !logged_recently(calories) {
        suggestions.push(format!("Log your calories: no entry in the last {} days", stale));
    }
    if !logged_recently(strength) {
        suggestions.push(format!(
            "Schedule a workout: no training logged in the last {} days",
            stale
        ));
    }

    let declined = as_of
        .and_then(|d| strength_change_pct(strength, d, config))
        .filter(|pct| *pct <= -config.strength_improvement_pct);
    if let Some(pct) = declined {
        suggestions.push(format!(
            "Strength is down {}% over the last {} days; review recovery, sleep and nutrition",
            format_number(pct.abs(), 1),
            config.trend_window_days
        ));
    }

    let min_overlap = config.correlation.min_overlap_days;
    if correlations.iter().any(|c| c.overlap_days < min_overlap) {
        suggestions.push(
            "Log bodyweight, calories and workouts on the same days to unlock correlations"
                .to_string(),
        );
    }

    if suggestions.is_empty() {
        suggestions.push("Keep going: your logging is on track".to_string());
    }
    suggestions
}

// ── Tests ─────────────────────────────────────────────────────────────────────
