//! Read-models over the raw log tables: the dashboard summary, per-split
//! session history and an exercise's previous performance.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use insights_core::models::{SessionStrength, WorkoutSession};
use insights_core::time_utils::days_ago;
use insights_core::units::WeightUnit;
use serde::{Deserialize, Serialize};

use crate::reader::LogStore;
use crate::scorer::{compute_session_strength_by_exercise_date, format_set, is_valid_set};
use crate::series::strength_rows;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Most recent workout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestWorkout {
    pub session_date: NaiveDate,
    pub split: Option<String>,
}

/// Most recent bodyweight entry, as logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBodyweight {
    pub log_date: NaiveDate,
    pub weight_input: f64,
    pub unit_input: WeightUnit,
}

/// Counts and latest entries shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub workout_count: usize,
    pub bodyweight_count: usize,
    pub latest_workout: Option<LatestWorkout>,
    pub latest_bodyweight: Option<LatestBodyweight>,
}

/// When a split was last trained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSessionInfo {
    pub session_date: NaiveDate,
    pub days_ago: i64,
}

/// The sets logged for an exercise in its latest earlier session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPerformance {
    pub session_date: NaiveDate,
    /// e.g. `"5×135, 5×140 lb"`.
    pub summary: String,
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub fn dashboard_summary(store: &LogStore) -> DashboardSummary {
    let latest_workout = store
        .sessions
        .iter()
        .max_by_key(|s| s.session_date)
        .map(|s| LatestWorkout {
            session_date: s.session_date,
            split: s.split.clone(),
        });

    let latest_bodyweight = store
        .bodyweight
        .iter()
        .max_by_key(|b| b.log_date)
        .map(|b| LatestBodyweight {
            log_date: b.log_date,
            weight_input: b.weight_input,
            unit_input: b.unit_input,
        });

    DashboardSummary {
        workout_count: store.sessions.len(),
        bodyweight_count: store.bodyweight.len(),
        latest_workout,
        latest_bodyweight,
    }
}

// ── Sessions ──────────────────────────────────────────────────────────────────

/// Most recent session of every split, relative to `today`.
///
/// Sessions without a split are ignored.
pub fn last_session_by_split(
    sessions: &[WorkoutSession],
    today: NaiveDate,
) -> BTreeMap<String, LastSessionInfo> {
    let mut latest: BTreeMap<String, NaiveDate> = BTreeMap::new();
    for session in sessions {
        let Some(split) = session.split.as_deref() else {
            continue;
        };
        latest
            .entry(split.to_string())
            .and_modify(|d| *d = (*d).max(session.session_date))
            .or_insert(session.session_date);
    }

    latest
        .into_iter()
        .map(|(split, session_date)| {
            let info = LastSessionInfo {
                session_date,
                days_ago: days_ago(session_date, today),
            };
            (split, info)
        })
        .collect()
}

/// Up to `limit` sessions, newest first, optionally restricted to one split.
pub fn recent_sessions(
    sessions: &[WorkoutSession],
    split: Option<&str>,
    limit: usize,
) -> Vec<WorkoutSession> {
    let mut matching: Vec<&WorkoutSession> = sessions
        .iter()
        .filter(|s| split.map_or(true, |wanted| s.split.as_deref() == Some(wanted)))
        .collect();
    matching.sort_by(|a, b| b.session_date.cmp(&a.session_date));
    matching.into_iter().take(limit).cloned().collect()
}

// ── Exercises ─────────────────────────────────────────────────────────────────

/// Scored sessions of one exercise, oldest first.
///
/// The exercise name is matched case-insensitively.
pub fn exercise_history(store: &LogStore, exercise_name: &str) -> Vec<SessionStrength> {
    let rows: Vec<_> = strength_rows(store)
        .into_iter()
        .filter(|r| r.exercise_name.eq_ignore_ascii_case(exercise_name))
        .collect();
    compute_session_strength_by_exercise_date(&rows)
}

/// The latest session strictly before `before` in which `exercise_name` has
/// valid weighted sets, summarized in the units they were logged in.
pub fn previous_performance(
    store: &LogStore,
    exercise_name: &str,
    before: NaiveDate,
) -> Option<PreviousPerformance> {
    let exercise_ids: Vec<&str> = store
        .exercises
        .iter()
        .filter(|e| e.name.eq_ignore_ascii_case(exercise_name))
        .map(|e| e.id.as_str())
        .collect();
    if exercise_ids.is_empty() {
        return None;
    }

    let session_dates: HashMap<&str, NaiveDate> = store
        .sessions
        .iter()
        .filter(|s| s.session_date < before)
        .map(|s| (s.id.as_str(), s.session_date))
        .collect();

    // (date, session id) -> (set number, reps, weight, unit)
    let mut by_session: BTreeMap<(NaiveDate, &str), Vec<(u32, i32, f64, WeightUnit)>> =
        BTreeMap::new();
    for set in &store.sets {
        if !exercise_ids.contains(&set.exercise_id.as_str()) {
            continue;
        }
        let Some(&date) = session_dates.get(set.session_id.as_str()) else {
            continue;
        };
        let (Some(reps), Some(weight)) = (set.reps, set.weight_input) else {
            continue;
        };
        if !is_valid_set(reps, weight) {
            continue;
        }
        let unit = set.unit_input.unwrap_or(WeightUnit::Lb);
        by_session
            .entry((date, set.session_id.as_str()))
            .or_default()
            .push((set.set_number, reps, weight, unit));
    }

    let ((session_date, _), mut sets) = by_session.into_iter().next_back()?;
    sets.sort_by_key(|(n, ..)| *n);

    Some(PreviousPerformance {
        session_date,
        summary: summarize_sets(&sets),
    })
}

/// `"5×135, 5×140 lb"`; mixed units are spelled out per set.
fn summarize_sets(sets: &[(u32, i32, f64, WeightUnit)]) -> String {
    let first_unit = sets.first().map(|(.., u)| *u);
    let uniform = sets.iter().all(|(.., u)| Some(*u) == first_unit);

    let parts: Vec<String> = sets
        .iter()
        .map(|&(_, reps, weight, unit)| {
            if uniform {
                format_set(reps, weight)
            } else {
                format!("{} {}", format_set(reps, weight), unit)
            }
        })
        .collect();

    match (uniform, first_unit) {
        (true, Some(unit)) => format!("{} {}", parts.join(", "), unit),
        _ => parts.join(", "),
    }
}
