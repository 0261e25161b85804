//! Strength scoring: folds the sets of one exercise on one date into a single
//! session strength value.
//!
//! The score is the best Epley one-rep-max estimate among the session's valid
//! sets, `weight × (1 + reps / 30)`. It grows with both load and reps and is
//! used for every call; no other formula is mixed in.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use insights_core::formatting::format_weight;
use insights_core::models::{SessionStrength, SetRecord};
use insights_core::thresholds::EPLEY_REP_DIVISOR;
use tracing::debug;

/// Epley one-rep-max estimate for a single set.
pub fn estimate_one_rep_max(weight: f64, reps: i32) -> f64 {
    weight * (1.0 + f64::from(reps) / EPLEY_REP_DIVISOR)
}

/// Whether a set contributes to scoring.
pub fn is_valid_set(reps: i32, weight: f64) -> bool {
    reps > 0 && weight.is_finite() && weight > 0.0
}

/// Render one set as `"{reps}×{weight}"`.
pub fn format_set(reps: i32, weight: f64) -> String {
    format!("{}×{}", reps, format_weight(weight))
}

/// Score every `(date, exercise)` group in `rows`.
///
/// Rows with non-positive reps or weight (or a non-finite weight) are
/// ignored; a group left with no valid sets produces no record at all. The
/// returned records are ordered by date, then exercise name, but callers
/// should not rely on that.
pub fn compute_session_strength_by_exercise_date(rows: &[SetRecord]) -> Vec<SessionStrength> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<&SetRecord>> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        if !is_valid_set(row.reps, row.weight) {
            skipped += 1;
            continue;
        }
        groups
            .entry((row.session_date, row.exercise_name.as_str()))
            .or_default()
            .push(row);
    }

    if skipped > 0 {
        debug!(skipped, "ignored sets without positive reps and weight");
    }

    groups
        .into_iter()
        .map(|((date, exercise_name), mut sets)| {
            sets.sort_by_key(|s| s.set_number);

            let session_strength = sets
                .iter()
                .map(|s| estimate_one_rep_max(s.weight, s.reps))
                .fold(0.0_f64, f64::max);

            let set_summary = sets
                .iter()
                .map(|s| format_set(s.reps, s.weight))
                .collect::<Vec<_>>()
                .join(", ");

            let muscle_group = sets.iter().find_map(|s| s.muscle_group.clone());

            SessionStrength {
                date,
                exercise_name: exercise_name.to_string(),
                muscle_group,
                session_strength,
                set_summary,
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
