//! Turns raw log-store tables into the engine's input series.

use std::collections::HashMap;

use insights_core::models::{
    BodyweightLog, CaloriesLog, Exercise, MetricPoint, MetricType, SetRecord, WorkoutSession,
    WorkoutSet,
};
use insights_core::units::{to_kg, WeightUnit};
use tracing::debug;

use crate::aggregator::normalize_series;
use crate::reader::LogStore;

/// Daily bodyweight in kilograms.
///
/// Uses the stored `weight_kg` when present, otherwise converts the raw input.
pub fn bodyweight_series(logs: &[BodyweightLog]) -> Vec<MetricPoint> {
    let points: Vec<MetricPoint> = logs
        .iter()
        .map(|log| {
            let kg = log
                .weight_kg
                .unwrap_or_else(|| to_kg(log.weight_input, log.unit_input));
            MetricPoint::new(log.log_date, kg)
        })
        .collect();
    normalize_series(&points)
}

/// Daily calorie intake, pre- plus post-workout.
///
/// A missing side counts as zero; a row with both sides missing has no value.
pub fn calories_series(logs: &[CaloriesLog]) -> Vec<MetricPoint> {
    let points: Vec<MetricPoint> = logs
        .iter()
        .map(|log| match (log.pre_workout_kcal, log.post_workout_kcal) {
            (None, None) => MetricPoint::empty(log.log_date),
            (pre, post) => {
                MetricPoint::new(log.log_date, pre.unwrap_or(0.0) + post.unwrap_or(0.0))
            }
        })
        .collect();
    normalize_series(&points)
}

/// Join every weighted set with its session date and exercise metadata.
///
/// Sets referring to an unknown session or exercise, sets of duration
/// exercises, and sets missing reps or weight are dropped. The stored
/// `weight_kg` is used when present; otherwise the raw input is converted,
/// taking a set without a unit as pounds.
pub fn strength_rows(store: &LogStore) -> Vec<SetRecord> {
    let sessions: HashMap<&str, &WorkoutSession> =
        store.sessions.iter().map(|s| (s.id.as_str(), s)).collect();
    let exercises: HashMap<&str, &Exercise> =
        store.exercises.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut dropped = 0usize;
    let rows: Vec<SetRecord> = store
        .sets
        .iter()
        .filter_map(|set| {
            let record = join_set(set, &sessions, &exercises);
            if record.is_none() {
                dropped += 1;
            }
            record
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, "sets left out of strength scoring");
    }
    rows
}

fn join_set(
    set: &WorkoutSet,
    sessions: &HashMap<&str, &WorkoutSession>,
    exercises: &HashMap<&str, &Exercise>,
) -> Option<SetRecord> {
    let session = sessions.get(set.session_id.as_str())?;
    let exercise = exercises.get(set.exercise_id.as_str())?;
    if exercise.metric_type != MetricType::WeightedReps {
        return None;
    }
    let reps = set.reps?;
    let weight = match set.weight_kg {
        Some(kg) => kg,
        None => to_kg(set.weight_input?, set.unit_input.unwrap_or(WeightUnit::Lb)),
    };

    Some(SetRecord {
        session_date: session.session_date,
        exercise_name: exercise.name.clone(),
        muscle_group: exercise.muscle_group.clone(),
        set_number: set.set_number,
        reps,
        weight,
    })
}
