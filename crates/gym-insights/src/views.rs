use std::collections::BTreeMap;

use chrono::NaiveDate;
use insights_core::models::{SessionStrength, WorkoutSession};
use insights_core::thresholds::DEFAULT_RECENT_SESSIONS;
use insights_data::history::{
    dashboard_summary, exercise_history, last_session_by_split, previous_performance,
    recent_sessions, DashboardSummary, LastSessionInfo, PreviousPerformance,
};
use insights_data::reader::LogStore;
use serde::Serialize;

/// Payload of the `dashboard` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub athlete: String,
    pub today: NaiveDate,
    pub summary: DashboardSummary,
    pub last_session_by_split: BTreeMap<String, LastSessionInfo>,
    pub recent_sessions: Vec<WorkoutSession>,
}

/// Payload of the `exercise` view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseReport {
    pub exercise: String,
    pub history: Vec<SessionStrength>,
    /// Latest session before `today`, in logged units.
    pub previous: Option<PreviousPerformance>,
}

pub fn build_dashboard(store: &LogStore, today: NaiveDate) -> DashboardReport {
    DashboardReport {
        athlete: store.athlete(),
        today,
        summary: dashboard_summary(store),
        last_session_by_split: last_session_by_split(&store.sessions, today),
        recent_sessions: recent_sessions(&store.sessions, None, DEFAULT_RECENT_SESSIONS),
    }
}

pub fn build_exercise(store: &LogStore, exercise: &str, today: NaiveDate) -> ExerciseReport {
    let canonical = store
        .exercises
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(exercise))
        .map(|e| e.name.clone())
        .unwrap_or_else(|| exercise.to_string());

    ExerciseReport {
        history: exercise_history(store, &canonical),
        previous: previous_performance(store, &canonical, today),
        exercise: canonical,
    }
}
