//! Main analysis pipeline.
//!
//! Builds the engine's series from a loaded [`LogStore`], scores and
//! aggregates strength, and runs the view builder, returning an
//! [`InsightsReport`] ready for rendering.

use chrono::{NaiveDate, Utc};
use insights_core::config::InsightsConfig;
use insights_core::models::{InsightsInput, InsightsView, MetricPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::aggregate_session_strength_by_date;
use crate::insights::build_insights_view;
use crate::reader::LogStore;
use crate::scorer::{compute_session_strength_by_exercise_date, is_valid_set};
use crate::series::{bodyweight_series, calories_series, strength_rows};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Reference date the view was built for, if one was given.
    pub as_of: Option<NaiveDate>,
    pub aggregation_mode: String,
    /// Joined sets that passed validation and fed the scorer.
    pub sets_scored: usize,
    /// `(date, exercise)` groups that produced a strength score.
    pub sessions_scored: usize,
    pub bodyweight_points: usize,
    pub calories_points: usize,
    pub strength_points: usize,
    /// Wall-clock seconds spent scoring and building the view.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_insights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    /// Name used to greet the user.
    pub athlete: String,
    pub view: InsightsView,
    pub bodyweight_series: Vec<MetricPoint>,
    pub calories_series: Vec<MetricPoint>,
    pub strength_series: Vec<MetricPoint>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Assemble the view builder's input from the raw tables.
pub fn build_insights_input(
    store: &LogStore,
    config: &InsightsConfig,
    as_of: Option<NaiveDate>,
) -> InsightsInput {
    scored_input(store, config, as_of).0
}

/// The view builder's input plus the number of sets that were scored.
fn scored_input(
    store: &LogStore,
    config: &InsightsConfig,
    as_of: Option<NaiveDate>,
) -> (InsightsInput, usize) {
    let rows = strength_rows(store);
    let sets_scored = rows.iter().filter(|r| is_valid_set(r.reps, r.weight)).count();
    let sessions = compute_session_strength_by_exercise_date(&rows);
    let strength = aggregate_session_strength_by_date(&sessions, config.aggregation_mode);

    let input = InsightsInput {
        bodyweight: bodyweight_series(&store.bodyweight),
        calories: calories_series(&store.calories),
        strength,
        sessions,
        as_of,
    };
    (input, sets_scored)
}

/// Run the full pipeline over an already loaded store.
///
/// 1. Build the bodyweight and calories series.
/// 2. Join and score weighted sets, then aggregate them per date using
///    `config.aggregation_mode`.
/// 3. Build the insights view.
pub fn analyze_insights(
    store: &LogStore,
    config: &InsightsConfig,
    as_of: Option<NaiveDate>,
) -> InsightsReport {
    let start = std::time::Instant::now();

    let (input, sets_scored) = scored_input(store, config, as_of);
    let view = build_insights_view(&input, config);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        as_of,
        aggregation_mode: config.aggregation_mode.to_string(),
        sets_scored,
        sessions_scored: input.sessions.len(),
        bodyweight_points: input.bodyweight.len(),
        calories_points: input.calories.len(),
        strength_points: input.strength.len(),
        transform_time_seconds: start.elapsed().as_secs_f64(),
    };

    debug!(
        "Analysis complete: {} sets, {} sessions, {} facts, {} suggestions",
        metadata.sets_scored,
        metadata.sessions_scored,
        view.facts.len(),
        view.suggestions.len()
    );

    InsightsReport {
        athlete: store.athlete(),
        view,
        bodyweight_series: input.bodyweight,
        calories_series: input.calories,
        strength_series: input.strength,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
