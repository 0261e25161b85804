use crate::error::{InsightsError, Result};
use crate::thresholds::{
    LONG_WINDOW_DAYS, MAX_EXERCISE_ACHIEVEMENTS, MIN_OVERLAP_DAYS, MIN_STREAK_DAYS,
    MIN_WINDOW_POINTS, MODERATE_CORRELATION, SHORT_WINDOW_DAYS, STALE_LOG_DAYS,
    STRENGTH_IMPROVEMENT_PCT, STRONG_CORRELATION, TREND_WINDOW_DAYS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── AggregationMode ───────────────────────────────────────────────────────────

/// How per-exercise session scores on one date are combined into the daily
/// strength value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Total daily load across every exercise trained that day.
    #[default]
    Sum,
    /// Best single-exercise score of the day.
    Max,
    /// Arithmetic mean of the day's exercise scores.
    Average,
}

impl FromStr for AggregationMode {
    type Err = InsightsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "sum" => Ok(AggregationMode::Sum),
            "max" => Ok(AggregationMode::Max),
            "average" | "avg" | "mean" => Ok(AggregationMode::Average),
            other => Err(InsightsError::InvalidMode(other.to_string())),
        }
    }
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Sum => "sum",
            AggregationMode::Max => "max",
            AggregationMode::Average => "average",
        }
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CorrelationConfig ─────────────────────────────────────────────────────────

/// Sample-size policy and interpretation bands for the correlation primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationConfig {
    /// Pairs required before a coefficient is computed at all.
    pub min_overlap_days: usize,
    /// Lower bound of the "strong" band on `|r|`.
    pub strong_threshold: f64,
    /// Lower bound of the "moderate" band on `|r|`.
    pub moderate_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_overlap_days: MIN_OVERLAP_DAYS,
            strong_threshold: STRONG_CORRELATION,
            moderate_threshold: MODERATE_CORRELATION,
        }
    }
}

// ── InsightsConfig ────────────────────────────────────────────────────────────

/// Every knob the insights engine reads, defaulting to [`crate::thresholds`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsConfig {
    pub aggregation_mode: AggregationMode,
    pub correlation: CorrelationConfig,
    pub short_window_days: i64,
    pub long_window_days: i64,
    pub trend_window_days: i64,
    pub min_window_points: usize,
    pub strength_improvement_pct: f64,
    pub stale_log_days: i64,
    pub min_streak_days: usize,
    pub max_exercise_achievements: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            aggregation_mode: AggregationMode::default(),
            correlation: CorrelationConfig::default(),
            short_window_days: SHORT_WINDOW_DAYS,
            long_window_days: LONG_WINDOW_DAYS,
            trend_window_days: TREND_WINDOW_DAYS,
            min_window_points: MIN_WINDOW_POINTS,
            strength_improvement_pct: STRENGTH_IMPROVEMENT_PCT,
            stale_log_days: STALE_LOG_DAYS,
            min_streak_days: MIN_STREAK_DAYS,
            max_exercise_achievements: MAX_EXERCISE_ACHIEVEMENTS,
        }
    }
}

impl InsightsConfig {
    /// Default thresholds with a specific aggregation mode.
    pub fn with_mode(mode: AggregationMode) -> Self {
        Self {
            aggregation_mode: mode,
            ..Self::default()
        }
    }
}
