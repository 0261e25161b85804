//! Fixed thresholds and window lengths used by the insights engine.
//!
//! These are deploy-time configuration: [`crate::config::InsightsConfig`]
//! defaults to them and nothing user-facing changes them.

// ── Correlation ───────────────────────────────────────────────────────────────

/// Minimum number of dates with a value in both series before a Pearson
/// coefficient is reported.
pub const MIN_OVERLAP_DAYS: usize = 5;

/// `|r|` at or above this is described as a strong relationship.
pub const STRONG_CORRELATION: f64 = 0.6;

/// `|r|` at or above this (and below strong) is a moderate relationship.
pub const MODERATE_CORRELATION: f64 = 0.3;

// ── Windows ───────────────────────────────────────────────────────────────────

/// Short trailing window for averages and deltas in facts.
pub const SHORT_WINDOW_DAYS: i64 = 7;

/// Long trailing window for deltas in facts.
pub const LONG_WINDOW_DAYS: i64 = 30;

/// Length of the recent window compared against the one preceding it.
pub const TREND_WINDOW_DAYS: i64 = 14;

/// Minimum points in each trend window before comparing averages.
pub const MIN_WINDOW_POINTS: usize = 2;

/// Percent rise in average strength that counts as an improvement (and the
/// percent fall that triggers a recovery suggestion).
pub const STRENGTH_IMPROVEMENT_PCT: f64 = 2.0;

/// A series with no entry in this many days triggers a logging suggestion.
pub const STALE_LOG_DAYS: i64 = 7;

// ── Achievements ──────────────────────────────────────────────────────────────

/// Shortest consecutive-day logging run reported as an achievement.
pub const MIN_STREAK_DAYS: usize = 3;

/// Cap on per-exercise personal-best achievements.
pub const MAX_EXERCISE_ACHIEVEMENTS: usize = 5;

// ── Scoring / units ───────────────────────────────────────────────────────────

/// Divisor in the Epley estimate `weight × (1 + reps / 30)`.
pub const EPLEY_REP_DIVISOR: f64 = 30.0;

/// Exact kilograms per avoirdupois pound.
pub const LB_TO_KG: f64 = 0.453_592_37;

/// Number of recent sessions listed for a split.
pub const DEFAULT_RECENT_SESSIONS: usize = 5;
