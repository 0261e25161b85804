use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::time_utils::parse_date;
use crate::units::WeightUnit;

// ── Engine types ──────────────────────────────────────────────────────────────

/// One logged set of a weighted exercise, joined with its session date and
/// exercise metadata. `weight` is in kilograms.
///
/// Reps and weight are signed/unchecked so malformed rows can reach the
/// scorer and be excluded there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub session_date: NaiveDate,
    pub exercise_name: String,
    #[serde(default)]
    pub muscle_group: Option<String>,
    pub set_number: u32,
    pub reps: i32,
    pub weight: f64,
}

/// Strength score for one exercise on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStrength {
    pub date: NaiveDate,
    pub exercise_name: String,
    pub muscle_group: Option<String>,
    /// Best Epley one-rep-max estimate among the session's valid sets.
    pub session_strength: f64,
    /// Contributing sets, e.g. `"5×135, 5×140"`.
    pub set_summary: String,
}

/// A single reading of any metric. `value: None` means nothing was logged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl MetricPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// Outcome of correlating two dated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub label: String,
    /// Pearson r in `[-1, 1]`, or `None` when it cannot be trusted.
    pub value: Option<f64>,
    pub interpretation: String,
    pub overlap_days: usize,
}

/// A label/value/detail summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
    pub detail: String,
}

/// A discrete milestone found in the full history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Date or date range the milestone covers.
    pub period: String,
    pub title: String,
    pub detail: String,
}

/// The read-only payload handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsView {
    pub facts: Vec<Fact>,
    pub correlations: Vec<Correlation>,
    pub improvements: Vec<String>,
    pub achievements: Vec<Achievement>,
    pub suggestions: Vec<String>,
}

/// Everything the view builder consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightsInput {
    pub bodyweight: Vec<MetricPoint>,
    pub calories: Vec<MetricPoint>,
    pub strength: Vec<MetricPoint>,
    /// Per-exercise scores behind `strength`; may be empty.
    pub sessions: Vec<SessionStrength>,
    /// Reference "today". Defaults to the latest date in any input.
    pub as_of: Option<NaiveDate>,
}

// ── Log-store rows ────────────────────────────────────────────────────────────

/// One row of `bodyweight_logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyweightLog {
    #[serde(deserialize_with = "deserialize_date")]
    pub log_date: NaiveDate,
    pub weight_input: f64,
    #[serde(default)]
    pub unit_input: WeightUnit,
    /// Normalized weight stored alongside the raw input by newer clients.
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// One row of `calories_logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriesLog {
    #[serde(deserialize_with = "deserialize_date")]
    pub log_date: NaiveDate,
    #[serde(default)]
    pub pre_workout_kcal: Option<f64>,
    #[serde(default)]
    pub post_workout_kcal: Option<f64>,
}

/// One row of `workout_sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub session_date: NaiveDate,
    #[serde(default)]
    pub split: Option<String>,
}

/// One row of `workout_sets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    #[serde(deserialize_with = "deserialize_id")]
    pub session_id: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub exercise_id: String,
    pub set_number: u32,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub weight_input: Option<f64>,
    #[serde(default)]
    pub unit_input: Option<WeightUnit>,
    /// Normalized weight the logging form stores next to the raw input.
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
}

/// How an exercise is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    #[default]
    WeightedReps,
    Duration,
}

/// One row of `exercises`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub metric_type: MetricType,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One row of `profiles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Profile {
    /// Name used to greet the user: first name, else email, else `"Athlete"`.
    pub fn display_name(&self) -> String {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Athlete")
            .to_string()
    }
}

fn default_true() -> bool {
    true
}

/// Row dates may be plain dates or full timestamps.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Accept row ids written either as strings (uuids) or as integers.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_correlation_serializes_camel_case() {
        let corr = Correlation {
            label: "Bodyweight vs Strength".to_string(),
            value: None,
            interpretation: "Not enough overlapping days (3 of 5 needed)".to_string(),
            overlap_days: 3,
        };
        let value = serde_json::to_value(&corr).unwrap();
        assert_eq!(value["overlapDays"], json!(3));
        assert!(value["value"].is_null());
    }

    #[test]
    fn test_metric_point_date_format() {
        let point = MetricPoint::new(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(), 179.0);
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value["date"], json!("2024-01-08"));
        assert_eq!(value["value"], json!(179.0));
    }

    #[test]
    fn test_workout_set_accepts_numeric_ids() {
        let set: WorkoutSet = serde_json::from_value(json!({
            "session_id": 12,
            "exercise_id": "ex-bench",
            "set_number": 1,
            "reps": 5,
            "weight_input": 135,
            "unit_input": "lb"
        }))
        .unwrap();
        assert_eq!(set.session_id, "12");
        assert_eq!(set.exercise_id, "ex-bench");
        assert_eq!(set.unit_input, Some(WeightUnit::Lb));
        assert!(set.duration_seconds.is_none());
    }

    #[test]
    fn test_row_dates_accept_timestamps() {
        let session: WorkoutSession = serde_json::from_value(json!({
            "id": "s1",
            "session_date": "2024-02-01T18:30:00Z"
        }))
        .unwrap();
        assert_eq!(session.session_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let log: CaloriesLog = serde_json::from_value(json!({
            "log_date": "2024-02-03 07:00:00",
            "pre_workout_kcal": 400
        }))
        .unwrap();
        assert_eq!(log.log_date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
    }

    #[test]
    fn test_row_date_rejects_garbage() {
        let result: std::result::Result<BodyweightLog, _> = serde_json::from_value(json!({
            "log_date": "02/01/2024",
            "weight_input": 180
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid date format"), "{err}");
    }

    #[test]
    fn test_exercise_defaults() {
        let ex: Exercise = serde_json::from_value(json!({
            "id": "ex-plank",
            "name": "Plank",
            "metric_type": "DURATION"
        }))
        .unwrap();
        assert_eq!(ex.metric_type, MetricType::Duration);
        assert!(ex.is_active);
        assert!(ex.muscle_group.is_none());
    }

    #[test]
    fn test_bodyweight_log_unit_defaults_to_lb() {
        let log: BodyweightLog = serde_json::from_value(json!({
            "log_date": "2024-01-01",
            "weight_input": 180
        }))
        .unwrap();
        assert_eq!(log.unit_input, WeightUnit::Lb);
        assert!(log.weight_kg.is_none());
    }

    #[test]
    fn test_profile_display_name_fallbacks() {
        let named = Profile {
            first_name: Some("Sam".to_string()),
            email: Some("sam@example.com".to_string()),
        };
        assert_eq!(named.display_name(), "Sam");

        let email_only = Profile {
            first_name: Some("  ".to_string()),
            email: Some("sam@example.com".to_string()),
        };
        assert_eq!(email_only.display_name(), "sam@example.com");

        assert_eq!(Profile::default().display_name(), "Athlete");
    }
}
