use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{InsightsError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve `"auto"` to the system zone; anything else is returned unchanged.
pub fn resolve_timezone(tz_name: &str) -> String {
    if tz_name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        tz_name.to_string()
    }
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

// ── Calendar dates ────────────────────────────────────────────────────────────

/// The calendar date of `now` in the named timezone.
///
/// Unknown zones fall back to UTC with a warning.
pub fn date_in_timezone(now: DateTime<Utc>, tz_name: &str) -> NaiveDate {
    let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", tz_name);
        Tz::UTC
    });
    now.with_timezone(&tz).date_naive()
}

/// Today's calendar date in the named timezone.
pub fn today_in_timezone(tz_name: &str) -> NaiveDate {
    date_in_timezone(Utc::now(), tz_name)
}

/// Parse a log date.
///
/// Accepts plain `YYYY-MM-DD`, RFC 3339 timestamps (the date part in UTC), and
/// naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(InsightsError::DateParse(s.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    const FMTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for fmt in FMTS {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.date());
        }
    }

    Err(InsightsError::DateParse(s.to_string()))
}

/// Whole days from `date` to `today` (positive when `date` is in the past).
pub fn days_ago(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days()
}
