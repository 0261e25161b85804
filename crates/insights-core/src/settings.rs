use chrono::NaiveDate;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::AggregationMode;
use crate::error::Result;
use crate::time_utils::{resolve_timezone, today_in_timezone, validate_timezone};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Training insights from your bodyweight, calorie and workout logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gym-insights",
    about = "Training insights from your bodyweight, calorie and workout logs",
    version
)]
pub struct Settings {
    /// What to show
    #[arg(long, default_value = "insights", value_parser = ["insights", "dashboard", "exercise"])]
    pub view: String,

    /// Directory holding the exported log tables (*.jsonl)
    #[arg(long, env = "GYM_INSIGHTS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// How exercise scores on the same day combine into daily strength
    #[arg(long, default_value = "sum", value_parser = ["sum", "max", "average"])]
    pub mode: String,

    /// Exercise name for the exercise view
    #[arg(long)]
    pub exercise: Option<String>,

    /// Reference date (YYYY-MM-DD); defaults to today in --timezone
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<NaiveDate>,

    /// IANA timezone that decides what "today" is, or "auto"
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Output format
    #[arg(long, default_value = "json", value_parser = ["json", "text"])]
    pub format: String,

    /// What to do when one of the log tables fails to load
    #[arg(long, default_value = "degrade", value_parser = ["degrade", "abort"])]
    pub fetch_policy: String,

    /// Log verbosity
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for --log-level DEBUG
    #[arg(long)]
    pub debug: bool,

    /// Forget remembered preferences before running
    #[arg(long)]
    pub clear: bool,
}

fn parse_as_of(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

// ── Saved preferences ──────────────────────────────────────────────────────────

/// Preferences remembered between runs in `~/.gym-insights/last_used.json`.
///
/// `exercise` and `as_of` describe a single request and are never stored.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct SavedPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl SavedPreferences {
    pub fn default_path() -> PathBuf {
        Self::path_under(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn path_under(home: &Path) -> PathBuf {
        home.join(".gym-insights").join("last_used.json")
    }

    /// Missing or unreadable files yield empty preferences.
    pub fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Write through a sibling temp file and rename it into place.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, body)?;
        std::fs::rename(&staging, path)
    }

    pub fn forget(path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl From<&Settings> for SavedPreferences {
    fn from(s: &Settings) -> Self {
        SavedPreferences {
            view: Some(s.view.clone()),
            mode: Some(s.mode.clone()),
            timezone: Some(s.timezone.clone()),
            format: Some(s.format.clone()),
            data_dir: s.data_dir.clone(),
        }
    }
}

// ── Resolution ─────────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and fill the gaps from saved preferences.
    pub fn load_with_last_used() -> Self {
        Self::resolve(std::env::args_os().collect(), &SavedPreferences::default_path())
    }

    /// Flags typed on the command line beat saved preferences, which beat
    /// defaults. The resolved choice is saved again unless `--clear` was given,
    /// in which case the saved file is removed and nothing is written.
    pub fn resolve(args: Vec<OsString>, prefs_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = SavedPreferences::forget(prefs_path) {
                tracing::warn!(error = %e, "could not clear saved preferences");
            }
            return settings.finish();
        }

        let saved = SavedPreferences::read(prefs_path);
        keep_saved(&matches, "view", &mut settings.view, saved.view);
        keep_saved(&matches, "mode", &mut settings.mode, saved.mode);
        keep_saved(&matches, "timezone", &mut settings.timezone, saved.timezone);
        keep_saved(&matches, "format", &mut settings.format, saved.format);
        if settings.data_dir.is_none() {
            settings.data_dir = saved.data_dir;
        }

        let settings = settings.finish();
        if let Err(e) = SavedPreferences::from(&settings).write(prefs_path) {
            tracing::warn!(error = %e, "could not save preferences");
        }
        settings
    }

    /// Resolve `auto`, replace an unknown zone with UTC, and apply `--debug`.
    fn finish(mut self) -> Self {
        let zone = resolve_timezone(&self.timezone);
        self.timezone = if validate_timezone(&zone) {
            zone
        } else {
            tracing::warn!(timezone = %zone, "unknown timezone, using UTC");
            "UTC".to_string()
        };
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    pub fn aggregation_mode(&self) -> Result<AggregationMode> {
        self.mode.parse()
    }

    /// `--as-of` if given, else today's date in the configured timezone.
    pub fn reference_date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| today_in_timezone(&self.timezone))
    }
}

/// Replace `slot` with the saved value unless `id` was typed on the command
/// line. Defaults and environment variables do not count as typed.
fn keep_saved(matches: &ArgMatches, id: &str, slot: &mut String, saved: Option<String>) {
    if matches.value_source(id) == Some(ValueSource::CommandLine) {
        return;
    }
    if let Some(value) = saved {
        *slot = value;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
