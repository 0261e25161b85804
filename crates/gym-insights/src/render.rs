//! Plain-text rendering of the three views.

use std::fmt::Write;

use insights_core::formatting::{format_days_ago, format_number, format_weight};
use insights_data::analysis::InsightsReport;

use crate::views::{DashboardReport, ExerciseReport};

// ── Insights ──────────────────────────────────────────────────────────────────

pub fn render_insights(report: &InsightsReport) -> String {
    let view = &report.view;
    let mut out = String::new();

    match report.metadata.as_of {
        Some(as_of) => {
            let _ = writeln!(out, "Insights for {} (as of {})", report.athlete, as_of);
        }
        None => {
            let _ = writeln!(out, "Insights for {}", report.athlete);
        }
    }

    let facts = view
        .facts
        .iter()
        .map(|f| format!("{}: {} ({})", f.label, f.value, f.detail));
    section(&mut out, "Facts", facts);

    let correlations = view.correlations.iter().map(|c| {
        let value = c
            .value
            .map(|r| format_number(r, 2))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "{}: {} ({}, {} shared days)",
            c.label, value, c.interpretation, c.overlap_days
        )
    });
    section(&mut out, "Correlations", correlations);

    section(&mut out, "Improvements", view.improvements.iter().cloned());

    let achievements = view
        .achievements
        .iter()
        .map(|a| format!("{}  {} ({})", a.period, a.title, a.detail));
    section(&mut out, "Achievements", achievements);

    section(&mut out, "Suggestions", view.suggestions.iter().cloned());

    out
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub fn render_dashboard(report: &DashboardReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Welcome back, {}", report.athlete);
    let _ = writeln!(out, "Workouts logged:   {}", summary.workout_count);
    let _ = writeln!(out, "Bodyweight logged: {}", summary.bodyweight_count);

    if let Some(workout) = &summary.latest_workout {
        let _ = writeln!(
            out,
            "Latest workout:    {} ({})",
            workout.session_date,
            workout.split.as_deref().unwrap_or("no split")
        );
    }
    if let Some(bw) = &summary.latest_bodyweight {
        let _ = writeln!(
            out,
            "Latest bodyweight: {} {} ({})",
            format_weight(bw.weight_input),
            bw.unit_input,
            bw.log_date
        );
    }

    let splits = report.last_session_by_split.iter().map(|(split, info)| {
        format!(
            "{}: {} ({})",
            split,
            info.session_date,
            format_days_ago(info.days_ago)
        )
    });
    section(&mut out, "Last session by split", splits);

    let recent = report
        .recent_sessions
        .iter()
        .map(|s| format!("{}  {}", s.session_date, s.split.as_deref().unwrap_or("-")));
    section(&mut out, "Recent sessions", recent);

    out
}

// ── Exercise ──────────────────────────────────────────────────────────────────

pub fn render_exercise(report: &ExerciseReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.exercise);

    if let Some(previous) = &report.previous {
        let _ = writeln!(
            out,
            "Previous: {} ({})",
            previous.summary, previous.session_date
        );
    }

    let history = report.history.iter().map(|s| {
        format!(
            "{}  e1RM {} kg  [{}]",
            s.date,
            format_number(s.session_strength, 1),
            s.set_summary
        )
    });
    section(&mut out, "History", history);

    out
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let _ = writeln!(out, "\n{}", title);
    let mut empty = true;
    for line in lines {
        empty = false;
        let _ = writeln!(out, "  - {}", line);
    }
    if empty {
        let _ = writeln!(out, "  (none)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insights_core::config::InsightsConfig;
    use insights_data::analysis::analyze_insights;
    use insights_data::reader::LogStore;

    use crate::views::build_dashboard;

    #[test]
    fn test_render_empty_insights() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let report = analyze_insights(&LogStore::default(), &InsightsConfig::default(), Some(date));
        let text = render_insights(&report);

        assert!(text.starts_with("Insights for Athlete (as of 2024-05-01)"));
        assert!(text.contains("\nFacts\n  (none)\n"));
        assert!(text.contains("Bodyweight vs Calories: n/a"));
        assert!(text.contains("  - Log your bodyweight"));
    }

    #[test]
    fn test_render_empty_dashboard() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let text = render_dashboard(&build_dashboard(&LogStore::default(), date));
        assert!(text.contains("Welcome back, Athlete"));
        assert!(text.contains("Workouts logged:   0"));
        assert!(!text.contains("Latest workout"));
        assert!(text.contains("Recent sessions\n  (none)"));
    }
}
