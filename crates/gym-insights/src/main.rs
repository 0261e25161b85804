mod bootstrap;
mod render;
mod views;

use anyhow::{bail, Context, Result};
use insights_core::config::InsightsConfig;
use insights_core::settings::Settings;
use insights_data::analysis::analyze_insights;
use insights_runtime::data_manager::{DataManager, FetchPolicy};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("gym-insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Mode: {}, Timezone: {}",
        settings.view,
        settings.mode,
        settings.timezone
    );

    let Some(data_path) = bootstrap::discover_data_path(settings.data_dir.as_deref()) else {
        bail!("no log store found; pass --data-dir or set GYM_INSIGHTS_DATA_DIR");
    };

    let policy: FetchPolicy = settings.fetch_policy.parse()?;
    let manager = DataManager::new(&data_path, policy);
    let outcome = manager
        .load()
        .await
        .with_context(|| format!("loading log store from {}", data_path.display()))?;

    for degraded in &outcome.degraded {
        tracing::warn!(
            "{} could not be loaded and is treated as empty: {}",
            degraded.table,
            degraded.reason
        );
    }

    let store = &outcome.store;
    let today = settings.reference_date();
    let text = settings.format == "text";

    let output = match settings.view.as_str() {
        "insights" => {
            let config = InsightsConfig::with_mode(settings.aggregation_mode()?);
            let report = analyze_insights(store, &config, Some(today));
            if text {
                render::render_insights(&report)
            } else {
                to_json(&report)?
            }
        }

        "dashboard" => {
            let report = views::build_dashboard(store, today);
            if text {
                render::render_dashboard(&report)
            } else {
                to_json(&report)?
            }
        }

        "exercise" => {
            let Some(exercise) = settings.exercise.as_deref() else {
                bail!("the exercise view needs --exercise NAME");
            };
            let report = views::build_exercise(store, exercise, today);
            if text {
                render::render_exercise(&report)
            } else {
                to_json(&report)?
            }
        }

        unknown => bail!("unknown view: {}", unknown),
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
