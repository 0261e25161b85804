use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.gym-insights/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.gym-insights/`
/// - `~/.gym-insights/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(".gym-insights");
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map Python-style level names onto `tracing` filter directives.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive,
/// falling back to `"info"` if it is not recognised. Output goes to stderr,
/// or is appended to `log_file` when one is given.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = log_file.is_none().then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the exported log store.
///
/// An explicit `--data-dir` (or `GYM_INSIGHTS_DATA_DIR`) wins. Otherwise the
/// following paths are checked in order and the first that exists is used:
/// 1. `~/.gym-insights/data/`
/// 2. `~/.config/gym-insights/data/`
pub fn discover_data_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let home = dirs::home_dir()?;
    discover_in(&home)
}

fn discover_in(home: &Path) -> Option<PathBuf> {
    let candidates = [
        home.join(".gym-insights").join("data"),
        home.join(".config").join("gym-insights").join("data"),
    ];
    candidates.into_iter().find(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories_in(tmp.path()).expect("ensure_directories should succeed");

        let app_dir = tmp.path().join(".gym-insights");
        assert!(app_dir.is_dir(), ".gym-insights dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_level_directive_maps_python_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("trace"), "trace");
    }

    #[test]
    fn test_explicit_data_path_wins() {
        let explicit = Path::new("/srv/export");
        assert_eq!(
            discover_data_path(Some(explicit)),
            Some(PathBuf::from("/srv/export"))
        );
    }

    #[test]
    fn test_discover_returns_none_when_absent() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(discover_in(tmp.path()).is_none());
    }

    #[test]
    fn test_discover_prefers_app_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let primary = tmp.path().join(".gym-insights").join("data");
        let secondary = tmp.path().join(".config").join("gym-insights").join("data");
        std::fs::create_dir_all(&primary).unwrap();
        std::fs::create_dir_all(&secondary).unwrap();

        assert_eq!(discover_in(tmp.path()), Some(primary));
    }

    #[test]
    fn test_discover_finds_config_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let secondary = tmp.path().join(".config").join("gym-insights").join("data");
        std::fs::create_dir_all(&secondary).unwrap();

        assert_eq!(discover_in(tmp.path()), Some(secondary));
    }
}
