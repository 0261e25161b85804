//! Data manager for the log store.
//!
//! Loads every table of the log store concurrently on tokio's blocking pool
//! and applies a [`FetchPolicy`] when some of them fail. [`DataManager::load`]
//! makes up to three attempts with back-off before giving up.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use insights_core::error::{InsightsError, Result};
use insights_data::reader::{discover_tables, load_table, LogStore, Table, TableRows};
use tokio::task::JoinHandle;

/// Fetch attempts before the last error is returned.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── FetchPolicy ───────────────────────────────────────────────────────────────

/// What to do when some tables fail to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Fail the whole load.
    Abort,
    /// Treat failed tables as empty and record them in [`LoadOutcome::degraded`].
    #[default]
    Degrade,
}

impl FetchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchPolicy::Abort => "abort",
            FetchPolicy::Degrade => "degrade",
        }
    }
}

impl FromStr for FetchPolicy {
    type Err = InsightsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "abort" => Ok(FetchPolicy::Abort),
            "degrade" => Ok(FetchPolicy::Degrade),
            other => Err(InsightsError::Config(format!(
                "unknown fetch policy \"{}\" (expected abort or degrade)",
                other
            ))),
        }
    }
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── LoadOutcome ───────────────────────────────────────────────────────────────

/// A table that was replaced by an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedTable {
    pub table: Table,
    pub reason: String,
}

/// A materialized log store plus the tables that could not be loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    pub store: LogStore,
    pub degraded: Vec<DegradedTable>,
}

impl LoadOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Load every table under `data_path` concurrently.
///
/// Discovery runs first; then each table is read by its own blocking task and
/// the tasks are awaited together. Nothing is returned until every table is
/// materialized.
pub async fn load_store(data_path: &Path, policy: FetchPolicy) -> Result<LoadOutcome> {
    let path = data_path.to_path_buf();
    let tables = tokio::task::spawn_blocking(move || discover_tables(&path))
        .await
        .map_err(|e| {
            InsightsError::Other(anyhow::anyhow!("table discovery task failed: {}", e))
        })??;

    let handles: Vec<(Table, JoinHandle<Result<TableRows>>)> = Table::ALL
        .into_iter()
        .map(|table| {
            let files = tables.get(&table).cloned().unwrap_or_default();
            let handle = tokio::task::spawn_blocking(move || load_table(table, &files));
            (table, handle)
        })
        .collect();

    let mut outcome = LoadOutcome::default();
    for (table, handle) in handles {
        let reason = match handle.await {
            Ok(Ok(rows)) => {
                tracing::debug!(table = table.name(), rows = rows.len(), "table loaded");
                outcome.store.apply(rows);
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };

        match policy {
            FetchPolicy::Abort => {
                return Err(InsightsError::TableLoad {
                    table: table.name().to_string(),
                    reason,
                });
            }
            FetchPolicy::Degrade => {
                tracing::warn!(
                    table = table.name(),
                    %reason,
                    "table load failed; treating as empty"
                );
                outcome.store.apply(TableRows::empty(table));
                outcome.degraded.push(DegradedTable { table, reason });
            }
        }
    }

    outcome.store.sort();
    Ok(outcome)
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Retrying wrapper around [`load_store`].
///
/// # Example
/// ```no_run
/// use insights_runtime::data_manager::{DataManager, FetchPolicy};
///
/// # async fn run() -> insights_core::Result<()> {
/// let mgr = DataManager::new("/data/export", FetchPolicy::Degrade);
/// let outcome = mgr.load().await?;
/// println!("sessions: {}", outcome.store.sessions.len());
/// # Ok(())
/// # }
/// ```
pub struct DataManager {
    /// Root directory of the log store.
    data_path: PathBuf,
    policy: FetchPolicy,
}

impl DataManager {
    pub fn new(data_path: impl Into<PathBuf>, policy: FetchPolicy) -> Self {
        Self {
            data_path: data_path.into(),
            policy,
        }
    }

    /// Load the store, retrying failed attempts.
    ///
    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    /// The error of the final attempt is returned when all of them fail.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let mut last_err = None;

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            }

            match load_store(&self.data_path, self.policy).await {
                Ok(outcome) => {
                    tracing::debug!(
                        sessions = outcome.store.sessions.len(),
                        sets = outcome.store.sets.len(),
                        degraded = outcome.degraded.len(),
                        "log store loaded"
                    );
                    return Ok(outcome);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            InsightsError::Config("no fetch attempts were made".to_string())
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_store(dir: &Path) {
        fs::write(
            dir.join("bodyweight_logs.jsonl"),
            "{\"log_date\":\"2024-01-02\",\"weight_input\":180}\n\
             {\"log_date\":\"2024-01-01\",\"weight_input\":181}\n",
        )
        .unwrap();
        fs::write(
            dir.join("workout_sessions.jsonl"),
            "{\"id\":1,\"session_date\":\"2024-01-01\",\"split\":\"legs\"}\n",
        )
        .unwrap();
    }

    /// A calories file that is not valid UTF-8 cannot be read line by line.
    fn write_unreadable_calories(dir: &Path) {
        fs::write(dir.join("calories_logs.jsonl"), [0xff, 0xfe, 0xfd, b'\n']).unwrap();
    }

    #[test]
    fn test_fetch_policy_from_str() {
        assert_eq!("abort".parse::<FetchPolicy>().unwrap(), FetchPolicy::Abort);
        assert_eq!(" Degrade ".parse::<FetchPolicy>().unwrap(), FetchPolicy::Degrade);
        assert!("retry".parse::<FetchPolicy>().is_err());
        assert_eq!(FetchPolicy::default().to_string(), "degrade");
    }

    #[tokio::test]
    async fn test_load_store_reads_and_sorts_tables() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());

        let outcome = load_store(dir.path(), FetchPolicy::Abort).await.unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.store.bodyweight.len(), 2);
        assert_eq!(outcome.store.bodyweight[0].weight_input, 181.0);
        assert_eq!(outcome.store.sessions[0].id, "1");
        assert!(outcome.store.calories.is_empty());
    }

    #[tokio::test]
    async fn test_degrade_policy_keeps_healthy_tables() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        write_unreadable_calories(dir.path());

        let outcome = load_store(dir.path(), FetchPolicy::Degrade).await.unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.degraded.len(), 1);
        assert_eq!(outcome.degraded[0].table, Table::CaloriesLogs);
        assert!(outcome.store.calories.is_empty());
        assert_eq!(outcome.store.bodyweight.len(), 2);
    }

    #[tokio::test]
    async fn test_abort_policy_fails_on_any_table() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        write_unreadable_calories(dir.path());

        let err = load_store(dir.path(), FetchPolicy::Abort).await.unwrap_err();
        match err {
            InsightsError::TableLoad { table, .. } => assert_eq!(table, "calories_logs"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_directory_fails_after_all_attempts() {
        let dir = TempDir::new().unwrap();
        let mgr = DataManager::new(dir.path().join("missing"), FetchPolicy::Degrade);

        let started = std::time::Instant::now();
        let err = mgr.load().await.unwrap_err();
        assert!(matches!(err, InsightsError::DataPathNotFound(_)));
        // 0 + 100 + 200 ms of back-off.
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_retry_picks_up_store_that_appears_later() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("export");
        let mgr = DataManager::new(&root, FetchPolicy::Abort);

        let staging = dir.path().join("staging");
        fs::create_dir(&staging).unwrap();
        write_store(&staging);

        let target = root.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            fs::rename(&staging, &target).unwrap();
        });

        let outcome = mgr.load().await.unwrap();
        writer.await.unwrap();
        assert_eq!(outcome.store.bodyweight.len(), 2);
        assert_eq!(outcome.store.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_load_applies_policy() {
        let dir = TempDir::new().unwrap();
        write_store(dir.path());
        write_unreadable_calories(dir.path());

        let degraded = DataManager::new(dir.path(), FetchPolicy::Degrade)
            .load()
            .await
            .unwrap();
        assert_eq!(degraded.degraded[0].table, Table::CaloriesLogs);

        let aborted = DataManager::new(dir.path(), FetchPolicy::Abort).load().await;
        assert!(matches!(aborted, Err(InsightsError::TableLoad { .. })));
    }
}
