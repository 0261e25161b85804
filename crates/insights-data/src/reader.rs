//! Log-store discovery and loading.
//!
//! The log store is a directory of JSONL exports, one table per file
//! (`bodyweight_logs.jsonl`) or per directory of files
//! (`workout_sets/2024-01.jsonl`). Every row already belongs to one user.

use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use insights_core::error::{InsightsError, Result};
use insights_core::models::{
    BodyweightLog, CaloriesLog, Exercise, Profile, WorkoutSession, WorkoutSet,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

// ── Table ─────────────────────────────────────────────────────────────────────

/// The tables a log store may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    BodyweightLogs,
    CaloriesLogs,
    WorkoutSessions,
    WorkoutSets,
    Exercises,
    Profiles,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::BodyweightLogs,
        Table::CaloriesLogs,
        Table::WorkoutSessions,
        Table::WorkoutSets,
        Table::Exercises,
        Table::Profiles,
    ];

    /// Export name of the table, also used as file stem / directory name.
    pub fn name(&self) -> &'static str {
        match self {
            Table::BodyweightLogs => "bodyweight_logs",
            Table::CaloriesLogs => "calories_logs",
            Table::WorkoutSessions => "workout_sessions",
            Table::WorkoutSets => "workout_sets",
            Table::Exercises => "exercises",
            Table::Profiles => "profiles",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── LogStore ──────────────────────────────────────────────────────────────────

/// Every raw table for one user, fully materialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogStore {
    pub bodyweight: Vec<BodyweightLog>,
    pub calories: Vec<CaloriesLog>,
    pub sessions: Vec<WorkoutSession>,
    pub sets: Vec<WorkoutSet>,
    pub exercises: Vec<Exercise>,
    pub profile: Option<Profile>,
}

/// Rows of a single table, as produced by [`load_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum TableRows {
    Bodyweight(Vec<BodyweightLog>),
    Calories(Vec<CaloriesLog>),
    Sessions(Vec<WorkoutSession>),
    Sets(Vec<WorkoutSet>),
    Exercises(Vec<Exercise>),
    Profiles(Vec<Profile>),
}

impl TableRows {
    /// No rows for `table`.
    pub fn empty(table: Table) -> Self {
        match table {
            Table::BodyweightLogs => TableRows::Bodyweight(Vec::new()),
            Table::CaloriesLogs => TableRows::Calories(Vec::new()),
            Table::WorkoutSessions => TableRows::Sessions(Vec::new()),
            Table::WorkoutSets => TableRows::Sets(Vec::new()),
            Table::Exercises => TableRows::Exercises(Vec::new()),
            Table::Profiles => TableRows::Profiles(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableRows::Bodyweight(r) => r.len(),
            TableRows::Calories(r) => r.len(),
            TableRows::Sessions(r) => r.len(),
            TableRows::Sets(r) => r.len(),
            TableRows::Exercises(r) => r.len(),
            TableRows::Profiles(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogStore {
    /// Store the rows of one table, replacing what was there.
    pub fn apply(&mut self, rows: TableRows) {
        match rows {
            TableRows::Bodyweight(r) => self.bodyweight = r,
            TableRows::Calories(r) => self.calories = r,
            TableRows::Sessions(r) => self.sessions = r,
            TableRows::Sets(r) => self.sets = r,
            TableRows::Exercises(r) => self.exercises = r,
            TableRows::Profiles(r) => self.profile = r.into_iter().next(),
        }
    }

    /// Name used to greet the user: the profile's display name, else `"Athlete"`.
    pub fn athlete(&self) -> String {
        self.profile
            .as_ref()
            .map(Profile::display_name)
            .unwrap_or_else(|| "Athlete".to_string())
    }

    /// Put every dated table in ascending date order.
    pub fn sort(&mut self) {
        self.bodyweight.sort_by_key(|r| r.log_date);
        self.calories.sort_by_key(|r| r.log_date);
        self.sessions.sort_by_key(|r| r.session_date);
        self.exercises
            .sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.jsonl` files recursively under `data_path`, sorted by path.
pub fn find_jsonl_files(data_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "jsonl")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Decide which table a file belongs to: its stem, else its parent
/// directory's name.
pub fn table_for_path(path: &Path) -> Option<Table> {
    let stem = path.file_stem().and_then(|s| s.to_str());
    if let Some(table) = stem.and_then(Table::from_name) {
        return Some(table);
    }
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .and_then(Table::from_name)
}

/// Group the JSONL files under `data_path` by table.
///
/// Errors with [`InsightsError::DataPathNotFound`] when the directory does
/// not exist. Files that belong to no table are skipped.
pub fn discover_tables(data_path: &Path) -> Result<BTreeMap<Table, Vec<PathBuf>>> {
    if !data_path.is_dir() {
        return Err(InsightsError::DataPathNotFound(data_path.to_path_buf()));
    }

    let mut tables: BTreeMap<Table, Vec<PathBuf>> = BTreeMap::new();
    for file in find_jsonl_files(data_path) {
        match table_for_path(&file) {
            Some(table) => tables.entry(table).or_default().push(file),
            None => debug!("Skipping unrecognised file {}", file.display()),
        }
    }
    Ok(tables)
}

/// Read every row of `table` from `files`.
pub fn load_table(table: Table, files: &[PathBuf]) -> Result<TableRows> {
    Ok(match table {
        Table::BodyweightLogs => TableRows::Bodyweight(read_rows(files)?),
        Table::CaloriesLogs => TableRows::Calories(read_rows(files)?),
        Table::WorkoutSessions => TableRows::Sessions(read_rows(files)?),
        Table::WorkoutSets => TableRows::Sets(read_rows(files)?),
        Table::Exercises => TableRows::Exercises(read_rows(files)?),
        Table::Profiles => TableRows::Profiles(read_rows(files)?),
    })
}

/// Load the complete log store under `data_path`, sequentially.
///
/// Missing tables are empty. Any file that cannot be read fails the whole
/// load; callers wanting partial results use [`discover_tables`] and
/// [`load_table`] directly.
pub fn read_log_store(data_path: &Path) -> Result<LogStore> {
    let tables = discover_tables(data_path)?;
    let mut store = LogStore::default();

    for (table, files) in &tables {
        let rows = load_table(*table, files)?;
        debug!("Loaded {} rows from {}", rows.len(), table);
        store.apply(rows);
    }

    store.sort();
    Ok(store)
}

/// Parse every line of `files` as `T`.
///
/// Blank lines are ignored; lines that fail to parse are skipped with a
/// warning. A file that cannot be opened is an error.
pub fn read_rows<T: DeserializeOwned>(files: &[PathBuf]) -> Result<Vec<T>> {
    let mut rows = Vec::new();

    for file_path in files {
        let file = std::fs::File::open(file_path).map_err(|source| InsightsError::FileRead {
            path: file_path.clone(),
            source,
        })?;

        let reader = std::io::BufReader::new(file);
        let mut skipped = 0usize;

        for (line_no, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|source| InsightsError::FileRead {
                path: file_path.clone(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<T>(trimmed) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    skipped += 1;
                    debug!("{}:{}: {}", file_path.display(), line_no + 1, e);
                }
            }
        }

        if skipped > 0 {
            warn!(
                "Skipped {} malformed line(s) in {}",
                skipped,
                file_path.display()
            );
        }
    }

    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
