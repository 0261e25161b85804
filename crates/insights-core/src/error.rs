use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the insights crates.
///
/// The engine itself (scoring, aggregation, view building) never returns
/// these; they come from the log-store boundary and configuration parsing.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A date string did not match any recognised format.
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// A weight unit string is not `kg` or `lb`.
    #[error("Invalid weight unit: {0}")]
    InvalidUnit(String),

    /// An aggregation mode string is not one of `sum`, `max`, `average`.
    #[error("Invalid aggregation mode: {0}")]
    InvalidMode(String),

    /// The expected log-store directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A log table could not be loaded by the runtime.
    #[error("Failed to load table {table}: {reason}")]
    TableLoad { table: String, reason: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = InsightsError::FileRead {
            path: PathBuf::from("/export/workout_sets.jsonl"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/export/workout_sets.jsonl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_date_parse() {
        let err = InsightsError::DateParse("31/02/2024".to_string());
        assert_eq!(err.to_string(), "Invalid date format: 31/02/2024");
    }

    #[test]
    fn test_error_display_invalid_unit() {
        let err = InsightsError::InvalidUnit("stone".to_string());
        assert_eq!(err.to_string(), "Invalid weight unit: stone");
    }

    #[test]
    fn test_error_display_invalid_mode() {
        let err = InsightsError::InvalidMode("median".to_string());
        assert_eq!(err.to_string(), "Invalid aggregation mode: median");
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = InsightsError::DataPathNotFound(PathBuf::from("/missing/export"));
        assert_eq!(err.to_string(), "Data path not found: /missing/export");
    }

    #[test]
    fn test_error_display_table_load() {
        let err = InsightsError::TableLoad {
            table: "calories_logs".to_string(),
            reason: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load table calories_logs: permission denied"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = InsightsError::Config("as-of date is in the future".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: as-of date is in the future"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: InsightsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: InsightsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
