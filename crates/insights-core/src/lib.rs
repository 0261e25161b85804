//! Shared domain layer for the gym insights engine.
//!
//! Holds the models exchanged between crates, the error type, the fixed
//! thresholds and configuration, weight units, statistics and formatting
//! helpers, date handling, and CLI settings.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod statistics;
pub mod thresholds;
pub mod time_utils;
pub mod units;

pub use error::{InsightsError, Result};
