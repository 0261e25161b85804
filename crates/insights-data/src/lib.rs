//! Data layer for gym-insights.
//!
//! Reads the exported log tables, turns them into dated series, scores
//! strength sessions and builds the insights view and history read-models.

pub mod aggregator;
pub mod analysis;
pub mod history;
pub mod insights;
pub mod reader;
pub mod scorer;
pub mod series;

pub use insights_core as core;
