//! Runtime layer for gym-insights.
//!
//! Gathers the log-store tables concurrently and caches them for the
//! analysis pipeline.

pub mod data_manager;

pub use insights_core as core;
pub use insights_data as data;
