//! Domain layer for the absence analytics pipeline.
//!
//! Holds the record/dataset models, the aggregator configuration that
//! collapses the behavioral differences between the duplicated upstream
//! dashboards, the error taxonomy, CLI settings, and formatting helpers.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
