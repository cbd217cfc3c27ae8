//! Data pipeline for the absence analytics tool.
//!
//! Loading (xlsx/csv into typed records), explicit caching, the year-filter
//! aggregation views, report assembly, and CSV export of the filtered table.

pub mod aggregator;
pub mod cache;
pub mod export;
pub mod reader;
pub mod report;
