use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the absence analytics pipeline.
///
/// Load-time problems (missing file, unknown format, missing column) are
/// fatal; per-record problems never become errors, the loader degrades them
/// to empty/None field values instead.
#[derive(Error, Debug)]
pub enum AbsentiaError {
    /// The spreadsheet could not be opened or decoded.
    #[error("Failed to open workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The workbook has no sheet, or the sheet has no header row.
    #[error("No data found in {0:?}")]
    EmptySheet(PathBuf),

    /// The file extension is not one the loader understands.
    #[error("Unsupported input format: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// A required column is absent from the source header.
    #[error("Missing column {column:?} in {path:?}")]
    MissingColumn { column: String, path: PathBuf },

    /// Writing or encoding the CSV export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the absentia crates.
pub type Result<T> = std::result::Result<T, AbsentiaError>;
