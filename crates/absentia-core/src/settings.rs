use clap::Parser;
use std::path::PathBuf;

use crate::config::{AggregatorConfig, DiagnosisColumn};
use crate::error::{AbsentiaError, Result};
use crate::models::YearSelection;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Absence analytics over HR spreadsheet exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "absentia",
    about = "Absence analytics over HR spreadsheet exports",
    version
)]
pub struct Settings {
    /// Path to the source spreadsheet (.xlsx or .csv)
    #[arg(long, default_value = "data_limpia_final.xlsx")]
    pub file: PathBuf,

    /// Year to analyse, or "all"
    #[arg(long, default_value = "all")]
    pub year: String,

    /// Column the diagnosis rankings group by
    #[arg(long, value_enum, default_value_t = DiagnosisColumn::GenerationType)]
    pub diagnosis_column: DiagnosisColumn,

    /// Skip the year-over-year comparison
    #[arg(long)]
    pub no_delta: bool,

    /// Keep the aggregate "total alerts" column in the alert ranking
    #[arg(long)]
    pub include_total_alerts: bool,

    /// Reject the "all" sentinel; a specific year becomes mandatory
    #[arg(long)]
    pub require_year: bool,

    /// Write the filtered view as CSV to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Emit the report as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// The aggregator configuration implied by the flags.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            diagnosis_column: self.diagnosis_column,
            offer_all_years: !self.require_year,
            compute_delta: !self.no_delta,
            exclude_total_alerts: !self.include_total_alerts,
        }
    }

    /// Parse and validate the year selector against the configuration.
    ///
    /// The `all` sentinel is rejected when the configuration does not offer
    /// an all-years view.
    pub fn selection(&self) -> Result<YearSelection> {
        let selection: YearSelection = self.year.parse()?;
        if selection.is_all() && self.require_year {
            return Err(AbsentiaError::Config(
                "a specific year is required (--require-year is set)".to_string(),
            ));
        }
        Ok(selection)
    }

    /// The effective tracing level string, honouring `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Settings::parse_from(std::iter::once("absentia").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_map_to_canonical_config() {
        let settings = parse(&[]);
        assert_eq!(settings.aggregator_config(), AggregatorConfig::default());
        assert_eq!(settings.selection().unwrap(), YearSelection::All);
    }

    #[test]
    fn test_flags_flip_config() {
        let settings = parse(&[
            "--diagnosis-column",
            "diagnosis-detail",
            "--no-delta",
            "--include-total-alerts",
        ]);
        let config = settings.aggregator_config();
        assert_eq!(config.diagnosis_column, DiagnosisColumn::DiagnosisDetail);
        assert!(!config.compute_delta);
        assert!(!config.exclude_total_alerts);
    }

    #[test]
    fn test_year_selector_parsing() {
        let settings = parse(&["--year", "2023"]);
        assert_eq!(settings.selection().unwrap(), YearSelection::Year(2023));
    }

    #[test]
    fn test_require_year_rejects_all() {
        let settings = parse(&["--require-year"]);
        let err = settings.selection().unwrap_err();
        assert!(err.to_string().contains("specific year"));

        let settings = parse(&["--require-year", "--year", "2022"]);
        assert_eq!(settings.selection().unwrap(), YearSelection::Year(2022));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = parse(&["--log-level", "ERROR", "--debug"]);
        assert_eq!(settings.effective_log_level(), "DEBUG");
    }
}
