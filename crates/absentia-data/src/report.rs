//! One-pass report assembly: every aggregate view for one selection.
//!
//! The renderer and the JSON output both consume this structure, so the two
//! surfaces can never disagree on the numbers.

use chrono::Utc;
use serde::Serialize;

use absentia_core::config::AggregatorConfig;
use absentia_core::models::{Dataset, YearSelection};

use crate::aggregator::{
    AbsenceAggregator, CategoryCount, CategoryTotal, EmployeeCount, YearOverYear,
};

/// Provenance block attached to every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp of report assembly.
    pub generated_at: String,
    /// Rows in the source dataset.
    pub source_rows: usize,
    /// Rows matching the selection.
    pub filtered_rows: usize,
    /// Distinct years present in the source, sorted.
    pub years_present: Vec<i32>,
}

/// The assembled report for one year selection.
#[derive(Debug, Clone, Serialize)]
pub struct AbsenceReport {
    /// The selection the report was built for ("all" or a year).
    pub selection: String,
    pub average_days_per_employee: Option<f64>,
    pub total_cost: f64,
    /// Present only for a specific-year selection with a comparable prior
    /// year (see [`AbsenceAggregator::year_over_year`]).
    pub year_over_year: Option<YearOverYear>,
    pub top_diagnoses: Vec<CategoryCount>,
    pub top_days_by_diagnosis: Vec<CategoryTotal>,
    pub top_cost_by_diagnosis: Vec<CategoryTotal>,
    pub alert_frequency: Vec<CategoryTotal>,
    pub top_employees: Vec<EmployeeCount>,
    pub metadata: ReportMetadata,
}

/// Run the full pipeline for `selection` and collect every view.
pub fn build_report(
    dataset: &Dataset,
    selection: YearSelection,
    config: AggregatorConfig,
) -> AbsenceReport {
    let aggregator = AbsenceAggregator::new(dataset, config);
    let view = aggregator.filter(selection);

    let year_over_year = match selection {
        YearSelection::Year(year) => aggregator.year_over_year(year),
        YearSelection::All => None,
    };

    AbsenceReport {
        selection: selection.to_string(),
        average_days_per_employee: aggregator.average_days_per_employee(&view),
        total_cost: aggregator.total_cost(&view),
        year_over_year,
        top_diagnoses: aggregator.top_diagnoses(&view),
        top_days_by_diagnosis: aggregator.top_days_by_diagnosis(&view),
        top_cost_by_diagnosis: aggregator.top_cost_by_diagnosis(&view),
        alert_frequency: aggregator.alert_frequency(&view),
        top_employees: aggregator.top_employees(&view),
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            source_rows: dataset.len(),
            filtered_rows: view.len(),
            years_present: dataset.years(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
