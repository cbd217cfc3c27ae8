use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ── DiagnosisColumn ───────────────────────────────────────────────────────────

/// Which source column feeds the diagnosis-keyed rankings.
///
/// The dashboards this pipeline replaces disagreed on this: two ranked by the
/// coarse generation-type code, one by the free-text diagnosis. Generation
/// type is the canonical default; the other stays selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisColumn {
    /// Coarse generation-type code.
    GenerationType,
    /// Free-text detailed diagnosis.
    DiagnosisDetail,
}

// ── AggregatorConfig ──────────────────────────────────────────────────────────

/// Behavioral switches of the aggregation pipeline.
///
/// Collapses the parameter differences between the duplicated source
/// dashboards into one structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Column the diagnosis rankings group by.
    pub diagnosis_column: DiagnosisColumn,
    /// Whether the "all years" sentinel is a valid selection.
    pub offer_all_years: bool,
    /// Whether the year-over-year comparison is computed at all.
    pub compute_delta: bool,
    /// Whether the aggregate "total alerts" column is dropped from the
    /// alert-frequency ranking.
    pub exclude_total_alerts: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            diagnosis_column: DiagnosisColumn::GenerationType,
            offer_all_years: true,
            compute_delta: true,
            exclude_total_alerts: true,
        }
    }
}

// ── ColumnMap ─────────────────────────────────────────────────────────────────

/// Names of the source columns the loader binds to record fields.
///
/// Defaults match the upstream HR export. Every name is matched exactly
/// except the alert columns, which are discovered by the marker substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Absence start-date column.
    pub start_date: String,
    /// Employee identifier column.
    pub employee_id: String,
    /// Absence duration (days) column.
    pub absence_days: String,
    /// Absence cost column.
    pub absence_cost: String,
    /// Generation-type code column.
    pub generation_type: String,
    /// Detailed diagnosis column. Optional in the source: when absent the
    /// field stays empty rather than failing the load.
    pub diagnosis_detail: String,
    /// Substring marking a column as an alert column.
    pub alert_marker: String,
    /// The aggregate alert-count column, subject to
    /// [`AggregatorConfig::exclude_total_alerts`].
    pub total_alerts: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            start_date: "INCAPACIDAD - FECHA DE INICIO".to_string(),
            employee_id: "C.C COLABORADOR".to_string(),
            absence_days: "INCAPACIDAD - DIAS".to_string(),
            absence_cost: "COSTO INCAPACIDAD".to_string(),
            generation_type: "INCAPACIDAD - TIPO DE GENERACIÓN".to_string(),
            diagnosis_detail: "INCAPACIDAD - DIAGNÓSTICO".to_string(),
            alert_marker: "ALERTA".to_string(),
            total_alerts: "NUM ALERTAS".to_string(),
        }
    }
}

impl ColumnMap {
    /// `true` when `column` is an alert column under this map.
    pub fn is_alert_column(&self, column: &str) -> bool {
        column.contains(&self.alert_marker)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
