use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AbsentiaError;

/// One absence/disability event tied to one employee and one start date.
///
/// Built by the loader from one spreadsheet row. Numeric fields default to
/// zero when the source cell is blank or unreadable; an unparseable start
/// date leaves both `start_date` and `year` unset without failing the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// Employee identifier. Not unique per record: one employee has many
    /// absence events.
    pub employee_id: String,
    /// Start date of the absence, when the source cell could be parsed.
    pub start_date: Option<NaiveDate>,
    /// Calendar year derived from `start_date`; `None` when the date is
    /// missing or unparseable.
    pub year: Option<i32>,
    /// Duration of the absence in days.
    pub absence_days: f64,
    /// Estimated cost of the absence (currency amount).
    pub absence_cost: f64,
    /// Generation-type code of the absence (coarse diagnosis category).
    pub generation_type: String,
    /// Free-text detailed diagnosis.
    pub diagnosis_detail: String,
    /// Per-record values of the alert columns, parallel to
    /// [`Dataset::alert_columns`].
    pub alert_values: Vec<f64>,
}

/// The loaded source table: typed records plus the raw cells needed to
/// reproduce the file on export.
///
/// Immutable after construction. Filtered views borrow from it and are
/// recomputed per selection change (see `absentia-data`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Source column names, in source order.
    pub columns: Vec<String>,
    /// Names of the columns flagged as alert columns (name contains the
    /// marker token), in source order. Includes the "total alerts" column;
    /// excluding it is an aggregation-time decision.
    pub alert_columns: Vec<String>,
    /// Name of the aggregate alert-count column, when the source has one.
    /// Bound at load time from the column map so aggregation does not have
    /// to re-derive it.
    pub total_alerts_column: Option<String>,
    /// Typed records, one per source row, in source order.
    pub records: Vec<AbsenceRecord>,
    /// Raw cell text per source row, in source column order.
    pub raw_rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, distinct years present in the data.
    ///
    /// Records without a derivable year do not contribute.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().filter_map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

// ── YearSelection ─────────────────────────────────────────────────────────────

/// The year filter selector: one specific year, or the "all years" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearSelection {
    /// No filtering, the whole dataset.
    All,
    /// Only records whose derived year equals the given year.
    Year(i32),
}

impl YearSelection {
    /// `true` for the "all years" sentinel.
    pub fn is_all(&self) -> bool {
        matches!(self, YearSelection::All)
    }
}

impl std::fmt::Display for YearSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearSelection::All => write!(f, "all"),
            YearSelection::Year(y) => write!(f, "{}", y),
        }
    }
}

impl std::str::FromStr for YearSelection {
    type Err = AbsentiaError;

    /// Parses `"all"` (case-insensitive) or a four-digit-style integer year.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(YearSelection::All);
        }
        trimmed
            .parse::<i32>()
            .map(YearSelection::Year)
            .map_err(|_| {
                AbsentiaError::Config(format!("invalid year selector: {:?}", s))
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
