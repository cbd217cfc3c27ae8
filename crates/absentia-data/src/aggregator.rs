//! Year filtering and aggregate views over a loaded [`Dataset`].
//!
//! Every operation is a pure function of the dataset and the current
//! selection: filtered views are recomputed per selection change and never
//! mutate the source. All aggregates tolerate an empty view; the one metric
//! that has no empty identity, the per-employee day average, comes back as
//! `None` rather than a division by zero.

use std::collections::HashMap;

use absentia_core::config::{AggregatorConfig, DiagnosisColumn};
use absentia_core::models::{AbsenceRecord, Dataset, YearSelection};
use serde::Serialize;
use tracing::debug;

/// Entry cap for the ranked views.
pub const TOP_N: usize = 10;

// ── FilteredView ──────────────────────────────────────────────────────────────

/// The subset of records matching one year selection.
///
/// Borrows from the dataset; source order is preserved, which is what gives
/// the rankings their documented first-encountered tie-break. The row
/// indices point back into [`Dataset::raw_rows`] for the export operation.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    selection: YearSelection,
    records: Vec<&'a AbsenceRecord>,
    row_indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// The selection this view was built from.
    pub fn selection(&self) -> YearSelection {
        self.selection
    }

    /// The matching records, in source order.
    pub fn records(&self) -> &[&'a AbsenceRecord] {
        &self.records
    }

    /// Indices of the matching rows in the source table.
    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when no record matched the selection.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Result row types ──────────────────────────────────────────────────────────

/// One entry of a frequency ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// One entry of an accumulated-value ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// One row of the top-employees table. Field names are the output column
/// names and stay stable regardless of the underlying identifier type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeCount {
    pub employee: String,
    pub count: u64,
}

/// Year-over-year metric differences (selected year minus prior year).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOverYear {
    pub year: i32,
    pub prior_year: i32,
    pub days_average_delta: f64,
    pub total_cost_delta: f64,
}

// ── AbsenceAggregator ─────────────────────────────────────────────────────────

/// The aggregation pipeline: one dataset, one configuration, the full set of
/// derived views.
pub struct AbsenceAggregator<'a> {
    dataset: &'a Dataset,
    config: AggregatorConfig,
}

impl<'a> AbsenceAggregator<'a> {
    pub fn new(dataset: &'a Dataset, config: AggregatorConfig) -> Self {
        Self { dataset, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Select the records matching `selection`.
    ///
    /// `All` keeps every record, including those without a derivable year; a
    /// specific year keeps exact matches only, so null-year records never
    /// appear in a year-specific view.
    pub fn filter(&self, selection: YearSelection) -> FilteredView<'a> {
        let mut records = Vec::new();
        let mut row_indices = Vec::new();
        for (idx, record) in self.dataset.records.iter().enumerate() {
            let keep = match selection {
                YearSelection::All => true,
                YearSelection::Year(y) => record.year == Some(y),
            };
            if keep {
                records.push(record);
                row_indices.push(idx);
            }
        }
        debug!(
            selection = %selection,
            matched = records.len(),
            total = self.dataset.len(),
            "filtered dataset"
        );
        FilteredView {
            selection,
            records,
            row_indices,
        }
    }

    /// Mean of the per-employee summed absence days.
    ///
    /// Groups the view by employee, sums each employee's days, then averages
    /// those sums. `None` on an empty view: zero employees is "no data",
    /// not an average of zero.
    pub fn average_days_per_employee(&self, view: &FilteredView<'_>) -> Option<f64> {
        let mut per_employee: HashMap<&str, f64> = HashMap::new();
        for record in view.records() {
            *per_employee.entry(record.employee_id.as_str()).or_insert(0.0) +=
                record.absence_days;
        }
        if per_employee.is_empty() {
            return None;
        }
        let total: f64 = per_employee.values().sum();
        Some(total / per_employee.len() as f64)
    }

    /// Sum of the absence cost over the view. Zero when empty.
    pub fn total_cost(&self, view: &FilteredView<'_>) -> f64 {
        view.records().iter().map(|r| r.absence_cost).sum()
    }

    /// Year-over-year metric deltas for `year`.
    ///
    /// Present only when deltas are configured on, `year` is not the minimum
    /// year in the dataset, and both `year` and `year - 1` have records.
    /// Absence of any precondition silently omits the comparison.
    pub fn year_over_year(&self, year: i32) -> Option<YearOverYear> {
        if !self.config.compute_delta {
            return None;
        }
        let years = self.dataset.years();
        let min_year = *years.first()?;
        if year <= min_year || !years.contains(&(year - 1)) {
            return None;
        }

        let current = self.filter(YearSelection::Year(year));
        let prior = self.filter(YearSelection::Year(year - 1));

        // Both averages must be defined for the comparison to mean anything.
        let current_avg = self.average_days_per_employee(&current)?;
        let prior_avg = self.average_days_per_employee(&prior)?;

        Some(YearOverYear {
            year,
            prior_year: year - 1,
            days_average_delta: current_avg - prior_avg,
            total_cost_delta: self.total_cost(&current) - self.total_cost(&prior),
        })
    }

    /// Top diagnoses by record frequency over the configured column.
    pub fn top_diagnoses(&self, view: &FilteredView<'_>) -> Vec<CategoryCount> {
        let mut groups = count_groups(view.records(), |r| self.diagnosis_of(r));
        rank_descending(&mut groups);
        groups.truncate(TOP_N);
        groups
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect()
    }

    /// Top diagnoses by accumulated absence days.
    pub fn top_days_by_diagnosis(&self, view: &FilteredView<'_>) -> Vec<CategoryTotal> {
        self.top_totals_by_diagnosis(view, |r| r.absence_days)
    }

    /// Top diagnoses by accumulated absence cost.
    pub fn top_cost_by_diagnosis(&self, view: &FilteredView<'_>) -> Vec<CategoryTotal> {
        self.top_totals_by_diagnosis(view, |r| r.absence_cost)
    }

    /// Per-alert-column sums over the view, ranked descending.
    ///
    /// One entry per alert column, the full ranked set, not truncated. The
    /// aggregate "total alerts" column is dropped when the configuration
    /// says to exclude it.
    pub fn alert_frequency(&self, view: &FilteredView<'_>) -> Vec<CategoryTotal> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for (idx, column) in self.dataset.alert_columns.iter().enumerate() {
            if self.config.exclude_total_alerts
                && self.dataset.total_alerts_column.as_deref() == Some(column.as_str())
            {
                continue;
            }
            let sum: f64 = view
                .records()
                .iter()
                .map(|r| r.alert_values.get(idx).copied().unwrap_or(0.0))
                .sum();
            totals.push((column.clone(), sum));
        }
        rank_descending(&mut totals);
        totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect()
    }

    /// Top employees by record count, as `(employee, count)` rows.
    pub fn top_employees(&self, view: &FilteredView<'_>) -> Vec<EmployeeCount> {
        let mut groups = count_groups(view.records(), |r| r.employee_id.as_str());
        rank_descending(&mut groups);
        groups.truncate(TOP_N);
        groups
            .into_iter()
            .map(|(employee, count)| EmployeeCount { employee, count })
            .collect()
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn diagnosis_of(&self, record: &'a AbsenceRecord) -> &'a str {
        match self.config.diagnosis_column {
            DiagnosisColumn::GenerationType => record.generation_type.as_str(),
            DiagnosisColumn::DiagnosisDetail => record.diagnosis_detail.as_str(),
        }
    }

    fn top_totals_by_diagnosis(
        &self,
        view: &FilteredView<'_>,
        value: impl Fn(&AbsenceRecord) -> f64,
    ) -> Vec<CategoryTotal> {
        let mut groups = sum_groups(view.records(), |r| self.diagnosis_of(r), value);
        rank_descending(&mut groups);
        groups.truncate(TOP_N);
        groups
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect()
    }
}

// ── Grouping helpers ──────────────────────────────────────────────────────────

/// Count records per key, keeping keys in first-encountered order.
///
/// Empty keys (missing category text in the source) are skipped.
fn count_groups<'r>(
    records: &[&'r AbsenceRecord],
    key: impl Fn(&'r AbsenceRecord) -> &'r str,
) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, u64)> = Vec::new();
    for record in records {
        let k = key(record);
        if k.is_empty() {
            continue;
        }
        match index.get(k) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(k, groups.len());
                groups.push((k.to_string(), 1));
            }
        }
    }
    groups
}

/// Sum `value` per key, keeping keys in first-encountered order.
fn sum_groups<'r>(
    records: &[&'r AbsenceRecord],
    key: impl Fn(&'r AbsenceRecord) -> &'r str,
    value: impl Fn(&AbsenceRecord) -> f64,
) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, f64)> = Vec::new();
    for record in records {
        let k = key(record);
        if k.is_empty() {
            continue;
        }
        match index.get(k) {
            Some(&i) => groups[i].1 += value(record),
            None => {
                index.insert(k, groups.len());
                groups.push((k.to_string(), value(record)));
            }
        }
    }
    groups
}

/// Sort descending by value. The input is in first-encountered order and the
/// sort is stable, so ties resolve to whichever key appeared first.
fn rank_descending<V: PartialOrd>(groups: &mut [(String, V)]) {
    groups.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────
