//! Source file loading: xlsx workbooks and csv exports into a [`Dataset`].
//!
//! The load is lenient about cell contents and strict about structure: a
//! missing required column fails the load, while an unparseable date or
//! number degrades to `None`/zero on that record only. Raw cell text is kept
//! alongside the typed records so the export operation can reproduce the
//! source table.

use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use absentia_core::config::ColumnMap;
use absentia_core::error::{AbsentiaError, Result};
use absentia_core::models::{AbsenceRecord, Dataset};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Load a dataset from `path`, dispatching on the file extension.
///
/// `.xlsx` goes through the workbook reader, `.csv` through the csv reader;
/// anything else is rejected up front.
pub fn load_dataset(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let dataset = match ext.as_str() {
        "xlsx" => load_workbook(path, columns)?,
        "csv" => load_csv(path, columns)?,
        _ => return Err(AbsentiaError::UnsupportedFormat(path.to_path_buf())),
    };
    info!(
        path = %path.display(),
        rows = dataset.len(),
        alert_columns = dataset.alert_columns.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

// ── Workbook loading ──────────────────────────────────────────────────────────

fn load_workbook(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| AbsentiaError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AbsentiaError::EmptySheet(path.to_path_buf()))?
        .map_err(|e| AbsentiaError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| AbsentiaError::EmptySheet(path.to_path_buf()))?
        .iter()
        .map(cell_to_string)
        .collect();
    debug!(?header, "workbook header");

    let raw_rows: Vec<Vec<String>> = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
            cells.resize(header.len(), String::new());
            cells
        })
        .collect();

    build_dataset(path, columns, header, raw_rows)
}

/// Render one workbook cell as text.
///
/// Integral floats drop the trailing `.0` so identifiers read back the way
/// they were typed; date-typed cells become ISO dates, which the shared row
/// parser understands.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(serial) => match excel_serial_to_date(*serial) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => serial.to_string(),
        },
        DataType::Error(e) => {
            warn!(error = ?e, "error cell in workbook");
            String::new()
        }
        DataType::Empty => String::new(),
    }
}

/// Excel serial day number to a calendar date. Day 0 is 1899-12-30 under the
/// 1900 date system.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial as i64))
}

// ── CSV loading ───────────────────────────────────────────────────────────────

fn load_csv(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| AbsentiaError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| AbsentiaError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    if header.is_empty() {
        return Err(AbsentiaError::EmptySheet(path.to_path_buf()));
    }
    debug!(?header, "csv header");

    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping malformed csv row");
                continue;
            }
        };
        let mut cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        cells.resize(header.len(), String::new());
        raw_rows.push(cells);
    }

    build_dataset(path, columns, header, raw_rows)
}

// ── Shared row parsing ────────────────────────────────────────────────────────

/// Header positions of the bound columns.
struct ColumnIndices {
    start_date: usize,
    employee_id: usize,
    absence_days: usize,
    absence_cost: usize,
    generation_type: usize,
    diagnosis_detail: Option<usize>,
    alerts: Vec<usize>,
}

impl ColumnIndices {
    fn resolve(header: &[String], columns: &ColumnMap, path: &Path) -> Result<Self> {
        let require = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| AbsentiaError::MissingColumn {
                    column: name.to_string(),
                    path: path.to_path_buf(),
                })
        };
        Ok(Self {
            start_date: require(&columns.start_date)?,
            employee_id: require(&columns.employee_id)?,
            absence_days: require(&columns.absence_days)?,
            absence_cost: require(&columns.absence_cost)?,
            generation_type: require(&columns.generation_type)?,
            // Optional: not every export carries the detailed diagnosis.
            diagnosis_detail: header.iter().position(|c| c == &columns.diagnosis_detail),
            alerts: header
                .iter()
                .enumerate()
                .filter(|(_, c)| columns.is_alert_column(c))
                .map(|(i, _)| i)
                .collect(),
        })
    }
}

fn build_dataset(
    path: &Path,
    columns: &ColumnMap,
    header: Vec<String>,
    raw_rows: Vec<Vec<String>>,
) -> Result<Dataset> {
    let indices = ColumnIndices::resolve(&header, columns, path)?;

    let alert_columns: Vec<String> = indices
        .alerts
        .iter()
        .map(|&i| header[i].clone())
        .collect();
    let total_alerts_column = alert_columns
        .iter()
        .find(|c| c.as_str() == columns.total_alerts)
        .cloned();

    let records = raw_rows
        .iter()
        .map(|row| build_record(row, &indices))
        .collect();

    Ok(Dataset {
        columns: header,
        alert_columns,
        total_alerts_column,
        records,
        raw_rows,
    })
}

fn build_record(row: &[String], indices: &ColumnIndices) -> AbsenceRecord {
    let start_date = parse_date(&row[indices.start_date]);
    AbsenceRecord {
        employee_id: row[indices.employee_id].clone(),
        start_date,
        year: start_date.map(|d| chrono::Datelike::year(&d)),
        absence_days: parse_number(&row[indices.absence_days]),
        absence_cost: parse_number(&row[indices.absence_cost]),
        generation_type: row[indices.generation_type].clone(),
        diagnosis_detail: indices
            .diagnosis_detail
            .map(|i| row[i].clone())
            .unwrap_or_default(),
        alert_values: indices
            .alerts
            .iter()
            .map(|&i| parse_number(&row[i]))
            .collect(),
    }
}

/// Lenient date parse over the formats seen in HR exports. `None` when the
/// text matches none of them.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    None
}

/// Lenient numeric parse: currency symbols and thousands separators are
/// stripped, anything unparseable is zero.
fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
