mod bootstrap;

use anyhow::Result;
use clap::Parser;

use absentia_core::config::ColumnMap;
use absentia_core::formatting::{format_currency, format_number};
use absentia_core::settings::Settings;
use absentia_data::aggregator::{AbsenceAggregator, CategoryCount, CategoryTotal, EmployeeCount};
use absentia_data::cache::DatasetCache;
use absentia_data::export::write_filtered;
use absentia_data::report::{build_report, AbsenceReport};

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("absentia v{} starting", env!("CARGO_PKG_VERSION"));

    let selection = settings.selection()?;
    let config = settings.aggregator_config();

    let mut cache = DatasetCache::new(&settings.file, ColumnMap::default());
    let dataset = cache.get_or_load()?;

    let report = build_report(&dataset, selection, config.clone());

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if let Some(path) = &settings.export {
        let aggregator = AbsenceAggregator::new(&dataset, config);
        let view = aggregator.filter(selection);
        write_filtered(&dataset, &view, path)?;
    }

    Ok(())
}

// ── Text rendering ─────────────────────────────────────────────────────────────

/// Render the report as plain text for the terminal.
fn render_report(report: &AbsenceReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    let title = format!("Absence report ({})", report.selection);
    lines.push(title.clone());
    lines.push("=".repeat(title.len()));
    lines.push(String::new());

    match report.average_days_per_employee {
        Some(avg) => lines.push(format!(
            "Average days per employee: {}",
            format_number(avg, 2)
        )),
        None => lines.push("Average days per employee: no data".to_string()),
    }
    lines.push(format!("Total cost: {}", format_currency(report.total_cost)));

    if let Some(delta) = &report.year_over_year {
        lines.push(String::new());
        lines.push(format!(
            "Year over year ({} vs {})",
            delta.year, delta.prior_year
        ));
        lines.push(format!(
            "  Average days per employee: {}",
            signed_number(delta.days_average_delta, 2)
        ));
        lines.push(format!(
            "  Total cost: {}",
            signed_currency(delta.total_cost_delta)
        ));
    }

    push_count_section(&mut lines, "Top diagnoses by frequency", &report.top_diagnoses);
    push_total_section(
        &mut lines,
        "Top diagnoses by accumulated days",
        &report.top_days_by_diagnosis,
        |total| format!("{} days", format_number(total, 1)),
    );
    push_total_section(
        &mut lines,
        "Top diagnoses by accumulated cost",
        &report.top_cost_by_diagnosis,
        format_currency,
    );
    push_total_section(
        &mut lines,
        "Alert frequency",
        &report.alert_frequency,
        |total| format_number(total, 0),
    );
    push_employee_section(&mut lines, "Top employees by record count", &report.top_employees);

    lines.push(String::new());
    let years = if report.metadata.years_present.is_empty() {
        "none".to_string()
    } else {
        report
            .metadata
            .years_present
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!(
        "{} of {} rows | years: {}",
        report.metadata.filtered_rows, report.metadata.source_rows, years
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn signed_number(value: f64, decimals: usize) -> String {
    if value >= 0.0 {
        format!("+{}", format_number(value, decimals))
    } else {
        format_number(value, decimals)
    }
}

fn signed_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", format_currency(value))
    } else {
        format_currency(value)
    }
}

fn push_count_section(lines: &mut Vec<String>, title: &str, entries: &[CategoryCount]) {
    lines.push(String::new());
    lines.push(title.to_string());
    if entries.is_empty() {
        lines.push("  (no data)".to_string());
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {} ({} records)",
            rank + 1,
            entry.category,
            entry.count
        ));
    }
}

fn push_total_section(
    lines: &mut Vec<String>,
    title: &str,
    entries: &[CategoryTotal],
    render: impl Fn(f64) -> String,
) {
    lines.push(String::new());
    lines.push(title.to_string());
    if entries.is_empty() {
        lines.push("  (no data)".to_string());
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {} ({})",
            rank + 1,
            entry.category,
            render(entry.total)
        ));
    }
}

fn push_employee_section(lines: &mut Vec<String>, title: &str, entries: &[EmployeeCount]) {
    lines.push(String::new());
    lines.push(title.to_string());
    if entries.is_empty() {
        lines.push("  (no data)".to_string());
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {} ({} records)",
            rank + 1,
            entry.employee,
            entry.count
        ));
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use absentia_data::aggregator::YearOverYear;
    use absentia_data::report::ReportMetadata;

    fn sample_report() -> AbsenceReport {
        AbsenceReport {
            selection: "2023".to_string(),
            average_days_per_employee: Some(9.0),
            total_cost: 350000.0,
            year_over_year: Some(YearOverYear {
                year: 2023,
                prior_year: 2022,
                days_average_delta: 4.0,
                total_cost_delta: -600.0,
            }),
            top_diagnoses: vec![CategoryCount {
                category: "EG".to_string(),
                count: 3,
            }],
            top_days_by_diagnosis: vec![CategoryTotal {
                category: "EG".to_string(),
                total: 18.0,
            }],
            top_cost_by_diagnosis: vec![CategoryTotal {
                category: "EG".to_string(),
                total: 350000.0,
            }],
            alert_frequency: vec![],
            top_employees: vec![EmployeeCount {
                employee: "1001".to_string(),
                count: 2,
            }],
            metadata: ReportMetadata {
                generated_at: "2026-01-01T00:00:00Z".to_string(),
                source_rows: 4,
                filtered_rows: 3,
                years_present: vec![2022, 2023],
            },
        }
    }

    #[test]
    fn test_render_report_headline_metrics() {
        let text = render_report(&sample_report());
        assert!(text.contains("Absence report (2023)"));
        assert!(text.contains("Average days per employee: 9.00"));
        assert!(text.contains("Total cost: $350,000"));
    }

    #[test]
    fn test_render_report_signed_deltas() {
        let text = render_report(&sample_report());
        assert!(text.contains("Year over year (2023 vs 2022)"));
        assert!(text.contains("Average days per employee: +4.00"));
        assert!(text.contains("Total cost: -$600"));
    }

    #[test]
    fn test_render_report_sections() {
        let text = render_report(&sample_report());
        assert!(text.contains("   1. EG (3 records)"));
        assert!(text.contains("   1. EG (18.0 days)"));
        assert!(text.contains("   1. EG ($350,000)"));
        assert!(text.contains("   1. 1001 (2 records)"));
        assert!(text.contains("Alert frequency\n  (no data)"));
        assert!(text.contains("3 of 4 rows | years: 2022, 2023"));
    }

    #[test]
    fn test_render_report_empty_view() {
        let mut report = sample_report();
        report.average_days_per_employee = None;
        report.year_over_year = None;
        report.top_diagnoses.clear();
        let text = render_report(&report);
        assert!(text.contains("Average days per employee: no data"));
        assert!(!text.contains("Year over year"));
        assert!(text.contains("Top diagnoses by frequency\n  (no data)"));
    }
}
