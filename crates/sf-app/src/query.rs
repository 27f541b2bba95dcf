//! Query helpers for extracting data from run reports.

use crate::error::{AppError, AppResult};
use crate::run_service::{LinkReport, RunReport, SeriesKind, SeriesRecord};

/// Find one series of a report.
pub fn find_series<'a>(
    report: &'a RunReport,
    kind: SeriesKind,
    id: &str,
    scenario: u32,
) -> AppResult<&'a SeriesRecord> {
    report
        .series
        .iter()
        .find(|s| s.kind == kind && s.id == id && s.scenario == scenario)
        .ok_or_else(|| {
            AppError::NotFound(format!("{kind:?} series '{id}' for scenario {scenario}"))
        })
}

/// Render one series as CSV with a `time,value` header.
pub fn export_series_csv(
    report: &RunReport,
    kind: SeriesKind,
    id: &str,
    scenario: u32,
) -> AppResult<String> {
    let record = find_series(report, kind, id, scenario)?;
    let mut csv = String::from("time,value\n");
    for (t, v) in record.times.iter().zip(&record.values) {
        csv.push_str(&format!("{},{}\n", t, v));
    }
    Ok(csv)
}

/// Parse a series kind as written on the command line.
pub fn parse_series_kind(text: &str) -> AppResult<SeriesKind> {
    match text {
        "node" | "node-inflow" => Ok(SeriesKind::NodeInflow),
        "link" | "link-outflow" => Ok(SeriesKind::LinkOutflow),
        "subcatchment" | "runoff" => Ok(SeriesKind::SubcatchmentRunoff),
        other => Err(AppError::InvalidInput(format!(
            "Unknown series kind: {other} (expected node, link or subcatchment)"
        ))),
    }
}

pub fn find_link<'a>(report: &'a RunReport, id: &str) -> AppResult<&'a LinkReport> {
    report
        .links
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(|| AppError::NotFound(format!("link {id}")))
}
