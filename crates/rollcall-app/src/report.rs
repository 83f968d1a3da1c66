// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report writer — timestamped JSON files and a plain-text summary for the
// terminal.

use std::path::{Path, PathBuf};

use rollcall_core::AttendanceReport;
use rollcall_core::error::Result;
use tracing::{info, instrument};

/// File name for a report generated at the report's own timestamp.
pub fn report_file_name(report: &AttendanceReport) -> String {
    format!(
        "attendance_report_{}.json",
        report.generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Write `report` as pretty JSON into `output_dir`, creating the directory if
/// needed. Returns the path written.
#[instrument(skip(report), fields(records = report.records.len()))]
pub fn write_report(report: &AttendanceReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(report_file_name(report));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "Report written");
    Ok(path)
}

/// One line per student: id, name, status codes per date, and percentage.
pub fn summary_lines(report: &AttendanceReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.records.len() + 1);
    let header: Vec<&str> = report.columns.iter().map(|c| c.label.as_str()).collect();
    lines.push(format!("ID\tName\t{}\tAttended\t%", header.join("\t")));

    for record in &report.records {
        let codes: Vec<&str> = record
            .statuses()
            .iter()
            .map(|s| s.status.short_code())
            .collect();
        lines.push(format!(
            "{}\t{}\t{}\t{}/{}\t{:.2}",
            record.identity().id,
            record.identity().name,
            codes.join("\t"),
            record.attended_count(),
            record.total_count(),
            record.percentage()
        ));
    }
    lines
}
