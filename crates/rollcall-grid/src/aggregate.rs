// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Aggregator — fold per-cell verdicts and cancelled columns into attendance
// records.

use rollcall_core::error::{Result, RollcallError};
use rollcall_core::{
    AttendanceRecord, AttendanceSheet, AttendanceStatus, CellVerdict, ColumnStatus, DateColumn,
    StudentIdentity,
};
use tracing::{info, instrument};

/// Build one record per student, in the order given.
///
/// A cancelled column is Absent for everyone whatever its verdict. A row with
/// fewer verdicts than columns reads the missing cells as Blank.
///
/// Fails with [`RollcallError::EmptyIdentityList`] when `rows` is empty.
#[instrument(skip_all, fields(document = %document, students = rows.len(), columns = columns.len()))]
pub fn aggregate(
    document: &str,
    rows: Vec<(StudentIdentity, Vec<CellVerdict>)>,
    columns: Vec<DateColumn>,
) -> Result<AttendanceSheet> {
    if rows.is_empty() {
        return Err(RollcallError::EmptyIdentityList {
            document: document.to_string(),
        });
    }

    let records: Vec<AttendanceRecord> = rows
        .into_iter()
        .map(|(identity, verdicts)| {
            let statuses = columns
                .iter()
                .map(|column| ColumnStatus {
                    index: column.index,
                    label: column.label.clone(),
                    status: if column.cancelled {
                        AttendanceStatus::Absent
                    } else {
                        verdicts
                            .get(column.index)
                            .copied()
                            .unwrap_or(CellVerdict::Blank)
                            .status()
                    },
                })
                .collect();
            AttendanceRecord::new(identity, statuses)
        })
        .collect();

    info!(records = records.len(), "Attendance aggregated");
    Ok(AttendanceSheet {
        document: document.to_string(),
        columns,
        records,
    })
}
