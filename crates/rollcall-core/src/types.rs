// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Rollcall attendance digitizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned rectangle in page pixel coordinates.
///
/// Regions are derived from detected geometry and may be degenerate; check
/// [`BoundingRegion::is_degenerate`] before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the region encloses no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Clamp the region so it lies inside a `width` x `height` image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Self {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// One date column of the attendance grid.
///
/// The column's position in the sheet's column list is the key into every
/// row's statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumn {
    pub index: usize,
    pub label: String,
    /// Voided by a strike-through in the header.
    pub cancelled: bool,
}

impl DateColumn {
    /// Placeholder label for a column whose header text was not recovered.
    pub fn synthetic_label(index: usize) -> String {
        format!("Date_{}", index + 1)
    }
}

/// A student as read from the identity block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub id: String,
    pub name: String,
}

impl StudentIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Per-cell outcome of mark detection and row consistency analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellVerdict {
    /// No mark found.
    Blank,
    /// The first marked cell of the row; the baseline for the rest.
    Reference,
    /// A later mark structurally similar to the reference.
    Consistent,
    /// A later mark that diverges from the reference.
    Inconsistent,
}

impl CellVerdict {
    pub fn is_mark(&self) -> bool {
        !matches!(self, Self::Blank)
    }

    /// Collapse to the reporting taxonomy.
    pub fn status(&self) -> AttendanceStatus {
        match self {
            Self::Reference | Self::Consistent => AttendanceStatus::Present,
            Self::Inconsistent => AttendanceStatus::InvalidSignature,
            Self::Blank => AttendanceStatus::Absent,
        }
    }
}

/// Reported attendance state for one student on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    InvalidSignature,
}

impl AttendanceStatus {
    /// Short literal used by tabular renderers (`P`, `AB`, `INV`).
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::Present => "P",
            Self::Absent => "AB",
            Self::InvalidSignature => "INV",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_code())
    }
}

/// Status of one column within a student's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStatus {
    pub index: usize,
    pub label: String,
    pub status: AttendanceStatus,
}

/// Final per-student attendance line. Counts and percentage are derived once
/// at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    identity: StudentIdentity,
    statuses: Vec<ColumnStatus>,
    attended_count: usize,
    total_count: usize,
    percentage: f64,
}

impl AttendanceRecord {
    pub fn new(identity: StudentIdentity, statuses: Vec<ColumnStatus>) -> Self {
        let attended_count = statuses
            .iter()
            .filter(|s| s.status == AttendanceStatus::Present)
            .count();
        let total_count = statuses.len();
        Self {
            identity,
            percentage: attendance_percentage(attended_count, total_count),
            statuses,
            attended_count,
            total_count,
        }
    }

    pub fn identity(&self) -> &StudentIdentity {
        &self.identity
    }

    pub fn statuses(&self) -> &[ColumnStatus] {
        &self.statuses
    }

    pub fn attended_count(&self) -> usize {
        self.attended_count
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

/// `attended / total * 100`, rounded to two decimals with ties to even.
/// Zero columns yields 0.
pub fn attendance_percentage(attended: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = attended as f64 / total as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

/// Result of processing one attendance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    /// Identifier of the source document (usually its path).
    pub document: String,
    pub columns: Vec<DateColumn>,
    /// One record per student, in identity-list order.
    pub records: Vec<AttendanceRecord>,
}

/// Serializable report handed to report writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub report_id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub document: String,
    /// SHA-256 of the source file, hex encoded.
    pub document_sha256: Option<String>,
    pub columns: Vec<DateColumn>,
    pub records: Vec<AttendanceRecord>,
}

impl AttendanceReport {
    pub fn from_sheet(sheet: AttendanceSheet, document_sha256: Option<String>) -> Self {
        Self {
            report_id: ReportId::new(),
            generated_at: Utc::now(),
            document: sheet.document,
            document_sha256,
            columns: sheet.columns,
            records: sheet.records,
        }
    }

    /// A well-formed report with no students.
    pub fn empty(document: impl Into<String>, document_sha256: Option<String>) -> Self {
        Self {
            report_id: ReportId::new(),
            generated_at: Utc::now(),
            document: document.into(),
            document_sha256,
            columns: Vec::new(),
            records: Vec::new(),
        }
    }
}
