// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the staff who upload attendance sheets.
//
// Each engine error maps to a message and a next step the operator can take.

use crate::error::RollcallError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The scan itself is the problem; rescan or fix the sheet.
    Rescan,
    /// Something the operator can correct (settings, roster, file choice).
    ActionRequired,
    /// Cannot be fixed from the operator's side.
    Permanent,
}

/// A human-readable error with a plain English message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `RollcallError` into a `HumanError` suitable for an end user.
pub fn humanize_error(err: &RollcallError) -> HumanError {
    match err {
        RollcallError::TableNotFound { document } => HumanError {
            message: format!("We couldn't find an attendance table in {document}."),
            suggestion: "Check that the page isn't blank and that the table's outer border is fully visible in the scan.".into(),
            severity: Severity::Rescan,
        },

        RollcallError::EmptyIdentityList { document } => HumanError {
            message: format!("No students were recognised in {document}."),
            suggestion: "Make sure the ID and name columns are legible, or supply a roster file for this class.".into(),
            severity: Severity::ActionRequired,
        },

        RollcallError::MisalignedGrid {
            students,
            document,
            ..
        } => HumanError {
            message: format!(
                "The {students} students found in {document} don't line up with the signature rows."
            ),
            suggestion: "Some names may have been missed or read twice. Check the roster, or rescan the sheet straight and uncropped.".into(),
            severity: Severity::ActionRequired,
        },

        RollcallError::DegenerateRegion(_) => HumanError {
            message: "Part of the sheet was too small to read.".into(),
            suggestion: "Rescan at a higher resolution.".into(),
            severity: Severity::Rescan,
        },

        RollcallError::Decode(_) => HumanError {
            message: "This file couldn't be opened as an image or scanned PDF.".into(),
            suggestion: "Try saving the scan as a PNG, JPEG, or PDF and upload it again.".into(),
            severity: Severity::ActionRequired,
        },

        RollcallError::EmptyDocument(_) => HumanError {
            message: "This document has no pages.".into(),
            suggestion: "Check that you picked the right file.".into(),
            severity: Severity::ActionRequired,
        },

        RollcallError::LabelExtraction(detail) => HumanError {
            message: "Student names and dates couldn't be read.".into(),
            suggestion: format!("Supply a roster file, or make sure text recognition is installed. ({detail})"),
            severity: Severity::ActionRequired,
        },

        RollcallError::Config(detail) => HumanError {
            message: "The settings file has an invalid value.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        RollcallError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The scan or one of the input files doesn't exist.".into(),
                suggestion: "Check the path you passed on the command line.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Rollcall doesn't have permission to use that file or folder.".into(),
                suggestion: "Check the permissions, or pick a different output folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading the scan or writing the report failed.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                severity: Severity::Permanent,
            },
        },

        RollcallError::Serialization(_) => HumanError {
            message: "A settings or roster file isn't valid JSON.".into(),
            suggestion: "Check the file for typos such as missing commas or quotes.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
