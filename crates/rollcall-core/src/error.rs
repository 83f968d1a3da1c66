// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Rollcall.

use thiserror::Error;

/// Top-level error type for all Rollcall operations.
#[derive(Debug, Error)]
pub enum RollcallError {
    // -- Structural (whole-document) errors --
    #[error("no attendance table found in {document}")]
    TableNotFound { document: String },

    #[error("no students identified in {document}")]
    EmptyIdentityList { document: String },

    #[error(
        "grid rows in {document} do not line up with the identity list: \
         {students} students over {grid_height}px gives {row_height:.1}px rows"
    )]
    MisalignedGrid {
        document: String,
        students: usize,
        grid_height: u32,
        row_height: f64,
    },

    /// A zero-area crop. Stages absorb this as blank/absent; it never
    /// reaches the caller from the pipeline.
    #[error("degenerate region: {0}")]
    DegenerateRegion(String),

    // -- Raster source errors --
    #[error("could not decode document: {0}")]
    Decode(String),

    #[error("document has no pages: {0}")]
    EmptyDocument(String),

    // -- Collaborators --
    #[error("label extraction failed: {0}")]
    LabelExtraction(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RollcallError {
    /// Whether this error aborts the whole document.
    ///
    /// Per-region degeneracies are recoverable; everything structural is not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DegenerateRegion(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RollcallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_carry_document_name() {
        let err = RollcallError::TableNotFound {
            document: "week-12.pdf".into(),
        };
        assert!(err.to_string().contains("week-12.pdf"));
        assert!(err.is_fatal());
    }

    #[test]
    fn degenerate_region_is_recoverable() {
        let err = RollcallError::DegenerateRegion("cell 3 of row 2".into());
        assert!(!err.is_fatal());
    }

    #[test]
    fn misaligned_grid_formats_row_height() {
        let err = RollcallError::MisalignedGrid {
            document: "sheet.png".into(),
            students: 40,
            grid_height: 120,
            row_height: 3.0,
        };
        assert!(err.to_string().contains("3.0px"));
    }
}
