// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration. Every threshold the segmentation and classification
// stages depend on lives here, so deployments can recalibrate without code
// changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollcallError};

/// Tunables for grid segmentation and mark classification.
///
/// The defaults are calibrated for 300 DPI scans of a typical register. The
/// density and similarity thresholds are empirical and should be validated
/// against a labelled sample set before being trusted on a new sheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Fraction of the table width occupied by the student-identity block.
    /// Sheets with wider or narrower identity columns mis-split unless this
    /// is adjusted.
    pub identity_split_fraction: f64,
    /// Height in pixels of the strip above the table holding the date labels.
    pub header_strip_height: u32,
    /// Number of date columns expected in the grid.
    pub date_columns: usize,

    /// Gaussian window radius for page, header, and grid binarization.
    pub page_block_radius: u32,
    /// Offset subtracted from the weighted mean for page, header, and grid binarization.
    pub page_offset: i32,
    /// Gaussian window radius for cell ink binarization.
    pub ink_block_radius: u32,
    /// Offset subtracted from the weighted mean for cell ink binarization.
    pub ink_offset: i32,

    /// Foreground fraction a cell must exceed to count as marked.
    ///
    /// Too low and scan noise reads as marks; too high and faint signatures
    /// read as blank.
    pub ink_density_threshold: f64,
    /// Minimum structural similarity (inclusive) for a later mark to count as
    /// consistent with the row's reference mark.
    pub similarity_threshold: f64,
    /// Canonical comparison width in pixels.
    pub canonical_width: u32,
    /// Canonical comparison height in pixels.
    pub canonical_height: u32,

    /// Minimum line length, as a fraction of the column slice width, for a
    /// header line to cancel the column.
    pub cancel_line_fraction: f64,
    /// Hough non-maximum suppression radius for header line detection.
    pub cancel_line_suppression: u32,

    /// Fraction of each cell side trimmed before classification, to keep the
    /// sheet's ruling lines out of the ink count.
    pub cell_inset_fraction: f64,

    /// Smallest row height (pixels) accepted when aligning identities to the grid.
    pub min_row_height: u32,
    /// Largest row height (pixels) accepted when aligning identities to the grid.
    pub max_row_height: Option<u32>,
    /// Fraction of the grid width a pixel row must ink to count as a
    /// horizontal ruling line between student rows.
    pub row_rule_fraction: f64,

    /// Rasterization resolution for PDF inputs.
    pub pdf_dpi: u32,
    /// Analyse student rows on the rayon thread pool.
    pub parallel_rows: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            identity_split_fraction: 0.40,
            header_strip_height: 100,
            date_columns: 7,
            page_block_radius: 5,
            page_offset: 2,
            ink_block_radius: 5,
            ink_offset: 3,
            ink_density_threshold: 0.008,
            similarity_threshold: 0.45,
            canonical_width: 100,
            canonical_height: 50,
            cancel_line_fraction: 0.6,
            cancel_line_suppression: 8,
            cell_inset_fraction: 0.10,
            min_row_height: 8,
            max_row_height: None,
            row_rule_fraction: 0.6,
            pdf_dpi: 300,
            parallel_rows: true,
        }
    }
}

impl GridConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.identity_split_fraction > 0.0 && self.identity_split_fraction < 1.0) {
            return Err(RollcallError::Config(format!(
                "identity_split_fraction must lie strictly between 0 and 1, got {}",
                self.identity_split_fraction
            )));
        }
        if self.date_columns == 0 {
            return Err(RollcallError::Config(
                "date_columns must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.ink_density_threshold) {
            return Err(RollcallError::Config(format!(
                "ink_density_threshold must lie in [0, 1), got {}",
                self.ink_density_threshold
            )));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RollcallError::Config(format!(
                "similarity_threshold must lie in [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.canonical_width < 7 || self.canonical_height < 7 {
            return Err(RollcallError::Config(format!(
                "canonical size {}x{} is smaller than the 7x7 similarity window",
                self.canonical_width, self.canonical_height
            )));
        }
        if !(self.cancel_line_fraction > 0.0 && self.cancel_line_fraction <= 1.0) {
            return Err(RollcallError::Config(format!(
                "cancel_line_fraction must lie in (0, 1], got {}",
                self.cancel_line_fraction
            )));
        }
        if !(0.0..0.5).contains(&self.cell_inset_fraction) {
            return Err(RollcallError::Config(format!(
                "cell_inset_fraction must lie in [0, 0.5), got {}",
                self.cell_inset_fraction
            )));
        }
        if let Some(max) = self.max_row_height.filter(|max| *max < self.min_row_height) {
            return Err(RollcallError::Config(format!(
                "max_row_height ({max}) is below min_row_height ({})",
                self.min_row_height
            )));
        }
        if !(self.row_rule_fraction > 0.0 && self.row_rule_fraction <= 1.0) {
            return Err(RollcallError::Config(format!(
                "row_rule_fraction must lie in (0, 1], got {}",
                self.row_rule_fraction
            )));
        }
        if self.pdf_dpi == 0 {
            return Err(RollcallError::Config("pdf_dpi must be positive".to_string()));
        }
        Ok(())
    }
}
