// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cell classifier — is anything written in this cell?

use image::GrayImage;
use rollcall_core::GridConfig;
use serde::{Deserialize, Serialize};

use crate::image::binarize::{binarize_inverse, foreground_fraction};

/// Ink measurement of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkReading {
    /// Fraction of the cell covered by ink, in `[0, 1]`.
    pub density: f64,
    /// `density` strictly above `ink_density_threshold`.
    pub marked: bool,
}

/// Fraction of ink pixels after adaptive binarization with the ink window.
pub fn ink_density(cell: &GrayImage, config: &GridConfig) -> f64 {
    if cell.width() == 0 || cell.height() == 0 {
        return 0.0;
    }
    let mask = binarize_inverse(cell, config.ink_block_radius, config.ink_offset);
    foreground_fraction(&mask)
}

/// Measure a cell and decide whether it holds a mark. Empty cells are blank.
pub fn classify_cell(cell: &GrayImage, config: &GridConfig) -> InkReading {
    let density = ink_density(cell, config);
    InkReading {
        density,
        marked: density > config.ink_density_threshold,
    }
}
