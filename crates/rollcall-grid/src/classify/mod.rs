// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Classification — ink detection per cell and signature consistency per row.

pub mod consistency;
pub mod ink;
pub mod similarity;

pub use consistency::{analyze_row, judge, resolve_row};
pub use ink::{InkReading, classify_cell, ink_density};
pub use similarity::structural_similarity;
