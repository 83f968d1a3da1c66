// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — first-page decoding of scanned images and PDFs.

pub mod pdf;
pub mod source;

pub use source::{FileRasterSource, RasterPage, RasterSource};
