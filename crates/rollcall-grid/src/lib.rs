// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// rollcall-grid — Attendance-sheet analysis for Rollcall.
//
// Locates the attendance table on a scanned page, splits it into the identity
// block, the date grid, and the header strip, detects cancelled date columns,
// slices the grid into per-student cells, decides which cells carry a mark,
// checks each student's marks against their first one, and aggregates the
// verdicts into attendance records.

pub mod aggregate;
pub mod classify;
pub mod image;
pub mod labels;
pub mod pipeline;
pub mod raster;
pub mod segment;

// Re-export the primary entry points so callers can use `rollcall_grid::AttendanceEngine` etc.
pub use aggregate::aggregate;
pub use crate::image::processor::ImageProcessor;
pub use labels::{FixedLabels, LabelExtractor, Roster};
pub use pipeline::AttendanceEngine;
pub use raster::{FileRasterSource, RasterPage, RasterSource};
pub use segment::SheetRegions;

#[cfg(feature = "ocr")]
pub use labels::ocr::{OcrConfig, OcrLabelExtractor};
