// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segmentation — table location, region splitting, cancelled-column
// detection, and row/cell slicing.

pub mod columns;
pub mod locator;
pub mod rows;
pub mod splitter;

pub use columns::detect_cancelled_columns;
pub use locator::locate_table;
pub use rows::{RowLayout, StudentRow, align_rows, segment_row};
pub use splitter::{SheetRegions, split_regions};

/// Divide `total` pixels into `count` equal slices by integer division.
///
/// Returns `(start, length)` pairs in order. The last slice absorbs the
/// remainder so the slices always cover `[0, total)` exactly. Both the header
/// strip and every grid row use this rule, which keeps column indices aligned
/// between them.
pub fn equal_slices(total: u32, count: usize) -> Vec<(u32, u32)> {
    if count == 0 {
        return Vec::new();
    }
    let step = total / count as u32;
    (0..count as u32)
        .map(|i| {
            let start = i * step;
            let length = if i + 1 == count as u32 {
                total - start
            } else {
                step
            };
            (start, length)
        })
        .collect()
}
