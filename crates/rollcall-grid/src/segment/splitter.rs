// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region splitter — carve the located table into the identity block, the
// attendance grid, and the header strip above the grid.

use rollcall_core::{BoundingRegion, GridConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The three working regions of an attendance sheet, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRegions {
    pub table: BoundingRegion,
    /// Left part of the table holding student ids and names.
    pub identity: BoundingRegion,
    /// Right part of the table holding one cell per student and date.
    pub grid: BoundingRegion,
    /// Fixed-height strip directly above the grid, where date labels and
    /// cancellation strokes live. Empty when the table touches the page top.
    pub header: BoundingRegion,
}

/// Split `table` at `identity_split_fraction` of its width.
///
/// The split point is a tunable, not a detected feature: sheets whose identity
/// columns are wider or narrower than the fraction will mis-split.
pub fn split_regions(table: BoundingRegion, config: &GridConfig) -> SheetRegions {
    let offset = (table.width as f64 * config.identity_split_fraction).floor() as u32;
    let offset = offset.min(table.width);
    let split_x = table.x + offset;

    let identity = BoundingRegion::new(table.x, table.y, offset, table.height);
    let grid = BoundingRegion::new(split_x, table.y, table.width - offset, table.height);

    let header_top = table.y.saturating_sub(config.header_strip_height);
    let header = BoundingRegion::new(split_x, header_top, grid.width, table.y - header_top);
    if header.is_degenerate() {
        warn!("Table touches the top of the page; header strip is empty");
    }

    debug!(split_x, header_top, "Table split");
    SheetRegions {
        table,
        identity,
        grid,
        header,
    }
}
