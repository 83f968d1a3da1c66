// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Column state detector — a date column is cancelled when its header slice
// carries a long straight stroke.

use image::GrayImage;
use imageproc::hough::{LineDetectionOptions, detect_lines};
use rollcall_core::{BoundingRegion, GridConfig};
use tracing::{debug, info, instrument};

use super::equal_slices;
use crate::image::binarize::binarize_inverse;
use crate::image::processor::crop_gray_or_empty;

/// Flag each of the `columns` header slices as cancelled or not.
///
/// The strip is cut into equal-width slices (last slice takes the remainder),
/// each slice is binarized, and a Hough transform looks for a straight line at
/// least `cancel_line_fraction` of the slice width long. Any hit cancels the
/// column. Strong edges in the date text itself can trigger false positives;
/// nothing suppresses them.
///
/// Always returns exactly `columns` flags. A degenerate header yields all
/// `false`.
#[instrument(skip(header, config), fields(width = header.width(), height = header.height()))]
pub fn detect_cancelled_columns(header: &GrayImage, columns: usize, config: &GridConfig) -> Vec<bool> {
    if header.width() == 0 || header.height() == 0 {
        debug!("Header strip is empty; no column can be cancelled");
        return vec![false; columns];
    }

    let flags: Vec<bool> = equal_slices(header.width(), columns)
        .into_iter()
        .enumerate()
        .map(|(index, (start, width))| {
            let slice = crop_gray_or_empty(header, BoundingRegion::new(start, 0, width, header.height()));
            let cancelled = slice_has_line(&slice, config);
            debug!(column = index, start, width, cancelled, "Header slice checked");
            cancelled
        })
        .collect();

    info!(
        cancelled = flags.iter().filter(|c| **c).count(),
        columns, "Column states detected"
    );
    flags
}

fn slice_has_line(slice: &GrayImage, config: &GridConfig) -> bool {
    if slice.width() == 0 || slice.height() == 0 {
        return false;
    }
    let edges = binarize_inverse(slice, config.page_block_radius, config.page_offset);
    let vote_threshold = ((slice.width() as f64 * config.cancel_line_fraction).ceil() as u32).max(1);
    let options = LineDetectionOptions {
        vote_threshold,
        suppression_radius: config.cancel_line_suppression,
    };
    !detect_lines(&edges, options).is_empty()
}
