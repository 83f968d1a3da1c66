// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table locator — the attendance grid is the largest closed outline on the
// page.

use image::GrayImage;
use imageproc::contours::{Contour, find_contours};
use imageproc::point::Point;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::{BoundingRegion, GridConfig};
use tracing::{debug, info, instrument};

use crate::image::binarize::binarize_inverse;

/// Find the bounding rectangle of the attendance table on a page.
///
/// The page is binarized, outer contours are traced, and the contour with the
/// largest enclosed area wins. Ties keep the first contour found.
///
/// Fails with [`RollcallError::TableNotFound`] when the page has no
/// foreground at all.
#[instrument(skip(gray, config), fields(width = gray.width(), height = gray.height()))]
pub fn locate_table(gray: &GrayImage, config: &GridConfig, document: &str) -> Result<BoundingRegion> {
    let binary = binarize_inverse(gray, config.page_block_radius, config.page_offset);
    let contours = find_contours::<u32>(&binary);
    debug!(contours = contours.len(), "Contours traced");

    let mut best: Option<(f64, &Contour<u32>)> = None;
    for contour in contours.iter().filter(|c| c.parent.is_none()) {
        if contour.points.is_empty() {
            continue;
        }
        let area = polygon_area(&contour.points);
        if best.is_none_or(|(most, _)| area > most) {
            best = Some((area, contour));
        }
    }

    let (area, contour) = best.ok_or_else(|| RollcallError::TableNotFound {
        document: document.to_string(),
    })?;
    let region = bounding_rect(&contour.points);

    info!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        area,
        "Table located"
    );
    Ok(region)
}

/// Area enclosed by a closed polygon, by the shoelace formula. The vertices
/// may wind either way.
pub fn polygon_area(points: &[Point<u32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x as f64 * points[j].y as f64;
        area -= points[j].x as f64 * points[i].y as f64;
    }
    area.abs() / 2.0
}

/// Smallest upright rectangle containing every point, inclusive of the
/// extreme pixels.
fn bounding_rect(points: &[Point<u32>]) -> BoundingRegion {
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0);
    BoundingRegion::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}
