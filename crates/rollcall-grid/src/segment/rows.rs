// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Row segmenter — explicit alignment of the grid with the identity list, then
// per-row slicing into one cell image per date column.

use image::GrayImage;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::{BoundingRegion, GridConfig, StudentIdentity};
use tracing::{debug, info, instrument, warn};

use super::equal_slices;
use crate::image::binarize::{INK, binarize_inverse};
use crate::image::processor::{crop_gray_or_empty, inset_region};

/// Row geometry of the attendance grid, established against the number of
/// students read from the identity block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub grid: BoundingRegion,
    pub rows: usize,
    pub row_height: f64,
}

impl RowLayout {
    /// Pixel span `[start, end)` of row `index`, relative to the grid top.
    ///
    /// Each bound is computed from the row's own index so rounding never
    /// accumulates down the sheet.
    pub fn row_span(&self, index: usize) -> (u32, u32) {
        let start = (index as f64 * self.row_height).floor() as u32;
        let end = if index + 1 >= self.rows {
            self.grid.height
        } else {
            ((index + 1) as f64 * self.row_height).floor() as u32
        };
        (start.min(self.grid.height), end.min(self.grid.height))
    }

    /// Row `index` in page coordinates.
    pub fn row_region(&self, index: usize) -> BoundingRegion {
        let (start, end) = self.row_span(index);
        BoundingRegion::new(
            self.grid.x,
            self.grid.y + start,
            self.grid.width,
            end.saturating_sub(start),
        )
    }
}

/// Establish the row layout for `students` rows in `grid`.
///
/// `grid_image` is the grid region cropped from the page. Two checks tie the
/// identity list to the grid, and either failing yields
/// [`RollcallError::MisalignedGrid`]:
///
/// - the row height must lie within `min_row_height` and `max_row_height`
///   (when set);
/// - when the grid carries horizontal ruling lines, the number of ruled rows
///   must equal `students`. A grid without interior rulings is accepted on
///   the height check alone.
///
/// A degenerate grid skips both checks; every row then segments to empty cells.
#[instrument(skip(grid_image, config))]
pub fn align_rows(
    grid_image: &GrayImage,
    grid: BoundingRegion,
    students: usize,
    config: &GridConfig,
    document: &str,
) -> Result<RowLayout> {
    if students == 0 {
        return Err(RollcallError::EmptyIdentityList {
            document: document.to_string(),
        });
    }

    let row_height = grid.height as f64 / students as f64;
    let layout = RowLayout {
        grid,
        rows: students,
        row_height,
    };

    if grid.is_degenerate() {
        warn!("Grid region is degenerate; every cell will read as blank");
        return Ok(layout);
    }

    let misaligned = || RollcallError::MisalignedGrid {
        document: document.to_string(),
        students,
        grid_height: grid.height,
        row_height,
    };

    let too_short = row_height < config.min_row_height as f64;
    let too_tall = config
        .max_row_height
        .is_some_and(|max| row_height > max as f64);
    if too_short || too_tall {
        return Err(misaligned());
    }

    let rulings = detect_row_rulings(grid_image, config);
    if rulings.is_empty() {
        debug!("No interior row rulings; alignment rests on row height");
    } else if rulings.len() + 1 != students {
        warn!(
            students,
            ruled_rows = rulings.len() + 1,
            "Identity count disagrees with the ruled grid"
        );
        return Err(misaligned());
    }

    info!(students, row_height, "Rows aligned with identity list");
    Ok(layout)
}

/// Offsets from the grid top of the interior horizontal ruling lines.
///
/// A pixel row is ruled when at least `row_rule_fraction` of it is ink.
/// Consecutive ruled pixel rows form one line, reported at its centre. Lines
/// closer than `min_row_height` to the top or bottom edge belong to the table
/// border and are dropped.
pub fn detect_row_rulings(grid_image: &GrayImage, config: &GridConfig) -> Vec<u32> {
    let (width, height) = grid_image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mask = binarize_inverse(grid_image, config.page_block_radius, config.page_offset);
    let needed = ((width as f64 * config.row_rule_fraction).ceil() as usize).max(1);
    let is_ruled = |y: u32| (0..width).filter(|&x| mask.get_pixel(x, y).0[0] == INK).count() >= needed;

    let mut lines = Vec::new();
    let mut run_start: Option<u32> = None;
    for y in 0..=height {
        let ruled = y < height && is_ruled(y);
        match (ruled, run_start) {
            (true, None) => run_start = Some(y),
            (false, Some(start)) => {
                lines.push(start + (y - start) / 2);
                run_start = None;
            }
            _ => {}
        }
    }

    let margin = config.min_row_height;
    lines.retain(|&centre| centre >= margin && centre.saturating_add(margin) <= height);
    debug!(lines = lines.len(), "Row rulings detected");
    lines
}

/// Cut row `index` of `page` into `columns` cell images.
///
/// Cells use the same equal-width rule as the header slices, then are inset by
/// `cell_inset_fraction` on each side to drop ruling lines. A degenerate row,
/// grid, or zero `columns` yields an empty vector.
pub fn segment_row(
    page: &GrayImage,
    layout: &RowLayout,
    index: usize,
    columns: usize,
    config: &GridConfig,
) -> Vec<GrayImage> {
    let row = layout.row_region(index);
    if row.is_degenerate() || columns == 0 {
        debug!(row = index, "Degenerate row; no cells");
        return Vec::new();
    }

    equal_slices(row.width, columns)
        .into_iter()
        .map(|(start, width)| {
            let cell = BoundingRegion::new(row.x + start, row.y, width, row.height);
            crop_gray_or_empty(page, inset_region(cell, config.cell_inset_fraction))
        })
        .collect()
}

/// One student's identity and the cell images of their row.
#[derive(Debug, Clone)]
pub struct StudentRow {
    identity: StudentIdentity,
    cells: Vec<GrayImage>,
}

impl StudentRow {
    /// Build a row holding exactly `columns` cells. Missing cells are filled
    /// with empty images (which classify as blank); surplus cells are dropped.
    pub fn new(identity: StudentIdentity, mut cells: Vec<GrayImage>, columns: usize) -> Self {
        if cells.len() != columns {
            debug!(
                id = %identity.id,
                got = cells.len(),
                columns,
                "Padding row to column count"
            );
        }
        cells.resize_with(columns, || GrayImage::new(0, 0));
        Self { identity, cells }
    }

    pub fn identity(&self) -> &StudentIdentity {
        &self.identity
    }

    pub fn cells(&self) -> &[GrayImage] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn doc() -> &'static str {
        "sheet.png"
    }

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255u8]))
    }

    /// A white grid with the outer border and a 2 px rule every `row` pixels.
    fn ruled_grid(width: u32, height: u32, row: u32) -> GrayImage {
        let mut grid = blank(width, height);
        let dark = |y: u32| y < 3 || y + 3 >= height || (y % row < 2 && y >= row);
        for y in (0..height).filter(|&y| dark(y)) {
            for x in 0..width {
                grid.put_pixel(x, y, Luma([0u8]));
            }
        }
        grid
    }

    #[test]
    fn row_spans_do_not_drift() {
        let layout = align_rows(
            &blank(90, 100),
            BoundingRegion::new(0, 0, 90, 100),
            3,
            &GridConfig::default(),
            doc(),
        )
        .expect("aligned");
        assert_eq!(layout.row_span(0), (0, 33));
        assert_eq!(layout.row_span(1), (33, 66));
        assert_eq!(layout.row_span(2), (66, 100));
    }

    #[test]
    fn too_many_students_for_the_grid_is_misaligned() {
        let err = align_rows(
            &blank(90, 40),
            BoundingRegion::new(0, 0, 90, 40),
            10,
            &GridConfig::default(),
            doc(),
        )
        .unwrap_err();
        match err {
            RollcallError::MisalignedGrid {
                students,
                grid_height,
                row_height,
                ..
            } => {
                assert_eq!(students, 10);
                assert_eq!(grid_height, 40);
                assert!((row_height - 4.0).abs() < 1e-9);
            }
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn max_row_height_catches_undercounted_students() {
        let config = GridConfig {
            max_row_height: Some(60),
            ..GridConfig::default()
        };
        let result = align_rows(
            &blank(90, 400),
            BoundingRegion::new(0, 0, 90, 400),
            2,
            &config,
            doc(),
        );
        assert!(matches!(result, Err(RollcallError::MisalignedGrid { .. })));
    }

    #[test]
    fn no_students_is_an_empty_identity_list() {
        let result = align_rows(
            &blank(90, 400),
            BoundingRegion::new(0, 0, 90, 400),
            0,
            &GridConfig::default(),
            doc(),
        );
        assert!(matches!(result, Err(RollcallError::EmptyIdentityList { .. })));
    }

    #[test]
    fn segments_inset_cells() {
        let page = GrayImage::from_pixel(400, 300, Luma([255u8]));
        let layout = align_rows(
            &blank(360, 200),
            BoundingRegion::new(40, 100, 360, 200),
            2,
            &GridConfig::default(),
            doc(),
        )
        .expect("aligned");
        let cells = segment_row(&page, &layout, 1, 3, &GridConfig::default());
        assert_eq!(cells.len(), 3);
        // 120x100 cells inset by 10% per side.
        assert!(cells.iter().all(|c| c.dimensions() == (96, 80)));
    }

    #[test]
    fn degenerate_grid_yields_empty_rows() {
        let page = GrayImage::from_pixel(100, 100, Luma([255u8]));
        let layout = align_rows(
            &blank(0, 100),
            BoundingRegion::new(100, 0, 0, 100),
            2,
            &GridConfig::default(),
            doc(),
        )
        .expect("degenerate grid is not an alignment failure");
        assert!(segment_row(&page, &layout, 0, 3, &GridConfig::default()).is_empty());
    }

    #[test]
    fn zero_columns_yields_empty_row() {
        let page = GrayImage::from_pixel(100, 100, Luma([255u8]));
        let layout = align_rows(
            &blank(100, 100),
            BoundingRegion::new(0, 0, 100, 100),
            2,
            &GridConfig::default(),
            doc(),
        )
        .expect("aligned");
        assert!(segment_row(&page, &layout, 0, 0, &GridConfig::default()).is_empty());
    }

    #[test]
    fn student_row_is_padded_to_column_count() {
        let row = StudentRow::new(StudentIdentity::new("20231234", "Ada"), Vec::new(), 4);
        assert_eq!(row.cells().len(), 4);
        assert!(row.cells().iter().all(|c| c.dimensions() == (0, 0)));
    }

    #[test]
    fn rulings_are_found_between_rows() {
        let grid = ruled_grid(360, 300, 100);
        let lines = detect_row_rulings(&grid, &GridConfig::default());
        assert_eq!(lines, vec![101, 201]);
    }

    #[test]
    fn signature_strokes_are_not_rulings() {
        let mut grid = blank(360, 200);
        for y in 60..63 {
            for x in 20..140 {
                grid.put_pixel(x, y, Luma([0u8]));
            }
        }
        assert!(detect_row_rulings(&grid, &GridConfig::default()).is_empty());
    }

    #[test]
    fn roster_short_of_ruled_rows_is_misaligned() {
        let grid = ruled_grid(360, 300, 100);
        let region = BoundingRegion::new(0, 0, 360, 300);
        let result = align_rows(&grid, region, 2, &GridConfig::default(), doc());
        assert!(matches!(
            result,
            Err(RollcallError::MisalignedGrid { students: 2, grid_height: 300, .. })
        ));

        let result = align_rows(&grid, region, 4, &GridConfig::default(), doc());
        assert!(matches!(result, Err(RollcallError::MisalignedGrid { .. })));
    }

    #[test]
    fn roster_matching_ruled_rows_is_aligned() {
        let grid = ruled_grid(360, 300, 100);
        let region = BoundingRegion::new(0, 0, 360, 300);
        let layout = align_rows(&grid, region, 3, &GridConfig::default(), doc()).expect("aligned");
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.row_span(1), (100, 200));
    }
}
