// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Attendance engine — runs one document through location, splitting, label
// extraction, column detection, row alignment, classification, and
// aggregation.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::{AttendanceSheet, BoundingRegion, CellVerdict, GridConfig, StudentIdentity};
use tracing::{debug, info, instrument};

use crate::aggregate::aggregate;
use crate::classify::analyze_row;
use crate::image::processor::{crop_dynamic, crop_gray_or_empty};
use crate::labels::{LabelExtractor, build_columns};
use crate::raster::{FileRasterSource, RasterPage, RasterSource};
use crate::segment::{
    RowLayout, StudentRow, align_rows, detect_cancelled_columns, locate_table, segment_row,
    split_regions,
};

/// Processes attendance sheets with a fixed configuration, label extractor,
/// and raster source.
///
/// The label extractor is injected so a roster or a stub can stand in for OCR.
pub struct AttendanceEngine<L, S = FileRasterSource> {
    config: GridConfig,
    labels: L,
    source: S,
}

impl<L: LabelExtractor> AttendanceEngine<L, FileRasterSource> {
    /// Build an engine reading files from disk. Fails with
    /// [`RollcallError::Config`] for an invalid configuration.
    pub fn new(config: GridConfig, labels: L) -> Result<Self> {
        let source = FileRasterSource::from_config(&config);
        Self::with_source(config, labels, source)
    }
}

impl<L: LabelExtractor, S: RasterSource> AttendanceEngine<L, S> {
    pub fn with_source(config: GridConfig, labels: L, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            labels,
            source,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Decode the first page of `path` and process it.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> Result<AttendanceSheet> {
        let page = self.source.first_page(path)?;
        self.process_page(&page)
    }

    /// Process one decoded page into per-student attendance.
    ///
    /// Fails with [`RollcallError::TableNotFound`] for pages without a table,
    /// [`RollcallError::EmptyIdentityList`] when no student is read from the
    /// identity block, and [`RollcallError::MisalignedGrid`] when the grid
    /// cannot hold that many rows.
    #[instrument(skip_all, fields(document = %page.document()))]
    pub fn process_page(&self, page: &RasterPage) -> Result<AttendanceSheet> {
        let config = &self.config;
        let document = page.document();
        let gray = page.image().to_luma8();

        let table = locate_table(&gray, config, document)?;
        let regions = split_regions(table, config);

        let identity_block = crop_or_empty(page.image(), regions.identity);
        let identities = self.labels.student_identities(&identity_block)?;
        if identities.is_empty() {
            return Err(RollcallError::EmptyIdentityList {
                document: document.to_string(),
            });
        }
        info!(students = identities.len(), "Identities extracted");

        let header = crop_or_empty(page.image(), regions.header);
        let cancelled = detect_cancelled_columns(&header.to_luma8(), config.date_columns, config);
        let columns = build_columns(self.labels.date_labels(&header)?, &cancelled);

        let grid_image = crop_gray_or_empty(&gray, regions.grid);
        let layout = align_rows(&grid_image, regions.grid, identities.len(), config, document)?;
        let rows = self.analyze_rows(&gray, &layout, identities);

        aggregate(document, rows, columns)
    }

    /// Segment and classify every row, keeping identity order.
    fn analyze_rows(
        &self,
        gray: &GrayImage,
        layout: &RowLayout,
        identities: Vec<StudentIdentity>,
    ) -> Vec<(StudentIdentity, Vec<CellVerdict>)> {
        let config = &self.config;
        let analyze = |(index, identity): (usize, StudentIdentity)| {
            let cells = segment_row(gray, layout, index, config.date_columns, config);
            let row = StudentRow::new(identity, cells, config.date_columns);
            let verdicts = analyze_row(row.cells(), config);
            debug!(row = index, id = %row.identity().id, ?verdicts, "Row analyzed");
            (row.identity().clone(), verdicts)
        };

        if config.parallel_rows {
            identities.into_par_iter().enumerate().map(analyze).collect()
        } else {
            identities.into_iter().enumerate().map(analyze).collect()
        }
    }
}

/// Crop a page region, falling back to an empty image when the region is
/// degenerate.
fn crop_or_empty(image: &DynamicImage, region: BoundingRegion) -> DynamicImage {
    match crop_dynamic(image, region) {
        Ok(cropped) => cropped,
        Err(err) => {
            debug!(%err, "Region absorbed as empty");
            DynamicImage::new_luma8(0, 0)
        }
    }
}
