// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster sources — turn a scanned image or PDF on disk into the single page
// buffer the segmentation pipeline works on.

use std::path::Path;

use image::DynamicImage;
use rollcall_core::GridConfig;
use rollcall_core::error::{Result, RollcallError};
use tracing::{info, instrument};

use super::pdf;

/// One decoded document page. Immutable once produced.
#[derive(Debug, Clone)]
pub struct RasterPage {
    document: String,
    image: DynamicImage,
}

impl RasterPage {
    /// Wrap an already-decoded page image. `document` identifies the source
    /// in error messages and reports.
    pub fn new(document: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            document: document.into(),
            image,
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Supplies the first page of a document as a pixel buffer.
pub trait RasterSource {
    /// Decode the first page of the document at `path`.
    ///
    /// Fails with [`RollcallError::Decode`] for unreadable files and
    /// [`RollcallError::EmptyDocument`] for documents without pages.
    fn first_page(&self, path: &Path) -> Result<RasterPage>;
}

/// Reads raster images with the `image` crate and scanned PDFs through their
/// embedded page image.
#[derive(Debug, Clone, Copy)]
pub struct FileRasterSource {
    pdf_dpi: u32,
}

impl FileRasterSource {
    pub fn new(pdf_dpi: u32) -> Self {
        Self { pdf_dpi }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.pdf_dpi)
    }
}

impl Default for FileRasterSource {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

impl RasterSource for FileRasterSource {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn first_page(&self, path: &Path) -> Result<RasterPage> {
        if !path.exists() {
            return Err(RollcallError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            )));
        }

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let image = if is_pdf {
            pdf::first_page_image(path, self.pdf_dpi)?
        } else {
            image::open(path).map_err(|err| {
                RollcallError::Decode(format!("failed to open {}: {}", path.display(), err))
            })?
        };

        info!(
            width = image.width(),
            height = image.height(),
            "Page raster loaded"
        );
        Ok(RasterPage::new(path.display().to_string(), image))
    }
}
