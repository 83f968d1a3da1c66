// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — borrowed region crops, canonical resizing, and
// sharpening for the sheet segmentation stages. Operates on in-memory images
// using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use rollcall_core::BoundingRegion;
use rollcall_core::error::{Result, RollcallError};
use tracing::{debug, instrument};

/// Image pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor` wrapping the
/// transformed image, so resizing and sharpening chain:
///
/// ```ignore
/// let canonical = ImageProcessor::from_luma(cell.clone())
///     .resize_exact(100, 50)
///     .into_luma();
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Wrap a grayscale buffer.
    pub fn from_luma(gray: GrayImage) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(gray),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Consume the processor and return an 8-bit grayscale buffer.
    pub fn into_luma(self) -> GrayImage {
        match self.image {
            DynamicImage::ImageLuma8(gray) => gray,
            other => other.to_luma8(),
        }
    }

    // -- Transformations ------------------------------------------------------

    /// Resize to exactly `width` x `height`, ignoring aspect ratio. Bilinear
    /// filtering keeps thin strokes from ringing.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let resized = self.image.resize_exact(width, height, FilterType::Triangle);
        Self { image: resized }
    }

    /// Resize with Lanczos3 filtering, for page-level rescaling.
    pub fn resize_exact_hq(self, width: u32, height: u32) -> Self {
        let resized = self.image.resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Sharpen with the 3x3 kernel `[-1 -1 -1; -1 9 -1; -1 -1 -1]` so text
    /// edges survive binarization. Output is grayscale; borders replicate the
    /// nearest pixel.
    pub fn sharpen(self) -> Self {
        let gray = self.into_luma();
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Self::from_luma(gray);
        }

        let sample = |x: i64, y: i64| -> i32 {
            let cx = x.clamp(0, width as i64 - 1) as u32;
            let cy = y.clamp(0, height as i64 - 1) as u32;
            gray.get_pixel(cx, cy).0[0] as i32
        };

        let sharpened = GrayImage::from_fn(width, height, |x, y| {
            let (x, y) = (x as i64, y as i64);
            let mut neighbours = 0i32;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx != 0 || dy != 0 {
                        neighbours += sample(x + dx, y + dy);
                    }
                }
            }
            let value = 9 * sample(x, y) - neighbours;
            Luma([value.clamp(0, 255) as u8])
        });

        Self::from_luma(sharpened)
    }
}

/// Crop `region` out of a borrowed image, clamped to its bounds.
///
/// Fails with [`RollcallError::DegenerateRegion`] when nothing of the region
/// lies inside the image; callers absorb that as an empty result.
#[instrument(skip(image), fields(x = region.x, y = region.y, w = region.width, h = region.height))]
pub fn crop_dynamic(image: &DynamicImage, region: BoundingRegion) -> Result<DynamicImage> {
    let safe = region.clamp_to(image.width(), image.height());
    if safe.is_degenerate() {
        debug!("Crop region is degenerate");
        return Err(RollcallError::DegenerateRegion(format!(
            "{}x{} at ({}, {}) inside {}x{} image",
            region.width,
            region.height,
            region.x,
            region.y,
            image.width(),
            image.height()
        )));
    }
    Ok(image.crop_imm(safe.x, safe.y, safe.width, safe.height))
}

/// Shrink `region` by `fraction` of its width and height on every side.
pub fn inset_region(region: BoundingRegion, fraction: f64) -> BoundingRegion {
    let dx = (region.width as f64 * fraction).floor() as u32;
    let dy = (region.height as f64 * fraction).floor() as u32;
    BoundingRegion {
        x: region.x + dx,
        y: region.y + dy,
        width: region.width.saturating_sub(2 * dx),
        height: region.height.saturating_sub(2 * dy),
    }
}

/// Crop a grayscale buffer, returning an empty image for degenerate regions.
pub fn crop_gray_or_empty(gray: &GrayImage, region: BoundingRegion) -> GrayImage {
    let safe = region.clamp_to(gray.width(), gray.height());
    if safe.is_degenerate() {
        return GrayImage::new(0, 0);
    }
    image::imageops::crop_imm(gray, safe.x, safe.y, safe.width, safe.height).to_image()
}
