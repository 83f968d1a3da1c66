// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization — Gaussian-weighted adaptive thresholding for ink and ruling lines,
// Otsu thresholding for OCR preparation, and the summed-area tables shared
// with the similarity metric.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

/// Foreground value in ink masks.
pub const INK: u8 = 255;

/// Summed-area table over an arbitrary per-pixel quantity.
///
/// `at(x, y)` holds the sum of the quantity over `[0, x) x [0, y)`. The table
/// has dimensions `(width+1) x (height+1)` with a zero-padded border.
pub struct IntegralTable {
    stride: usize,
    sums: Vec<f64>,
}

impl IntegralTable {
    /// Build a table over `value(x, y)` for every pixel of a `width` x `height` grid.
    pub fn build(width: u32, height: u32, value: impl Fn(u32, u32) -> f64) -> Self {
        let stride = (width + 1) as usize;
        let mut sums = vec![0.0f64; stride * (height + 1) as usize];

        for y in 0..height {
            let mut row_sum = 0.0f64;
            for x in 0..width {
                row_sum += value(x, y);
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                let above = y as usize * stride + (x + 1) as usize;
                sums[idx] = row_sum + sums[above];
            }
        }

        Self { stride, sums }
    }

    /// Sum over the half-open rectangle `[x1, x2) x [y1, y2)`.
    pub fn sum(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> f64 {
        let s = self.stride;
        self.sums[y2 * s + x2] - self.sums[y1 * s + x2] - self.sums[y2 * s + x1]
            + self.sums[y1 * s + x1]
    }
}

/// Gaussian sigma for a `(2 * radius + 1)`-pixel window, using the same
/// size-to-sigma rule as OpenCV's `getGaussianKernel` with `sigma = 0`.
pub fn window_sigma(block_radius: u32) -> f32 {
    0.3 * (block_radius as f32 - 1.0) + 0.8
}

/// Inverted adaptive threshold: pixels at least `offset` darker than their
/// Gaussian-weighted neighbourhood mean become [`INK`] (255); everything else
/// becomes 0.
///
/// `block_radius` 5 gives the 11x11 neighbourhood used for handwriting-scale
/// strokes.
pub fn binarize_inverse(gray: &GrayImage, block_radius: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let weighted_mean = gaussian_blur_f32(gray, window_sigma(block_radius));
    GrayImage::from_fn(width, height, |x, y| {
        let threshold = weighted_mean.get_pixel(x, y).0[0] as i32 - offset;
        let value = if (gray.get_pixel(x, y).0[0] as i32) <= threshold {
            INK
        } else {
            0
        };
        Luma([value])
    })
}

/// Fraction of [`INK`] pixels in a mask. Empty masks have no ink.
pub fn foreground_fraction(mask: &GrayImage) -> f64 {
    let total = mask.width() as u64 * mask.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let ink = mask.pixels().filter(|p| p.0[0] == INK).count() as u64;
    ink as f64 / total as f64
}

/// Global binarization at the Otsu threshold: dark text becomes black on a
/// white background.
pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(gray);
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let val = gray.get_pixel(x, y).0[0];
            let binary = if val <= threshold { 0u8 } else { 255u8 };
            output.put_pixel(x, y, Luma([binary]));
        }
    }

    output
}

/// Otsu threshold of `gray`; pixels at or below it are ink. An empty image
/// yields the mid-level.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    if gray.width() == 0 || gray.height() == 0 {
        return 128;
    }
    imageproc::contrast::otsu_level(gray)
}
