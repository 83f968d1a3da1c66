// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural similarity (mean SSIM) between two equally sized grayscale images.

use image::GrayImage;

use crate::image::binarize::IntegralTable;

const WINDOW: u32 = 7;
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Mean SSIM over every 7x7 window lying fully inside both images.
///
/// Returns `None` when the images differ in size or are empty. Images smaller
/// than the window are compared with a single window of their own size.
/// The score lies in roughly `[-1, 1]`; identical images score 1.
pub fn structural_similarity(a: &GrayImage, b: &GrayImage) -> Option<f64> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let px = |img: &GrayImage, x: u32, y: u32| img.get_pixel(x, y).0[0] as f64;
    let sum_a = IntegralTable::build(width, height, |x, y| px(a, x, y));
    let sum_b = IntegralTable::build(width, height, |x, y| px(b, x, y));
    let sum_aa = IntegralTable::build(width, height, |x, y| px(a, x, y).powi(2));
    let sum_bb = IntegralTable::build(width, height, |x, y| px(b, x, y).powi(2));
    let sum_ab = IntegralTable::build(width, height, |x, y| px(a, x, y) * px(b, x, y));

    let win_w = WINDOW.min(width) as usize;
    let win_h = WINDOW.min(height) as usize;
    let n = (win_w * win_h) as f64;
    let dof = if n > 1.0 { n - 1.0 } else { 1.0 };

    let mut total = 0.0f64;
    let mut windows = 0u64;
    for y in 0..=(height as usize - win_h) {
        for x in 0..=(width as usize - win_w) {
            let (x2, y2) = (x + win_w, y + win_h);
            let sa = sum_a.sum(x, y, x2, y2);
            let sb = sum_b.sum(x, y, x2, y2);

            let mu_a = sa / n;
            let mu_b = sb / n;
            let var_a = (sum_aa.sum(x, y, x2, y2) - sa * sa / n) / dof;
            let var_b = (sum_bb.sum(x, y, x2, y2) - sb * sb / n) / dof;
            let cov = (sum_ab.sum(x, y, x2, y2) - sa * sb / n) / dof;

            let numerator = (2.0 * mu_a * mu_b + C1) * (2.0 * cov + C2);
            let denominator = (mu_a * mu_a + mu_b * mu_b + C1) * (var_a + var_b + C2);
            total += numerator / denominator;
            windows += 1;
        }
    }

    Some(total / windows as f64)
}
