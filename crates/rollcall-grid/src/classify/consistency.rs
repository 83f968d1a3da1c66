// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Row consistency analyzer — compare every later mark in a row against the
// row's first mark.

use image::GrayImage;
use rollcall_core::{CellVerdict, GridConfig};
use tracing::debug;

use super::ink::classify_cell;
use super::similarity::structural_similarity;
use crate::image::processor::ImageProcessor;

/// Verdict for a later mark scoring `score` against the reference. Scores at
/// the threshold count as consistent.
pub fn judge(score: f64, threshold: f64) -> CellVerdict {
    if score >= threshold {
        CellVerdict::Consistent
    } else {
        CellVerdict::Inconsistent
    }
}

/// Classify each cell for ink, then resolve the row.
pub fn analyze_row(cells: &[GrayImage], config: &GridConfig) -> Vec<CellVerdict> {
    let marks: Vec<bool> = cells
        .iter()
        .map(|cell| classify_cell(cell, config).marked)
        .collect();
    resolve_row(cells, &marks, config)
}

/// Turn per-cell mark flags into verdicts.
///
/// The first marked cell in column order becomes the reference and is never
/// re-chosen. Every later marked cell is resized to the canonical size and
/// scored against the reference with [`structural_similarity`]. Unmarked
/// cells stay blank, so a row without marks is all blank.
pub fn resolve_row(cells: &[GrayImage], marks: &[bool], config: &GridConfig) -> Vec<CellVerdict> {
    let mut verdicts = vec![CellVerdict::Blank; cells.len()];
    let mut reference: Option<GrayImage> = None;

    for (index, cell) in cells.iter().enumerate() {
        if !marks.get(index).copied().unwrap_or(false) {
            continue;
        }
        let canonical = canonicalize(cell, config);
        match &reference {
            None => {
                debug!(column = index, "Reference mark");
                verdicts[index] = CellVerdict::Reference;
                reference = Some(canonical);
            }
            Some(baseline) => {
                let score = structural_similarity(baseline, &canonical).unwrap_or(f64::MIN);
                let verdict = judge(score, config.similarity_threshold);
                debug!(column = index, score, ?verdict, "Mark compared to reference");
                verdicts[index] = verdict;
            }
        }
    }

    verdicts
}

fn canonicalize(cell: &GrayImage, config: &GridConfig) -> GrayImage {
    ImageProcessor::from_luma(cell.clone())
        .resize_exact(config.canonical_width, config.canonical_height)
        .into_luma()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn blank() -> GrayImage {
        GrayImage::from_pixel(96, 80, Luma([255u8]))
    }

    fn horizontal_stripes() -> GrayImage {
        GrayImage::from_fn(96, 80, |_, y| Luma([if (y / 2) % 2 == 0 { 0 } else { 255 }]))
    }

    fn vertical_stripes() -> GrayImage {
        GrayImage::from_fn(96, 80, |x, _| Luma([if (x / 2) % 2 == 0 { 0 } else { 255 }]))
    }

    fn stroke() -> GrayImage {
        let mut cell = blank();
        draw_filled_rect_mut(&mut cell, Rect::at(18, 38).of_size(60, 3), Luma([0u8]));
        cell
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        assert_eq!(judge(0.45, 0.45), CellVerdict::Consistent);
        assert_eq!(judge(0.449_999, 0.45), CellVerdict::Inconsistent);
        assert_eq!(judge(0.9, 0.45), CellVerdict::Consistent);
    }

    #[test]
    fn row_without_marks_is_all_blank() {
        let cells = vec![blank(), blank(), blank()];
        assert_eq!(
            analyze_row(&cells, &GridConfig::default()),
            vec![CellVerdict::Blank; 3]
        );
    }

    #[test]
    fn single_mark_is_the_reference() {
        let cells = vec![blank(), stroke(), blank()];
        assert_eq!(
            analyze_row(&cells, &GridConfig::default()),
            vec![CellVerdict::Blank, CellVerdict::Reference, CellVerdict::Blank]
        );
    }

    #[test]
    fn repeated_signature_is_consistent() {
        let cells = vec![stroke(), blank(), stroke()];
        assert_eq!(
            analyze_row(&cells, &GridConfig::default()),
            vec![CellVerdict::Reference, CellVerdict::Blank, CellVerdict::Consistent]
        );
    }

    #[test]
    fn divergent_mark_is_inconsistent() {
        let cells = vec![horizontal_stripes(), vertical_stripes()];
        assert_eq!(
            analyze_row(&cells, &GridConfig::default()),
            vec![CellVerdict::Reference, CellVerdict::Inconsistent]
        );
    }

    #[test]
    fn reference_is_never_rechosen() {
        // The second and third marks match each other but not the first.
        let cells = vec![horizontal_stripes(), vertical_stripes(), vertical_stripes()];
        assert_eq!(
            analyze_row(&cells, &GridConfig::default()),
            vec![
                CellVerdict::Reference,
                CellVerdict::Inconsistent,
                CellVerdict::Inconsistent
            ]
        );
    }

    #[test]
    fn at_most_one_reference_per_row() {
        let cells = vec![stroke(), stroke(), horizontal_stripes(), blank()];
        let verdicts = analyze_row(&cells, &GridConfig::default());
        let references = verdicts
            .iter()
            .filter(|v| **v == CellVerdict::Reference)
            .count();
        assert_eq!(references, 1);
        assert_eq!(verdicts[0], CellVerdict::Reference);
    }

    #[test]
    fn resolve_uses_given_marks() {
        let cells = vec![stroke(), stroke()];
        assert_eq!(
            resolve_row(&cells, &[false, true], &GridConfig::default()),
            vec![CellVerdict::Blank, CellVerdict::Reference]
        );
    }
}
