// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end run over a synthetic two-student, three-date attendance sheet.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use rollcall_core::{AttendanceStatus, GridConfig, StudentIdentity};
use rollcall_grid::{AttendanceEngine, FixedLabels, RasterPage};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

// Table outer edge: x in [50, 650), y in [150, 350). At the default 40% split
// the grid starts at x = 290 and each of the three date columns is 120 px wide;
// each of the two rows is 100 px tall.
const TABLE: (i32, i32, u32, u32) = (50, 150, 600, 200);
const GRID_X: u32 = 290;
const COLUMN_WIDTH: u32 = 120;
const ROW_HEIGHT: u32 = 100;

#[derive(Clone, Copy)]
enum Stroke {
    /// Horizontal bands: the student's usual signature.
    Usual,
    /// Vertical bands: structurally unlike the usual signature.
    Forged,
}

fn sheet(cancel_second_date: bool) -> RgbImage {
    let mut page = RgbImage::from_pixel(700, 400, Rgb([255, 255, 255]));

    let (x, y, w, h) = TABLE;
    for t in 0..3 {
        draw_hollow_rect_mut(
            &mut page,
            Rect::at(x + t, y + t).of_size(w - 2 * t as u32, h - 2 * t as u32),
            BLACK,
        );
    }
    // Ruling lines between identity block and dates, between dates, and
    // between the two rows.
    for col in 0..3 {
        let line_x = (GRID_X + col * COLUMN_WIDTH) as i32;
        draw_filled_rect_mut(&mut page, Rect::at(line_x, y).of_size(2, h), BLACK);
    }
    draw_filled_rect_mut(&mut page, Rect::at(x, y + ROW_HEIGHT as i32).of_size(w, 2), BLACK);

    if cancel_second_date {
        // Strike-through above the second date column.
        draw_filled_rect_mut(&mut page, Rect::at(415, 100).of_size(110, 2), BLACK);
    }

    // Student A signs dates 1 and 2 the same way.
    sign(&mut page, 0, 0, Stroke::Usual);
    sign(&mut page, 0, 1, Stroke::Usual);
    // Student B signs date 1 normally and date 2 with a different hand.
    sign(&mut page, 1, 0, Stroke::Usual);
    sign(&mut page, 1, 1, Stroke::Forged);

    page
}

/// Fill an 88x70 block inside the cell at (`row`, `column`) with 3 px bands.
fn sign(page: &mut RgbImage, row: u32, column: u32, stroke: Stroke) {
    let cell_x = GRID_X + column * COLUMN_WIDTH;
    let cell_y = TABLE.1 as u32 + row * ROW_HEIGHT;
    for dy in 0..70u32 {
        for dx in 0..88u32 {
            let band = match stroke {
                Stroke::Usual => dy / 3,
                Stroke::Forged => dx / 3,
            };
            if band % 2 == 0 {
                page.put_pixel(cell_x + 16 + dx, cell_y + 15 + dy, BLACK);
            }
        }
    }
}

fn engine() -> AttendanceEngine<FixedLabels> {
    engine_with(true)
}

fn engine_with(parallel_rows: bool) -> AttendanceEngine<FixedLabels> {
    let config = GridConfig {
        date_columns: 3,
        parallel_rows,
        ..GridConfig::default()
    };
    let labels = FixedLabels::new(
        vec![
            StudentIdentity::new("20230001", "Student A"),
            StudentIdentity::new("20230002", "Student B"),
        ],
        vec!["01/09".to_string(), "08/09".to_string()],
    );
    AttendanceEngine::new(config, labels).expect("engine")
}

fn statuses(sheet: &rollcall_core::AttendanceSheet, student: usize) -> Vec<AttendanceStatus> {
    sheet.records[student]
        .statuses()
        .iter()
        .map(|s| s.status)
        .collect()
}

#[test]
fn cancelled_date_overrides_every_student() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sheet.png");
    sheet(true).save(&path).expect("save sheet");

    let sheet = engine().process_file(&path).expect("process sheet");

    let labels: Vec<&str> = sheet.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["01/09", "08/09", "Date_3"]);
    let cancelled: Vec<bool> = sheet.columns.iter().map(|c| c.cancelled).collect();
    assert_eq!(cancelled, vec![false, true, false]);

    use AttendanceStatus::*;
    assert_eq!(statuses(&sheet, 0), vec![Present, Absent, Absent]);
    assert_eq!(statuses(&sheet, 1), vec![Present, Absent, Absent]);
    for record in &sheet.records {
        assert_eq!(record.attended_count(), 1);
        assert_eq!(record.total_count(), 3);
        assert_eq!(record.percentage(), 33.33);
    }
    assert_eq!(sheet.records[0].identity().id, "20230001");
    assert_eq!(sheet.records[1].identity().id, "20230002");
}

#[test]
fn forged_mark_is_invalid_without_cancellation() {
    let page = RasterPage::new("sheet.png", DynamicImage::ImageRgb8(sheet(false)));

    let sheet = engine().process_page(&page).expect("process sheet");

    assert!(sheet.columns.iter().all(|c| !c.cancelled));

    use AttendanceStatus::*;
    assert_eq!(statuses(&sheet, 0), vec![Present, Present, Absent]);
    assert_eq!(sheet.records[0].percentage(), 66.67);
    assert_eq!(statuses(&sheet, 1), vec![Present, InvalidSignature, Absent]);
    assert_eq!(sheet.records[1].percentage(), 33.33);
}

#[test]
fn marked_sheet_is_deterministic_across_runs_and_modes() {
    let page = RasterPage::new("sheet.png", DynamicImage::ImageRgb8(sheet(false)));

    let first = engine_with(true).process_page(&page).expect("first parallel run");
    let second = engine_with(true).process_page(&page).expect("second parallel run");
    let sequential = engine_with(false).process_page(&page).expect("sequential run");

    assert_eq!(first.records, second.records);
    assert_eq!(first.records, sequential.records);
    assert_eq!(first.columns, sequential.columns);
    assert_eq!(
        statuses(&sequential, 1)[1],
        AttendanceStatus::InvalidSignature
    );
}
