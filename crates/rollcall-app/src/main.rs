// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollcall — command-line attendance-sheet digitizer.
//
// Reads one scanned attendance sheet (image or PDF), runs the grid engine,
// and writes a timestamped JSON report.

mod digest;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::human_errors::humanize_error;
use rollcall_core::{AttendanceReport, GridConfig};
use rollcall_grid::{AttendanceEngine, FixedLabels, LabelExtractor};

/// Digitize a scanned attendance sheet into per-student attendance.
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scanned attendance sheet (PNG, JPEG, TIFF, or scanned PDF)
    input: PathBuf,

    /// Directory the JSON report is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// JSON file overriding grid tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON roster of students (and optionally dates) instead of OCR
    #[arg(short, long)]
    roster: Option<PathBuf>,

    /// Number of date columns on the sheet
    #[arg(short, long)]
    dates: Option<usize>,

    /// Directory holding the OCR models
    #[cfg(feature = "ocr")]
    #[arg(long)]
    models: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(input = %args.input.display(), "Rollcall starting");

    match run(&args) {
        Ok(path) => {
            println!("Report written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, severity = ?human.severity, "Processing failed");
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf> {
    let mut config = match &args.config {
        Some(path) => GridConfig::from_json_file(path)?,
        None => GridConfig::default(),
    };
    if let Some(dates) = args.dates {
        config.date_columns = dates;
    }

    let sha256 = digest::hash_file(&args.input)?;
    let report = match &args.roster {
        Some(roster) => analyse(&args.input, config, FixedLabels::from_json_file(roster)?, sha256)?,
        None => analyse_with_ocr(args, config, sha256)?,
    };

    for line in report::summary_lines(&report) {
        println!("{line}");
    }
    report::write_report(&report, &args.output_dir)
}

/// Run the engine; a sheet with no students still produces an empty report.
fn analyse<L: LabelExtractor>(
    input: &Path,
    config: GridConfig,
    labels: L,
    sha256: String,
) -> Result<AttendanceReport> {
    let engine = AttendanceEngine::new(config, labels)?;
    match engine.process_file(input) {
        Ok(sheet) => Ok(AttendanceReport::from_sheet(sheet, Some(sha256))),
        Err(RollcallError::EmptyIdentityList { document }) => {
            tracing::warn!(%document, "No students found; writing an empty report");
            Ok(AttendanceReport::empty(document, Some(sha256)))
        }
        Err(err) => Err(err),
    }
}

#[cfg(feature = "ocr")]
fn analyse_with_ocr(args: &Args, config: GridConfig, sha256: String) -> Result<AttendanceReport> {
    use rollcall_grid::{OcrConfig, OcrLabelExtractor};

    let ocr_config = match &args.models {
        Some(dir) => OcrConfig::from_dir(dir),
        None => OcrConfig::default(),
    };
    analyse(&args.input, config, OcrLabelExtractor::new(ocr_config)?, sha256)
}

#[cfg(not(feature = "ocr"))]
fn analyse_with_ocr(_args: &Args, _config: GridConfig, _sha256: String) -> Result<AttendanceReport> {
    Err(RollcallError::LabelExtraction(
        "no roster given and this build has no OCR support; pass --roster or rebuild with \
         --features ocr"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn parses_full_command_line() {
        let args = Args::try_parse_from([
            "rollcall",
            "sheet.pdf",
            "--output-dir",
            "out",
            "--roster",
            "class.json",
            "--dates",
            "5",
        ])
        .expect("valid arguments");
        assert_eq!(args.input, PathBuf::from("sheet.pdf"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.roster, Some(PathBuf::from("class.json")));
        assert_eq!(args.dates, Some(5));
        assert!(args.config.is_none());
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["rollcall"]).is_err());
    }

    #[test]
    fn missing_input_fails_before_analysis() {
        let args = Args::try_parse_from(["rollcall", "/nonexistent/rollcall/sheet.png"])
            .expect("valid arguments");
        assert!(matches!(run(&args), Err(RollcallError::Io(_))));
    }

    #[test]
    fn blank_sheet_with_roster_reports_table_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sheet = dir.path().join("blank.png");
        image_blank(&sheet);
        let roster = dir.path().join("roster.json");
        std::fs::write(&roster, r#"{"students":[{"id":"20230001","name":"Ada"}]}"#)
            .expect("write roster");

        let result = analyse(
            &sheet,
            GridConfig::default(),
            FixedLabels::from_json_file(&roster).expect("roster"),
            String::new(),
        );
        assert!(matches!(result, Err(RollcallError::TableNotFound { .. })));
    }

    #[test]
    fn empty_roster_yields_empty_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sheet = dir.path().join("sheet.png");
        ruled_sheet(&sheet);

        let report = analyse(&sheet, GridConfig::default(), FixedLabels::default(), "ab".into())
            .expect("empty report");
        assert!(report.records.is_empty());
        assert_eq!(report.document_sha256.as_deref(), Some("ab"));
    }

    fn image_blank(path: &Path) {
        GrayImage::from_pixel(200, 120, Luma([255u8]))
            .save(path)
            .expect("write png");
    }

    /// A white page with a 3 px table outline and no marks.
    fn ruled_sheet(path: &Path) {
        let mut page = GrayImage::from_pixel(400, 300, Luma([255u8]));
        for x in 20..380 {
            for y in (150..153).chain(277..280) {
                page.put_pixel(x, y, Luma([0u8]));
            }
        }
        for y in 150..280 {
            for x in (20..23).chain(377..380) {
                page.put_pixel(x, y, Luma([0u8]));
            }
        }
        page.save(path).expect("write png");
    }
}
