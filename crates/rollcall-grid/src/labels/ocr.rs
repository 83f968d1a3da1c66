// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR-backed label extraction using the `ocrs` crate, a pure-Rust OCR engine
// running neural network models through `rten`.
//
// Only built with the `ocr` feature. The engine needs two model files,
// `text-detection.rten` and `text-recognition.rten`, by default looked up in
// `$XDG_CACHE_HOME/ocrs` (usually `~/.cache/ocrs`, where `ocrs-cli` puts them
// on first run).

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rollcall_core::StudentIdentity;
use rollcall_core::error::{Result, RollcallError};
use rten::Model;
use tracing::{debug, info, instrument};

use super::{LabelExtractor, clean_date_labels, parse_identity_lines};
use crate::image::ImageProcessor;
use crate::image::binarize::binarize_otsu;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the detection and recognition models.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expect both models inside `dir` under their well-known names.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(RollcallError::LabelExtraction(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn load_model(path: &Path) -> Result<Model> {
    Model::load_file(path).map_err(|err| {
        RollcallError::LabelExtraction(format!(
            "failed to load OCR model from {}: {}",
            path.display(),
            err
        ))
    })
}

/// Reads ids, names, and dates off the sheet with OCR.
///
/// Loading the models is the expensive step; build one extractor and pass it
/// to every pipeline run.
pub struct OcrLabelExtractor {
    engine: OcrEngine,
}

impl OcrLabelExtractor {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR models");
        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(load_model(&config.detection_model_path)?),
            recognition_model: Some(load_model(&config.recognition_model_path)?),
            ..Default::default()
        })
        .map_err(|err| {
            RollcallError::LabelExtraction(format!("failed to initialise OCR engine: {}", err))
        })?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(OcrConfig::from_dir(dir))
    }

    /// Recognise text lines, top to bottom, skipping empty ones.
    ///
    /// The region is sharpened and Otsu-binarized first so handwriting-grade
    /// scans read as clean black text.
    #[instrument(skip_all, fields(width = region.width(), height = region.height()))]
    pub fn recognize_lines(&self, region: &DynamicImage) -> Result<Vec<String>> {
        if region.width() == 0 || region.height() == 0 {
            return Ok(Vec::new());
        }

        let sharpened = ImageProcessor::from_luma(region.to_luma8())
            .sharpen()
            .into_luma();
        let prepared = DynamicImage::ImageLuma8(binarize_otsu(&sharpened)).to_rgb8();
        let (width, height) = prepared.dimensions();

        let source = ImageSource::from_bytes(prepared.as_raw(), (width, height)).map_err(|err| {
            RollcallError::LabelExtraction(format!(
                "failed to create OCR image source ({}x{}): {}",
                width, height, err
            ))
        })?;
        let input = self.engine.prepare_input(source).map_err(|err| {
            RollcallError::LabelExtraction(format!("OCR preprocessing failed: {}", err))
        })?;

        let words = self.engine.detect_words(&input).map_err(|err| {
            RollcallError::LabelExtraction(format!("word detection failed: {}", err))
        })?;
        let line_rects = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| {
                RollcallError::LabelExtraction(format!("line recognition failed: {}", err))
            })?;

        let lines: Vec<String> = recognized
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|text| !text.trim().is_empty())
            .collect();
        debug!(words = words.len(), lines = lines.len(), "OCR complete");
        Ok(lines)
    }
}

impl LabelExtractor for OcrLabelExtractor {
    fn student_identities(&self, identity_block: &DynamicImage) -> Result<Vec<StudentIdentity>> {
        let lines = self.recognize_lines(identity_block)?;
        let identities = parse_identity_lines(&lines);
        info!(lines = lines.len(), students = identities.len(), "Identities read");
        Ok(identities)
    }

    fn date_labels(&self, header: &DynamicImage) -> Result<Vec<String>> {
        let lines = self.recognize_lines(header)?;
        Ok(clean_date_labels(&lines))
    }
}
