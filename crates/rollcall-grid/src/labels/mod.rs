// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label extraction — student identities from the identity block and date
// labels from the header strip.
//
// Extraction is injected into the pipeline through the `LabelExtractor` trait.
// `FixedLabels` serves a known roster; the OCR-backed extractor lives behind
// the `ocr` feature.

#[cfg(feature = "ocr")]
pub mod ocr;

use std::path::Path;

use image::DynamicImage;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::{DateColumn, StudentIdentity};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Minimum length of an all-digit line to be read as a student id.
pub const MIN_ID_DIGITS: usize = 8;

/// Reads identities and date labels off the sheet's text regions.
///
/// Implementations are constructed once and shared across documents.
pub trait LabelExtractor: Send + Sync {
    /// Students in top-to-bottom row order.
    fn student_identities(&self, identity_block: &DynamicImage) -> Result<Vec<StudentIdentity>>;

    /// Date labels in left-to-right column order. May return fewer or more
    /// labels than there are columns.
    fn date_labels(&self, header: &DynamicImage) -> Result<Vec<String>>;
}

/// A roster file: the students of a class and, optionally, its dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub students: Vec<StudentIdentity>,
    #[serde(default)]
    pub dates: Vec<String>,
}

/// Label extractor that ignores the image and returns a known roster.
#[derive(Debug, Clone, Default)]
pub struct FixedLabels {
    roster: Roster,
}

impl FixedLabels {
    pub fn new(students: Vec<StudentIdentity>, dates: Vec<String>) -> Self {
        Self {
            roster: Roster { students, dates },
        }
    }

    /// Load a [`Roster`] from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let roster: Roster = serde_json::from_str(&raw).map_err(|err| {
            RollcallError::LabelExtraction(format!("invalid roster {}: {}", path.display(), err))
        })?;
        debug!(students = roster.students.len(), dates = roster.dates.len(), "Roster loaded");
        Ok(Self { roster })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}

impl LabelExtractor for FixedLabels {
    fn student_identities(&self, _identity_block: &DynamicImage) -> Result<Vec<StudentIdentity>> {
        Ok(self.roster.students.clone())
    }

    fn date_labels(&self, _header: &DynamicImage) -> Result<Vec<String>> {
        Ok(self.roster.dates.clone())
    }
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Split a line into its leading id token and the rest, when the first
/// whitespace-separated token is all digits and at least [`MIN_ID_DIGITS`] long.
fn split_id(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (token, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    (is_numeric(token) && token.chars().count() >= MIN_ID_DIGITS).then(|| (token, rest.trim()))
}

/// Pair recognised text lines into identities.
///
/// A line whose first token is an all-digit id of at least [`MIN_ID_DIGITS`]
/// characters starts an identity. Text after the id on the same line is the
/// name; OCR merges the two columns when they sit close together. A bare id
/// takes the following line as its name unless that line is numeric or
/// starts an identity of its own, in which case the name is left empty.
pub fn parse_identity_lines<S: AsRef<str>>(lines: &[S]) -> Vec<StudentIdentity> {
    let mut identities = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let Some((id, inline_name)) = split_id(line.as_ref()) else {
            continue;
        };
        let name = if inline_name.is_empty() {
            lines
                .get(i + 1)
                .map(|next| next.as_ref().trim())
                .filter(|next| !is_numeric(next) && split_id(next).is_none())
                .unwrap_or_default()
        } else {
            inline_name
        };
        identities.push(StudentIdentity::new(id, name));
    }
    identities
}

/// Keep only lines that contain a digit, stripped to digits and `/`.
pub fn clean_date_labels<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.chars().any(|c| c.is_ascii_digit()))
        .map(|line| {
            line.chars()
                .filter(|c| c.is_ascii_digit() || *c == '/')
                .collect()
        })
        .collect()
}

/// Pair date labels with cancelled flags, one column per flag.
///
/// Missing or empty labels become `Date_<n>` (1-indexed); labels beyond the
/// column count are dropped.
#[instrument(skip_all, fields(labels = labels.len(), columns = cancelled.len()))]
pub fn build_columns(labels: Vec<String>, cancelled: &[bool]) -> Vec<DateColumn> {
    if labels.len() > cancelled.len() {
        debug!(
            dropped = labels.len() - cancelled.len(),
            "More date labels than columns"
        );
    }
    let mut labels = labels.into_iter();
    cancelled
        .iter()
        .enumerate()
        .map(|(index, cancelled)| {
            let label = labels
                .next()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DateColumn::synthetic_label(index));
            DateColumn {
                index,
                label,
                cancelled: *cancelled,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_pair_ids_with_following_names() {
        let lines = [
            "Roll No",
            "20231001",
            "Ada Lovelace",
            "20231002",
            "20231003",
            "Grace Hopper",
            "1234",
            "Short Id",
        ];
        let identities = parse_identity_lines(&lines);
        assert_eq!(
            identities,
            vec![
                StudentIdentity::new("20231001", "Ada Lovelace"),
                StudentIdentity::new("20231002", ""),
                StudentIdentity::new("20231003", "Grace Hopper"),
            ]
        );
    }

    #[test]
    fn trailing_id_has_empty_name() {
        let identities = parse_identity_lines(&[" 987654321 "]);
        assert_eq!(identities, vec![StudentIdentity::new("987654321", "")]);
    }

    #[test]
    fn merged_id_and_name_lines_are_split() {
        let lines = [
            "20231001 Ada Lovelace",
            "20231002",
            "Charles Babbage",
            "20231003   Mary Somerville ",
            "1234 Short Id",
        ];
        let identities = parse_identity_lines(&lines);
        assert_eq!(
            identities,
            vec![
                StudentIdentity::new("20231001", "Ada Lovelace"),
                StudentIdentity::new("20231002", "Charles Babbage"),
                StudentIdentity::new("20231003", "Mary Somerville"),
            ]
        );
    }

    #[test]
    fn bare_id_does_not_take_next_identity_as_name() {
        let identities = parse_identity_lines(&["20231001", "20231002 Bob"]);
        assert_eq!(identities[0], StudentIdentity::new("20231001", ""));
        assert_eq!(identities[1], StudentIdentity::new("20231002", "Bob"));
    }

    #[test]
    fn date_labels_are_cleaned() {
        let cleaned = clean_date_labels(&["Date", "01/09.", "Mon 08/09", "x"]);
        assert_eq!(cleaned, vec!["01/09".to_string(), "08/09".to_string()]);
    }

    #[test]
    fn columns_pad_with_synthetic_labels() {
        let columns = build_columns(vec!["01/09".into(), "".into()], &[false, true, false]);
        let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["01/09", "Date_2", "Date_3"]);
        assert!(columns[1].cancelled);
        assert_eq!(columns[2].index, 2);
    }

    #[test]
    fn surplus_labels_are_dropped() {
        let columns = build_columns(vec!["a1".into(), "b2".into(), "c3".into()], &[false, false]);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].label, "b2");
    }

    #[test]
    fn roster_loads_from_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"{"students":[{"id":"20231001","name":"Ada"}],"dates":["01/09"]}"#,
        )
        .expect("write");

        let labels = FixedLabels::from_json_file(&path).expect("roster");
        let page = DynamicImage::new_luma8(1, 1);
        assert_eq!(
            labels.student_identities(&page).expect("ids"),
            vec![StudentIdentity::new("20231001", "Ada")]
        );
        assert_eq!(labels.date_labels(&page).expect("dates"), vec!["01/09"]);
    }

    #[test]
    fn malformed_roster_is_label_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            FixedLabels::from_json_file(&path),
            Err(RollcallError::LabelExtraction(_))
        ));
    }
}
