//! Labeled URL dataset loading
//!
//! Reads a two-column CSV (URL, label) with an optional header row. Labels
//! go through one canonical encoding ([`Label::parse`]); rows that have no
//! usable URL or label are dropped and counted in the [`LoadReport`].

pub mod clean;

use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MalurlError, Result};

/// Binary class of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign = 0,
    Malicious = 1,
}

impl Label {
    /// All classes in class-id order
    pub const ALL: [Label; 2] = [Label::Benign, Label::Malicious];

    /// Canonical label encoding.
    ///
    /// Case-insensitive: `good`/`benign`/`0` -> Benign, `bad`/`malicious`/`1`
    /// -> Malicious. Numeric codes may carry a fractional zero (`1.0`).
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "good" | "benign" => return Some(Label::Benign),
            "bad" | "malicious" => return Some(Label::Malicious),
            _ => {}
        }
        match value.parse::<f64>() {
            Ok(n) if n == 0.0 => Some(Label::Benign),
            Ok(n) if n == 1.0 => Some(Label::Malicious),
            _ => None,
        }
    }

    /// Integer class id
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Label::Benign => "benign",
            Label::Malicious => "malicious",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One input row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub url: String,
    pub label: Label,
}

/// Counters describing what happened while loading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows seen (header excluded)
    pub rows_read: usize,
    /// Whether the first row was recognised as a header and skipped
    pub header_skipped: bool,
    /// Rows with an empty URL or label, or fewer than two columns
    pub dropped_missing: usize,
    /// Rows whose label could not be normalised
    pub dropped_invalid_label: usize,
}

impl LoadReport {
    pub fn kept(&self) -> usize {
        self.rows_read - self.dropped_missing - self.dropped_invalid_label
    }
}

/// Records plus load counters
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: Vec<Record>,
    pub report: LoadReport,
}

impl LoadedData {
    /// Per-class row counts, indexed by class id
    pub fn class_counts(&self) -> [usize; 2] {
        class_counts(&self.records)
    }
}

/// Per-class counts for a slice of records, indexed by class id
pub fn class_counts(records: &[Record]) -> [usize; 2] {
    label_counts(records.iter().map(|r| r.label))
}

/// Per-class counts of labels, indexed by class id
pub fn label_counts(labels: impl IntoIterator<Item = Label>) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for label in labels {
        counts[label.id() as usize] += 1;
    }
    counts
}

/// Load and normalise a labeled URL CSV.
pub fn load_records(path: &Path) -> Result<LoadedData> {
    if !path.exists() {
        return Err(MalurlError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(MalurlError::EmptyInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(file);

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    let mut first = true;

    for row in reader.records() {
        let row = row?;
        let is_first = std::mem::take(&mut first);

        let Some((url, label)) = split_row(&row) else {
            if is_first && row.iter().all(str::is_empty) {
                continue;
            }
            report.rows_read += 1;
            report.dropped_missing += 1;
            continue;
        };

        if is_first && is_header(&url, label) {
            debug!("skipping header row: {:?}", row);
            report.header_skipped = true;
            continue;
        }

        report.rows_read += 1;
        match Label::parse(label) {
            Some(label) => records.push(Record { url, label }),
            None => {
                report.dropped_invalid_label += 1;
                debug!("dropping row with unrecognised label {:?}", label);
            }
        }
    }

    if report.rows_read == 0 {
        return Err(MalurlError::EmptyInput(path.to_path_buf()));
    }
    if report.dropped_invalid_label > 0 || report.dropped_missing > 0 {
        warn!(
            "Dropped {} rows with missing values and {} rows with unrecognised labels",
            report.dropped_missing, report.dropped_invalid_label
        );
    }

    Ok(LoadedData { records, report })
}

/// Split a CSV row into (url, label).
///
/// The label is the last field; any extra fields before it are re-joined with
/// commas since they come from an unquoted URL.
fn split_row(row: &csv::StringRecord) -> Option<(String, &str)> {
    if row.len() < 2 {
        return None;
    }
    let label = row.get(row.len() - 1)?;
    let url = row
        .iter()
        .take(row.len() - 1)
        .collect::<Vec<_>>()
        .join(",");
    if url.is_empty() || label.is_empty() {
        return None;
    }
    Some((url, label))
}

fn is_header(url: &str, label: &str) -> bool {
    Label::parse(label).is_none()
        && (url.eq_ignore_ascii_case("url") || label.eq_ignore_ascii_case("label"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_label_parse_canonical_encoding() {
        assert_eq!(Label::parse("good"), Some(Label::Benign));
        assert_eq!(Label::parse(" BAD "), Some(Label::Malicious));
        assert_eq!(Label::parse("benign"), Some(Label::Benign));
        assert_eq!(Label::parse("malicious"), Some(Label::Malicious));
        assert_eq!(Label::parse("0"), Some(Label::Benign));
        assert_eq!(Label::parse("1.0"), Some(Label::Malicious));
        assert_eq!(Label::parse("-1"), None);
        assert_eq!(Label::parse("2"), None);
        assert_eq!(Label::parse("phishing"), None);
        assert_eq!(Label::parse(""), None);
    }

    #[test]
    fn test_load_with_header_and_string_labels() {
        let file = write_csv("url,label\nexample.com,good\nevil.ru/login,bad\n");
        let data = load_records(file.path()).unwrap();
        assert!(data.report.header_skipped);
        assert_eq!(data.report.rows_read, 2);
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].url, "example.com");
        assert_eq!(data.records[1].label, Label::Malicious);
        assert_eq!(data.class_counts(), [1, 1]);
    }

    #[test]
    fn test_load_headerless_numeric_labels() {
        let file = write_csv("example.com,0\nevil.ru,1\n");
        let data = load_records(file.path()).unwrap();
        assert!(!data.report.header_skipped);
        assert_eq!(data.records.len(), 2);
    }

    #[test]
    fn test_invalid_and_missing_rows_dropped() {
        let file = write_csv("url,label\na.com,good\nb.com,\nc.com,unknown\n,bad\nonlyonefield\nd.com,1\n");
        let data = load_records(file.path()).unwrap();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.report.rows_read, 6);
        assert_eq!(data.report.dropped_missing, 3);
        assert_eq!(data.report.dropped_invalid_label, 1);
        assert_eq!(data.report.kept(), 2);
    }

    #[test]
    fn test_unquoted_commas_rejoined_into_url() {
        let file = write_csv("example.com/a,b,c,bad\n");
        let data = load_records(file.path()).unwrap();
        assert_eq!(data.records[0].url, "example.com/a,b,c");
        assert_eq!(data.records[0].label, Label::Malicious);
    }

    #[test]
    fn test_missing_file_error() {
        let err = load_records(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, MalurlError::FileNotFound(_)));
        assert!(err.to_string().contains("was not found"));
    }

    #[test]
    fn test_empty_file_error() {
        let file = write_csv("");
        let err = load_records(file.path()).unwrap_err();
        assert!(matches!(err, MalurlError::EmptyInput(_)));

        let header_only = write_csv("url,label\n");
        let err = load_records(header_only.path()).unwrap_err();
        assert!(matches!(err, MalurlError::EmptyInput(_)));
    }
}
