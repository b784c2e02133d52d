//! Dataset cleaning: canonical labels, duplicate removal, CSV export

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use super::{class_counts, Record};
use crate::error::Result;

/// Default output file of the `clean` command
pub const DEFAULT_CLEANED_FILE: &str = "cleaned_data.csv";

/// Summary of a cleaning pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub duplicates_removed: usize,
    pub rows_out: usize,
    /// Per-class counts after cleaning, indexed by class id
    pub label_counts: [usize; 2],
}

#[derive(Serialize)]
struct CleanRow<'a> {
    url: &'a str,
    label: u8,
}

/// Drop exact (url, label) duplicates, keeping the first occurrence.
pub fn deduplicate(records: Vec<Record>) -> (Vec<Record>, CleanSummary) {
    let rows_in = records.len();
    let mut seen = HashSet::with_capacity(rows_in);
    let cleaned: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert((r.url.clone(), r.label)))
        .collect();

    let summary = CleanSummary {
        rows_in,
        duplicates_removed: rows_in - cleaned.len(),
        rows_out: cleaned.len(),
        label_counts: class_counts(&cleaned),
    };
    (cleaned, summary)
}

/// Write records as `url,label` CSV with a header row and numeric labels.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for r in records {
        writer.serialize(CleanRow {
            url: &r.url,
            label: r.label.id(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_records, Label};

    fn rec(url: &str, label: Label) -> Record {
        Record {
            url: url.to_string(),
            label,
        }
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let records = vec![
            rec("a.com", Label::Benign),
            rec("b.com", Label::Malicious),
            rec("a.com", Label::Benign),
            rec("a.com", Label::Malicious),
        ];
        let (cleaned, summary) = deduplicate(records);
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[0], rec("a.com", Label::Benign));
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.label_counts, [1, 2]);
    }

    #[test]
    fn test_written_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cleaned.csv");
        let records = vec![
            rec("https://a.com/x,y", Label::Benign),
            rec("b.com", Label::Malicious),
        ];
        write_records(&out, &records).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("url,label\n"));
        assert!(text.contains("\"https://a.com/x,y\",0"));

        let reloaded = load_records(&out).unwrap();
        assert!(reloaded.report.header_skipped);
        assert_eq!(reloaded.records, records);
    }
}
