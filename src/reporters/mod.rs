//! Output reporters for training runs
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors, plus optional bar charts
//! - `json` - Machine-readable JSON

pub mod chart;
mod json;
mod text;

use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::pipeline::RunSummary;

pub use chart::ChartKind;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a run summary using an OutputFormat enum
pub fn report_with_format(summary: &RunSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(summary),
        OutputFormat::Json => json::render(summary),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Backend;
    use crate::dataset::{Label, LoadReport};
    use crate::metrics::EvaluationReport;
    use crate::pipeline::FeatureImportance;
    use std::time::Duration;

    /// Create a small RunSummary for testing
    pub(crate) fn test_summary() -> RunSummary {
        use Label::{Benign as B, Malicious as M};

        RunSummary {
            input: "data.csv".into(),
            backend: Backend::RandomForest,
            load: LoadReport {
                rows_read: 12,
                header_skipped: true,
                dropped_missing: 1,
                dropped_invalid_label: 1,
            },
            class_counts: [6, 4],
            train_rows: 8,
            test_rows: 2,
            oversampled_rows: 0,
            evaluation: EvaluationReport::from_predictions(&[B, M], &[B, M]),
            feature_importances: Some(vec![
                FeatureImportance {
                    feature: "length".into(),
                    importance: 0.6,
                },
                FeatureImportance {
                    feature: "is_https".into(),
                    importance: 0.4,
                },
            ]),
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_report_dispatch() {
        let summary = test_summary();
        assert!(report_with_format(&summary, OutputFormat::Text).unwrap().contains("precision"));
        assert!(report_with_format(&summary, OutputFormat::Json)
            .unwrap()
            .trim_start()
            .starts_with('{'));
    }
}
