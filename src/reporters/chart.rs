//! Terminal bar charts
//!
//! Horizontal bars scaled to a fixed width. Values are expected in `[0, 1]`
//! (precision, accuracy, normalised importances).

use std::str::FromStr;

use anyhow::{anyhow, Result};
use console::style;

use crate::metrics::EvaluationReport;
use crate::pipeline::FeatureImportance;

/// Bar width in cells for a value of 1.0
const BAR_WIDTH: usize = 40;

/// Which chart to draw after a training run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Weighted precision next to accuracy
    Precision,
    /// Top-N feature importances
    Importance,
}

impl FromStr for ChartKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "precision" => Ok(ChartKind::Precision),
            "importance" | "importances" => Ok(ChartKind::Importance),
            _ => Err(anyhow!(
                "Unknown chart '{}'. Valid charts: precision, importance",
                s
            )),
        }
    }
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

fn render_bars(title: &str, rows: &[(&str, f64)]) -> String {
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let mut out = format!("\n{}\n", style(title).bold());
    for (label, value) in rows {
        out.push_str(&format!(
            "  {:<label_width$}  {}  {:.4}\n",
            label,
            style(bar(*value)).cyan(),
            value
        ));
    }
    out
}

/// Weighted-average precision against accuracy
pub fn precision_chart(evaluation: &EvaluationReport) -> String {
    render_bars(
        "Precision vs Accuracy",
        &[
            ("precision (weighted)", evaluation.weighted_avg.precision),
            ("accuracy", evaluation.accuracy),
        ],
    )
}

/// The `top_n` most important features, highest first
pub fn importance_chart(ranked: &[FeatureImportance], top_n: usize) -> String {
    let rows: Vec<(&str, f64)> = ranked
        .iter()
        .take(top_n)
        .map(|f| (f.feature.as_str(), f.importance))
        .collect();
    render_bars(&format!("Top {} Feature Importances", rows.len()), &rows)
}
