//! Text (terminal) reporter

use anyhow::Result;
use console::{style, StyledObject};

use crate::dataset::Label;
use crate::pipeline::RunSummary;

/// Accuracy colored by band
fn styled_accuracy(accuracy: f64) -> StyledObject<String> {
    let text = style(format!("{accuracy:.4}")).bold();
    if accuracy >= 0.95 {
        text.green()
    } else if accuracy >= 0.85 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Render summary as formatted terminal output
pub fn render(summary: &RunSummary) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", style("malurl training run").bold()));
    out.push_str(&format!("{}\n", style("──────────────────────────────────────").dim()));
    out.push_str(&format!(
        "Input: {}  Backend: {}\n",
        summary.input,
        style(summary.backend).bold()
    ));

    let load = &summary.load;
    out.push_str(&format!(
        "Rows: {} read, {} kept",
        load.rows_read,
        load.kept()
    ));
    let dropped = load.dropped_missing + load.dropped_invalid_label;
    if dropped > 0 {
        out.push_str(&format!(
            "  {}",
            style(format!(
                "(dropped {} missing, {} bad label)",
                load.dropped_missing, load.dropped_invalid_label
            ))
            .dim()
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "Classes: {} {}, {} {}\n",
        summary.class_counts[Label::Benign.id() as usize],
        Label::Benign,
        summary.class_counts[Label::Malicious.id() as usize],
        Label::Malicious
    ));
    out.push_str(&format!(
        "Split: {} train / {} test",
        summary.train_rows, summary.test_rows
    ));
    if summary.oversampled_rows > 0 {
        out.push_str(&format!(
            "  (+{} oversampled)",
            summary.oversampled_rows
        ));
    }
    out.push_str("\n\n");

    out.push_str(&format!("{}\n\n", style("CLASSIFICATION REPORT").bold()));
    out.push_str(&summary.evaluation.to_string());
    out.push('\n');

    let cm = &summary.evaluation.confusion_matrix.counts;
    out.push_str(&format!(
        "{} {}\n",
        style("CONFUSION MATRIX").bold(),
        style("(rows: true, cols: predicted)").dim()
    ));
    out.push_str(&format!("{:>12} {:>9} {:>9}\n", "", "benign", "malicious"));
    out.push_str(&format!("{:>12} {:>9} {:>9}\n", "benign", cm[0][0], cm[0][1]));
    out.push_str(&format!("{:>12} {:>9} {:>9}\n\n", "malicious", cm[1][0], cm[1][1]));

    out.push_str(&format!(
        "Accuracy: {}\n",
        styled_accuracy(summary.evaluation.accuracy)
    ));

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_summary;

    #[test]
    fn test_text_render_contains_report() {
        let text = render(&test_summary()).expect("render text");
        assert!(text.contains("random-forest"));
        assert!(text.contains("precision    recall  f1-score   support"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.0000"));
        assert!(text.contains("dropped 1 missing, 1 bad label"));
    }

    #[test]
    fn test_text_render_oversampled_note() {
        let mut summary = test_summary();
        assert!(!render(&summary).unwrap().contains("oversampled"));
        summary.oversampled_rows = 3;
        assert!(render(&summary).unwrap().contains("(+3 oversampled)"));
    }

    #[test]
    fn test_no_escape_codes_without_colors() {
        console::set_colors_enabled(false);
        let text = render(&test_summary()).unwrap();
        assert!(!text.contains('\x1b'), "{text:?}");
        assert!(text.contains("Accuracy: 1.0000"));
    }
}
