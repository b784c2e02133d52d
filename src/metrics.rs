//! Binary classification metrics
//!
//! Precision, recall and F1 follow scikit-learn's `classification_report`:
//! a zero denominator yields 0, macro averages are unweighted means over the
//! classes, weighted averages weight each class by its support.

use std::fmt;

use serde::Serialize;

use crate::dataset::Label;

/// 2x2 confusion matrix; rows are true labels, columns predicted labels,
/// both indexed by class id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (t, p) in truth.iter().zip(predicted) {
            counts[t.id() as usize][p.id() as usize] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    /// Rows whose true label is `label`
    pub fn support(&self, label: Label) -> usize {
        self.counts[label.id() as usize].iter().sum()
    }

    /// Rows predicted as `label`
    pub fn predicted(&self, label: Label) -> usize {
        self.counts.iter().map(|row| row[label.id() as usize]).sum()
    }

    pub fn true_positives(&self, label: Label) -> usize {
        let i = label.id() as usize;
        self.counts[i][i]
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Precision/recall/F1 for one class or one average
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn for_class(cm: &ConfusionMatrix, label: Label) -> Self {
        let tp = cm.true_positives(label);
        let precision = ratio(tp, cm.predicted(label));
        let recall = ratio(tp, cm.support(label));
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            support: cm.support(label),
        }
    }
}

/// Per-class metrics for one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMetrics {
    pub label: Label,
    #[serde(flatten)]
    pub metrics: ClassMetrics,
}

/// Test-set evaluation of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub classes: Vec<LabeledMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl EvaluationReport {
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        Self::from_confusion(ConfusionMatrix::from_predictions(truth, predicted))
    }

    pub fn from_confusion(cm: ConfusionMatrix) -> Self {
        let classes: Vec<LabeledMetrics> = Label::ALL
            .iter()
            .map(|&label| LabeledMetrics {
                label,
                metrics: ClassMetrics::for_class(&cm, label),
            })
            .collect();

        let total = cm.total();
        let n_classes = classes.len() as f64;
        let mut macro_avg = ClassMetrics {
            support: total,
            ..Default::default()
        };
        let mut weighted_avg = macro_avg;
        for c in &classes {
            let m = &c.metrics;
            macro_avg.precision += m.precision / n_classes;
            macro_avg.recall += m.recall / n_classes;
            macro_avg.f1 += m.f1 / n_classes;

            let w = ratio(m.support, total);
            weighted_avg.precision += m.precision * w;
            weighted_avg.recall += m.recall * w;
            weighted_avg.f1 += m.f1 * w;
        }

        Self {
            confusion_matrix: cm,
            classes,
            accuracy: ratio(cm.correct(), total),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: Label) -> &ClassMetrics {
        &self.classes[label.id() as usize].metrics
    }
}

/// scikit-learn `classification_report` layout, two decimals
impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 12;

        writeln!(
            f,
            "{:>WIDTH$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>WIDTH$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        for c in &self.classes {
            row(f, c.label.name(), &c.metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>WIDTH$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.confusion_matrix.total()
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
