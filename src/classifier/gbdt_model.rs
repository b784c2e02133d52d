//! Gradient-boosted tree backend
//!
//! Wraps the `gbdt` crate with `LogLikelyhood` loss (binary classification):
//! label 1.0 is malicious and -1.0 is benign, and predictions come back as
//! malicious-class probabilities.
//!
//! The gbdt crate works in `f32` (`ValueType`); our feature rows are `f64`
//! and get converted at the crate boundary.

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{MalurlError, Result};

/// Depth used when no max depth is configured
pub const DEFAULT_GBDT_DEPTH: u32 = 6;

#[inline]
fn row_to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbdtParams {
    pub iterations: usize,
    pub max_depth: u32,
    pub learning_rate: f64,
    pub min_leaf_size: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_depth: DEFAULT_GBDT_DEPTH,
            learning_rate: 0.1,
            min_leaf_size: 1,
        }
    }
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
#[derive(Serialize, Deserialize)]
pub struct GbdtClassifier {
    model: GBDT,
}

impl GbdtClassifier {
    /// Train a new model on feature rows and labels.
    pub fn train(x: &[Vec<f64>], y: &[Label], params: &GbdtParams) -> Result<Self> {
        if x.is_empty() {
            return Err(MalurlError::Training("no training samples provided".into()));
        }
        if x.len() != y.len() {
            return Err(MalurlError::Training(format!(
                "feature count ({}) does not match label count ({})",
                x.len(),
                y.len()
            )));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(x[0].len());
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.iterations);
        cfg.set_shrinkage(params.learning_rate as f32);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(params.min_leaf_size);

        let mut gbdt = GBDT::new(&cfg);

        let mut training_data: Vec<Data> = x
            .iter()
            .zip(y)
            .map(|(row, label)| {
                let target = match label {
                    Label::Malicious => 1.0_f32,
                    Label::Benign => -1.0_f32,
                };
                Data::new_training_data(row_to_f32(row), 1.0_f32, target, None)
            })
            .collect();

        gbdt.fit(&mut training_data);

        Ok(Self { model: gbdt })
    }

    /// Malicious-class probability for one row
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let data = vec![Data::new_test_data(row_to_f32(row), None)];
        let preds = self.model.predict(&data);
        (preds.first().copied().unwrap_or(0.5_f32) as f64).clamp(0.0, 1.0)
    }

    /// Malicious-class probabilities for many rows
    pub fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }
        let data: Vec<Data> = rows
            .iter()
            .map(|r| Data::new_test_data(row_to_f32(r), None))
            .collect();
        self.model
            .predict(&data)
            .into_iter()
            .map(|p| (p as f64).clamp(0.0, 1.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic synthetic row; two seeds far apart land in different
    /// regions of feature space.
    fn make_row(seed: f64) -> Vec<f64> {
        (0..9).map(|i| (seed + i as f64 * 0.1).sin().abs() + seed / 100.0).collect()
    }

    fn training_set() -> (Vec<Vec<f64>>, Vec<Label>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..25 {
            x.push(make_row(i as f64));
            y.push(Label::Malicious);
        }
        for i in 100..125 {
            x.push(make_row(i as f64));
            y.push(Label::Benign);
        }
        (x, y)
    }

    #[test]
    fn test_train_and_predict() {
        let (x, y) = training_set();
        let params = GbdtParams {
            iterations: 10,
            max_depth: 3,
            learning_rate: 0.3,
            ..Default::default()
        };
        let classifier = GbdtClassifier::train(&x, &y, &params).expect("training should succeed");

        let p_a = classifier.predict_proba(&make_row(5.0));
        let p_b = classifier.predict_proba(&make_row(110.0));
        assert!((0.0..=1.0).contains(&p_a), "probability out of range: {p_a}");
        assert!((0.0..=1.0).contains(&p_b), "probability out of range: {p_b}");

        let batch = classifier.predict_proba_batch(&[make_row(5.0), make_row(110.0)]);
        assert_eq!(batch.len(), 2);
        assert!((batch[0] - p_a).abs() < 1e-6, "batch prediction should match single prediction");
        assert!((batch[1] - p_b).abs() < 1e-6, "batch prediction should match single prediction");
    }

    #[test]
    fn test_train_validation_errors() {
        match GbdtClassifier::train(&[], &[], &GbdtParams::default()) {
            Err(e) => assert!(e.to_string().contains("no training samples"), "got: {e}"),
            Ok(_) => panic!("expected error for empty features"),
        }

        let x = vec![make_row(1.0), make_row(2.0)];
        match GbdtClassifier::train(&x, &[Label::Benign], &GbdtParams::default()) {
            Err(e) => assert!(e.to_string().contains("does not match"), "got: {e}"),
            Ok(_) => panic!("expected error for mismatched lengths"),
        }
    }

    #[test]
    fn test_json_roundtrip_preserves_predictions() {
        let (x, y) = training_set();
        let params = GbdtParams {
            iterations: 5,
            max_depth: 2,
            learning_rate: 0.3,
            ..Default::default()
        };
        let classifier = GbdtClassifier::train(&x, &y, &params).unwrap();

        let json = serde_json::to_string(&classifier).expect("serialise should succeed");
        let loaded: GbdtClassifier = serde_json::from_str(&json).expect("deserialise should succeed");

        let row = make_row(3.0);
        assert!((classifier.predict_proba(&row) - loaded.predict_proba(&row)).abs() < 1e-6);
    }

    #[test]
    fn test_predict_batch_empty() {
        let (x, y) = training_set();
        let params = GbdtParams {
            iterations: 3,
            max_depth: 2,
            ..Default::default()
        };
        let classifier = GbdtClassifier::train(&x, &y, &params).unwrap();
        assert!(classifier.predict_proba_batch(&[]).is_empty());
    }
}
