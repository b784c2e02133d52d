//! URL classifiers
//!
//! Two tree-ensemble backends behind one [`TrainedModel`]:
//! - random forest (`linfa-trees` members, parallel fitting, importances)
//! - gradient boosting (`gbdt` crate)
//!
//! Both output a malicious-class probability; a URL is classified malicious
//! when that probability is strictly above [`DECISION_THRESHOLD`].

pub mod bundle;
pub mod forest;
pub mod gbdt_model;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Backend, PipelineConfig};
use crate::dataset::Label;
use crate::error::Result;

pub use bundle::{ModelBundle, UrlPrediction};
pub use forest::{ForestParams, RandomForest};
pub use gbdt_model::{GbdtClassifier, GbdtParams};

/// Probability above which a URL counts as malicious
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Map a malicious-class probability to a label
pub fn label_for(probability: f64) -> Label {
    if probability > DECISION_THRESHOLD {
        Label::Malicious
    } else {
        Label::Benign
    }
}

/// Common prediction interface of the backends
pub trait Classifier {
    /// Malicious-class probability per row
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64>;

    /// Impurity-based importance per feature, if the backend exposes it
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<Label> {
        self.predict_proba(rows).into_iter().map(label_for).collect()
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        self.predict_proba_batch(rows)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(RandomForest::feature_importances(self))
    }
}

impl Classifier for GbdtClassifier {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        self.predict_proba_batch(rows)
    }
}

/// A fitted model of either backend
#[derive(Serialize, Deserialize)]
#[serde(tag = "backend", content = "model", rename_all = "kebab-case")]
pub enum TrainedModel {
    RandomForest(RandomForest),
    GradientBoosting(GbdtClassifier),
}

impl TrainedModel {
    pub fn backend(&self) -> Backend {
        match self {
            TrainedModel::RandomForest(_) => Backend::RandomForest,
            TrainedModel::GradientBoosting(_) => Backend::GradientBoosting,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::RandomForest(m) => m,
            TrainedModel::GradientBoosting(m) => m,
        }
    }
}

impl Classifier for TrainedModel {
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        self.inner().predict_proba(rows)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.inner().feature_importances()
    }
}

/// Fit the configured backend on prepared training rows.
pub fn train(x: &[Vec<f64>], y: &[Label], config: &PipelineConfig) -> Result<TrainedModel> {
    info!(
        "Training {} with {} estimators on {} rows",
        config.backend,
        config.n_trees,
        x.len()
    );

    match config.backend {
        Backend::RandomForest => {
            let params = ForestParams {
                n_trees: config.n_trees,
                seed: config.seed,
                bootstrap: true,
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
                feature_subsample: forest::DEFAULT_FEATURE_SUBSAMPLE,
            };
            let ids: Vec<u8> = y.iter().map(|l| l.id()).collect();
            Ok(TrainedModel::RandomForest(RandomForest::fit(x, &ids, &params)?))
        }
        Backend::GradientBoosting => {
            let params = GbdtParams {
                iterations: config.n_trees,
                max_depth: config
                    .max_depth
                    .map_or(gbdt_model::DEFAULT_GBDT_DEPTH, |d| d as u32),
                learning_rate: config.learning_rate,
                min_leaf_size: config.min_samples_leaf,
            };
            Ok(TrainedModel::GradientBoosting(GbdtClassifier::train(x, y, &params)?))
        }
    }
}
