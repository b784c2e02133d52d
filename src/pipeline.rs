//! Training pipeline
//!
//! Runs the stages of one experiment in order:
//! 1. Preprocess: load the CSV, extract features, split, fit transforms
//! 2. Train: optionally oversample, then fit the configured backend
//! 3. Evaluate: score the test partition and build the report
//!
//! A failing stage is logged with its name and the error is returned to the
//! caller; nothing is retried.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info};

use crate::classifier::{self, Classifier, ModelBundle, TrainedModel};
use crate::config::{Backend, PipelineConfig};
use crate::dataset::{load_records, LoadReport};
use crate::error::{MalurlError, Result};
use crate::features::FEATURE_NAMES;
use crate::metrics::EvaluationReport;
use crate::preprocess::{prepare, random_oversample, PreparedData};

/// Pipeline stage, reported to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Train,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Preprocess => write!(f, "Loading and preprocessing data..."),
            Stage::Train => write!(f, "Training model..."),
            Stage::Evaluate => write!(f, "Evaluating on the test set..."),
        }
    }
}

/// Importance score of one named feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Everything a reporter needs about one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub backend: Backend,
    pub load: LoadReport,
    /// Per-class counts of the loaded rows, indexed by class id
    pub class_counts: [usize; 2],
    pub train_rows: usize,
    pub test_rows: usize,
    /// Duplicates appended by oversampling (0 when disabled)
    pub oversampled_rows: usize,
    pub evaluation: EvaluationReport,
    /// Descending by importance; `None` for backends without importances
    pub feature_importances: Option<Vec<FeatureImportance>>,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Result of a full run
pub struct PipelineOutput {
    pub summary: RunSummary,
    pub bundle: ModelBundle,
}

/// A model fitted on the training partition
pub struct TrainOutcome {
    pub model: TrainedModel,
    pub oversampled_rows: usize,
}

/// Experiment pipeline over one configuration
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, extract, split and transform.
    pub fn preprocess_data(&self, path: &Path) -> Result<(LoadReport, [usize; 2], PreparedData)> {
        let inner = || -> Result<_> {
            let loaded = load_records(path)?;
            if loaded.records.is_empty() {
                return Err(MalurlError::NoUsableRows {
                    path: path.display().to_string(),
                    reason: "every row was dropped during label normalisation".into(),
                });
            }
            let counts = loaded.class_counts();
            info!(
                "Loaded {} rows ({} benign, {} malicious)",
                loaded.records.len(),
                counts[0],
                counts[1]
            );
            let data = prepare(&loaded.records, &self.config)?;
            Ok((loaded.report, counts, data))
        };
        inner().map_err(|e| {
            error!("Failed to preprocess data: {e}");
            e
        })
    }

    /// Fit the configured backend, oversampling first when enabled.
    pub fn train_model(&self, data: &PreparedData) -> Result<TrainOutcome> {
        let (x, y, oversampled_rows) = if self.config.oversample {
            let (x, y) = random_oversample(&data.x_train, &data.y_train, self.config.seed);
            let added = x.len() - data.x_train.len();
            info!("Oversampling added {added} minority-class rows");
            (x, y, added)
        } else {
            (data.x_train.clone(), data.y_train.clone(), 0)
        };

        match classifier::train(&x, &y, &self.config) {
            Ok(model) => Ok(TrainOutcome {
                model,
                oversampled_rows,
            }),
            Err(e) => {
                error!("Failed to train model: {e}");
                Err(e)
            }
        }
    }

    /// Score the test partition.
    pub fn evaluate_model(&self, model: &TrainedModel, data: &PreparedData) -> EvaluationReport {
        let predicted = model.predict(&data.x_test);
        EvaluationReport::from_predictions(&data.y_test, &predicted)
    }

    /// Run every stage, calling `on_stage` before each one.
    pub fn run<F: FnMut(Stage)>(&self, path: &Path, mut on_stage: F) -> Result<PipelineOutput> {
        let start = Instant::now();

        on_stage(Stage::Preprocess);
        let (load, counts, data) = self.preprocess_data(path)?;

        on_stage(Stage::Train);
        let outcome = self.train_model(&data)?;

        on_stage(Stage::Evaluate);
        let evaluation = self.evaluate_model(&outcome.model, &data);
        info!("Test accuracy: {:.4}", evaluation.accuracy);

        let summary = RunSummary {
            input: path.display().to_string(),
            backend: outcome.model.backend(),
            load,
            class_counts: counts,
            train_rows: data.x_train.len(),
            test_rows: data.x_test.len(),
            oversampled_rows: outcome.oversampled_rows,
            evaluation,
            feature_importances: ranked_importances(&outcome.model),
            elapsed: start.elapsed(),
        };
        let bundle = ModelBundle::new(self.config.clone(), data.transform, outcome.model);

        Ok(PipelineOutput { summary, bundle })
    }
}

/// Importances paired with feature names, highest first
pub fn ranked_importances(model: &TrainedModel) -> Option<Vec<FeatureImportance>> {
    let importances = model.feature_importances()?;
    let mut ranked: Vec<FeatureImportance> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.to_string(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Some(ranked)
}
