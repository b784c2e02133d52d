//! Persisted model bundle
//!
//! The fitted transforms and model are saved together as JSON, keyed by the
//! feature schema version. A bundle written by a build with a different
//! feature layout is rejected on load.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{label_for, Classifier, TrainedModel};
use crate::config::PipelineConfig;
use crate::dataset::Label;
use crate::error::{MalurlError, Result};
use crate::features::{FeatureExtractor, FEATURE_NAMES, FEATURE_SCHEMA_VERSION};
use crate::preprocess::FittedTransform;

/// Model plus everything needed to score new URLs
#[derive(Serialize, Deserialize)]
pub struct ModelBundle {
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    /// Version of the tool that wrote the bundle
    pub created_by: String,
    pub config: PipelineConfig,
    pub transform: FittedTransform,
    pub model: TrainedModel,
}

/// Classification of one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlPrediction {
    pub url: String,
    pub label: Label,
    pub malicious_probability: f64,
}

impl ModelBundle {
    pub fn new(config: PipelineConfig, transform: FittedTransform, model: TrainedModel) -> Self {
        Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            created_by: format!("malurl {}", env!("CARGO_PKG_VERSION")),
            config,
            transform,
            model,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Self = serde_json::from_str(json)?;
        if bundle.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(MalurlError::SchemaMismatch {
                found: bundle.schema_version,
                expected: FEATURE_SCHEMA_VERSION,
            });
        }
        Ok(bundle)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        info!("Model bundle saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MalurlError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Extract, transform and score raw URLs
    pub fn classify<S: AsRef<str> + Sync>(&self, urls: &[S]) -> Vec<UrlPrediction> {
        let features = FeatureExtractor::new().extract_batch(urls);
        let rows = self.transform.transform_features(&features);
        let probabilities = self.model.predict_proba(&rows);

        urls.iter()
            .zip(probabilities)
            .map(|(url, p)| UrlPrediction {
                url: url.as_ref().to_string(),
                label: label_for(p),
                malicious_probability: p,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use crate::preprocess::prepare;

    fn fitted_bundle() -> ModelBundle {
        let records: Vec<Record> = (0..60)
            .map(|i| {
                if i % 2 == 0 {
                    Record {
                        url: format!("https://docs{i}.example.com/guide"),
                        label: Label::Benign,
                    }
                } else {
                    Record {
                        url: format!("http://free-login-{i}.xyz/verify/account/click here/now"),
                        label: Label::Malicious,
                    }
                }
            })
            .collect();
        let config = PipelineConfig {
            n_trees: 15,
            ..Default::default()
        };
        let data = prepare(&records, &config).unwrap();
        let model = super::super::train(&data.x_train, &data.y_train, &config).unwrap();
        ModelBundle::new(config, data.transform, model)
    }

    #[test]
    fn test_roundtrip_preserves_predictions() {
        let bundle = fitted_bundle();
        let urls = ["https://docs.example.com/intro", "http://free-login.xyz/click here"];
        let before = bundle.classify(&urls);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("bundle.json");
        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();

        assert_eq!(loaded.feature_names.len(), FEATURE_NAMES.len());
        assert_eq!(loaded.classify(&urls), before);
        assert_eq!(before[0].label, Label::Benign);
        assert_eq!(before[1].label, Label::Malicious);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let bundle = fitted_bundle();
        let mut value: serde_json::Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();
        value["schema_version"] = serde_json::json!(FEATURE_SCHEMA_VERSION + 1);

        match ModelBundle::from_json(&value.to_string()) {
            Err(MalurlError::SchemaMismatch { found, expected }) => {
                assert_eq!(found, FEATURE_SCHEMA_VERSION + 1);
                assert_eq!(expected, FEATURE_SCHEMA_VERSION);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected schema mismatch"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelBundle::load(Path::new("/no/such/bundle.json")).err().unwrap();
        assert!(matches!(err, MalurlError::FileNotFound(_)));
    }
}
