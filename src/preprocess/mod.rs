//! Feature table assembly, train/test split and column transforms
//!
//! Order of operations:
//! 1. extract features for every record (parallel, input order kept)
//! 2. split rows into train/test with a seeded shuffle
//! 3. fit the scaler (and vocabulary encoder) on the training rows only
//! 4. apply the fitted transforms to both partitions

pub mod encoder;
pub mod oversample;
pub mod scaler;
pub mod split;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{CategoricalEncoding, PipelineConfig};
use crate::dataset::{Label, Record};
use crate::error::Result;
use crate::features::{is_categorical, FeatureExtractor, FeatureVector, CATEGORICAL_COLUMNS, NUM_FEATURES};

pub use encoder::VocabularyEncoder;
pub use oversample::random_oversample;
pub use scaler::ColumnScaler;
pub use split::{train_test_split, SplitIndices};

/// Transforms fitted on the training partition, reusable on new URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedTransform {
    pub categorical: CategoricalEncoding,
    pub scaler: ColumnScaler,
    /// Present when `categorical` is `Vocabulary`
    pub encoder: Option<VocabularyEncoder>,
}

impl FittedTransform {
    /// Fit on raw (untransformed) training rows
    pub fn fit(rows: &[Vec<f64>], categorical: CategoricalEncoding) -> Result<Self> {
        let numeric: Vec<usize> = (0..NUM_FEATURES).filter(|&c| !is_categorical(c)).collect();
        let scaler = ColumnScaler::fit(rows, &numeric)?;
        let encoder = match categorical {
            CategoricalEncoding::Vocabulary => Some(VocabularyEncoder::fit(rows, &CATEGORICAL_COLUMNS)),
            CategoricalEncoding::Hash => None,
        };
        Ok(Self {
            categorical,
            scaler,
            encoder,
        })
    }

    pub fn apply(&self, rows: &mut [Vec<f64>]) {
        self.scaler.transform(rows);
        if let Some(encoder) = &self.encoder {
            encoder.transform(rows);
        }
    }

    /// Turn feature vectors into model-ready rows
    pub fn transform_features(&self, features: &[FeatureVector]) -> Vec<Vec<f64>> {
        let mut rows = to_rows(features);
        self.apply(&mut rows);
        rows
    }
}

/// Model-ready partitions
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: Vec<Vec<f64>>,
    pub x_test: Vec<Vec<f64>>,
    pub y_train: Vec<Label>,
    pub y_test: Vec<Label>,
    pub transform: FittedTransform,
}

/// Convert feature vectors to plain rows
pub fn to_rows(features: &[FeatureVector]) -> Vec<Vec<f64>> {
    features.iter().map(|f| f.to_row().to_vec()).collect()
}

/// Row-major copy of `rows` as an ndarray matrix
pub fn to_matrix(rows: &[Vec<f64>]) -> Array2<f64> {
    let width = rows.first().map_or(0, Vec::len);
    Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i][j])
}

/// Extract, split and transform `records`.
pub fn prepare(records: &[Record], config: &PipelineConfig) -> Result<PreparedData> {
    let split = train_test_split(records.len(), config.test_ratio, config.seed)?;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    let features = FeatureExtractor::new().extract_batch(&urls);
    let rows = to_rows(&features);
    info!("Extracted {} features from {} URLs", NUM_FEATURES, rows.len());

    let mut x_train = split::gather(&rows, &split.train);
    let mut x_test = split::gather(&rows, &split.test);
    let y_train = split.train.iter().map(|&i| records[i].label).collect();
    let y_test = split.test.iter().map(|&i| records[i].label).collect();

    let transform = FittedTransform::fit(&x_train, config.categorical)?;
    transform.apply(&mut x_train);
    transform.apply(&mut x_test);

    Ok(PreparedData {
        x_train,
        x_test,
        y_train,
        y_test,
        transform,
    })
}
