//! Random forest of `linfa-trees` decision trees
//!
//! Each member is a Gini tree fitted on a bootstrap sample of the rows and a
//! random subset of the feature columns. Members are fitted in parallel with
//! rayon; every member draws from its own ChaCha stream derived from the base
//! seed, so a fitted forest does not depend on how rayon schedules the work.

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Axis};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MalurlError, Result};
use crate::preprocess::to_matrix;

/// Fraction of the feature columns each member sees
pub const DEFAULT_FEATURE_SUBSAMPLE: f64 = 0.7;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Draw a bootstrap sample per tree (otherwise every tree sees all rows)
    pub bootstrap: bool,
    /// Maximum depth; unlimited when `None`
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub feature_subsample: f64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            bootstrap: true,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            feature_subsample: DEFAULT_FEATURE_SUBSAMPLE,
        }
    }
}

/// Columns drawn per member: `ceil(fraction * n_features)`, at least 1
pub fn subsample_size(n_features: usize, fraction: f64) -> usize {
    ((n_features as f64 * fraction).ceil() as usize).clamp(1, n_features.max(1))
}

#[derive(Serialize, Deserialize)]
struct Member {
    /// Columns of the full row this tree was fitted on, ascending
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Fitted random forest
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    members: Vec<Member>,
    /// Mean of the per-tree importances, normalised to sum to 1
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fit on rows `x` with class ids `y` (1 = positive).
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: &ForestParams) -> Result<Self> {
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
        if params.n_trees == 0 {
            return Err(MalurlError::Training("forest needs at least one tree".into()));
        }

        let n = x.len();
        let n_features = x[0].len();
        let k = subsample_size(n_features, params.feature_subsample);
        let records = to_matrix(x);
        let targets: Array1<usize> = y.iter().map(|&c| usize::from(c)).collect();

        let members = (0..params.n_trees)
            .into_par_iter()
            .map(|t| -> Result<Member> {
                let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
                rng.set_stream(t as u64);
                let rows: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut features = index::sample(&mut rng, n_features, k).into_vec();
                features.sort_unstable();

                let dataset = Dataset::new(
                    records.select(Axis(0), &rows).select(Axis(1), &features),
                    targets.select(Axis(0), &rows),
                );
                let tree = DecisionTree::<f64, usize>::params()
                    .split_quality(SplitQuality::Gini)
                    .max_depth(params.max_depth)
                    .min_weight_split(params.min_samples_split as f32)
                    .min_weight_leaf(params.min_samples_leaf as f32)
                    .fit(&dataset)
                    .map_err(|e| MalurlError::Training(format!("tree {t}: {e}")))?;
                Ok(Member { features, tree })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut importances = vec![0.0; n_features];
        for member in &members {
            for (&col, v) in member.features.iter().zip(member.tree.feature_importance()) {
                // a tree that never split (single-class sample) reports NaN
                if v.is_finite() {
                    importances[col] += v;
                }
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            importances.iter_mut().for_each(|v| *v /= sum);
        }

        Ok(Self { members, importances })
    }

    /// Fraction of members voting positive, per row
    pub fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }
        let records = to_matrix(rows);
        let votes = self
            .members
            .par_iter()
            .map(|m| {
                let predicted: Array1<usize> = m.tree.predict(&records.select(Axis(1), &m.features));
                predicted.mapv(|c| if c == 1 { 1.0 } else { 0.0 })
            })
            .reduce(|| Array1::zeros(rows.len()), |a, b| a + b);

        let n_trees = self.members.len() as f64;
        votes.iter().map(|v| v / n_trees).collect()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two noisy clusters separated along feature 0; feature 1 is noise.
    fn clusters(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..n {
            let label = (i % 2) as u8;
            let centre = if label == 1 { 5.0 } else { 0.0 };
            x.push(vec![
                centre + rng.random_range(-1.0..1.0),
                rng.random_range(0.0..10.0),
            ]);
            y.push(label);
        }
        (x, y)
    }

    #[test]
    fn test_subsample_size() {
        assert_eq!(subsample_size(9, 0.7), 7);
        assert_eq!(subsample_size(2, 0.7), 2);
        assert_eq!(subsample_size(9, 0.01), 1);
        assert_eq!(subsample_size(0, 0.7), 1);
    }

    #[test]
    fn test_learns_separable_clusters() {
        let (x, y) = clusters(200);
        let params = ForestParams {
            n_trees: 20,
            ..Default::default()
        };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let probs = forest.predict_proba_batch(&[vec![5.0, 3.0], vec![0.0, 3.0]]);
        assert!(probs[0] > 0.9, "{probs:?}");
        assert!(probs[1] < 0.1, "{probs:?}");

        let imp = forest.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[1], "informative feature should dominate: {imp:?}");
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = clusters(100);
        let params = ForestParams {
            n_trees: 10,
            ..Default::default()
        };
        let a = RandomForest::fit(&x, &y, &params).unwrap();
        let b = RandomForest::fit(&x, &y, &params).unwrap();
        assert_eq!(a.feature_importances(), b.feature_importances());
        assert_eq!(a.predict_proba_batch(&x), b.predict_proba_batch(&x));

        let other = ForestParams { seed: 1, ..params };
        let c = RandomForest::fit(&x, &y, &other).unwrap();
        assert_ne!(a.feature_importances(), c.feature_importances());
    }

    #[test]
    fn test_single_class_fits() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let forest = RandomForest::fit(&x, &[0; 10], &ForestParams { n_trees: 3, ..Default::default() }).unwrap();
        assert!(forest.predict_proba_batch(&x).iter().all(|&p| p == 0.0));
        assert!(forest.feature_importances().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_survives_json_roundtrip() {
        let (x, y) = clusters(60);
        let forest = RandomForest::fit(&x, &y, &ForestParams { n_trees: 5, ..Default::default() }).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let back: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.predict_proba_batch(&x), forest.predict_proba_batch(&x));
        assert_eq!(back.feature_importances(), forest.feature_importances());
    }

    #[test]
    fn test_validation_errors() {
        let err = RandomForest::fit(&[], &[], &ForestParams::default()).err().unwrap();
        assert!(err.to_string().contains("no training samples"));

        let err = RandomForest::fit(&[vec![1.0], vec![2.0]], &[1], &ForestParams::default()).err().unwrap();
        assert!(err.to_string().contains("does not match"));
    }
}
