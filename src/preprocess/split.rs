//! Seeded train/test partitioning

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{MalurlError, Result};

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for `n` rows at `test_ratio`: `ceil(test_ratio * n)`
pub fn test_size(n: usize, test_ratio: f64) -> usize {
    (test_ratio * n as f64).ceil() as usize
}

/// Shuffle `0..n` with a seeded RNG and cut it into test (head) and train
/// (tail) partitions.
///
/// Deterministic for a given `n`, `test_ratio` and `seed`. Both partitions
/// must end up non-empty.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(MalurlError::InvalidSplit(format!(
            "test ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    let n_test = test_size(n, test_ratio);
    if n_test == 0 || n_test >= n {
        return Err(MalurlError::InvalidSplit(format!(
            "{n} rows cannot be split at test ratio {test_ratio}; need at least one row per partition"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    Ok(SplitIndices { train, test: order })
}

/// Gather `items[i]` for each index, in index order
pub fn gather<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sizes_follow_ratio() {
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        // rounding up, as scikit-learn does
        let split = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let split = train_test_split(57, 0.2, 7).unwrap();
        let train: HashSet<_> = split.train.iter().copied().collect();
        let test: HashSet<_> = split.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 57);
        assert!(train.union(&test).all(|&i| i < 57));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = train_test_split(500, 0.2, 42).unwrap();
        let b = train_test_split(500, 0.2, 42).unwrap();
        let c = train_test_split(500, 0.2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(MalurlError::InvalidSplit(_))
        ));
        assert!(train_test_split(0, 0.2, 42).is_err());
        assert!(train_test_split(10, 0.0, 42).is_err());
    }

    #[test]
    fn test_gather() {
        let items = vec!["a", "b", "c", "d"];
        assert_eq!(gather(&items, &[3, 0]), vec!["d", "a"]);
    }
}
