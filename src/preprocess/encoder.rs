//! Vocabulary encoding of hashed categorical columns

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index given to categories not seen during fitting
pub const UNSEEN_INDEX: usize = 0;

/// Maps each distinct value of a categorical column to a dense index.
///
/// Indices start at 1 in order of first appearance in the fitting rows;
/// [`UNSEEN_INDEX`] is reserved for values that only show up later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEncoder {
    columns: Vec<usize>,
    /// One vocabulary per column, keyed by the value's bit pattern
    vocab: Vec<HashMap<u64, usize>>,
}

impl VocabularyEncoder {
    pub fn fit(rows: &[Vec<f64>], columns: &[usize]) -> Self {
        let vocab = columns
            .iter()
            .map(|&col| {
                let mut map = HashMap::new();
                for row in rows {
                    let next = map.len() + 1;
                    map.entry(row[col].to_bits()).or_insert(next);
                }
                map
            })
            .collect();

        Self {
            columns: columns.to_vec(),
            vocab,
        }
    }

    pub fn transform(&self, rows: &mut [Vec<f64>]) {
        for row in rows.iter_mut() {
            self.transform_row(row);
        }
    }

    pub fn transform_row(&self, row: &mut [f64]) {
        for (map, &col) in self.vocab.iter().zip(&self.columns) {
            let idx = map.get(&row[col].to_bits()).copied().unwrap_or(UNSEEN_INDEX);
            row[col] = idx as f64;
        }
    }
}
