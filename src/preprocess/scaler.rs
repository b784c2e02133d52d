//! Zero-mean / unit-variance scaling of selected columns

use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::Axis;
use serde::{Deserialize, Serialize};

use super::to_matrix;
use crate::error::{MalurlError, Result};

/// `linfa-preprocessing` standard scaler applied to a subset of columns.
///
/// Constant columns are only centred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnScaler {
    columns: Vec<usize>,
    scaler: LinearScaler<f64>,
}

impl ColumnScaler {
    /// Fit mean and scale of `columns` over `rows`.
    pub fn fit(rows: &[Vec<f64>], columns: &[usize]) -> Result<Self> {
        let selected = to_matrix(rows).select(Axis(1), columns);
        let scaler = LinearScaler::standard()
            .fit(&DatasetBase::from(selected))
            .map_err(|e| MalurlError::Training(format!("failed to fit scaler: {e}")))?;
        Ok(Self {
            columns: columns.to_vec(),
            scaler,
        })
    }

    /// Scale the fitted columns in place.
    pub fn transform(&self, rows: &mut [Vec<f64>]) {
        if rows.is_empty() {
            return;
        }
        let selected = to_matrix(rows).select(Axis(1), &self.columns);
        let scaled = self.scaler.transform(selected);
        for (row, values) in rows.iter_mut().zip(scaled.outer_iter()) {
            for (&col, &v) in self.columns.iter().zip(values) {
                row[col] = v;
            }
        }
    }
}
