//! malurl - malicious URL classification
//!
//! Lexical and domain features per URL, tree-ensemble classifiers, and
//! scikit-learn style evaluation reports. The `malurl` binary wraps these
//! modules in a CLI; everything here is usable as a library too.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod reporters;

pub use error::{MalurlError, Result};
