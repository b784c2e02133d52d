//! Error types shared by the library modules

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data, training, or evaluating
#[derive(Error, Debug)]
pub enum MalurlError {
    #[error("The file {} was not found.", .0.display())]
    FileNotFound(PathBuf),

    #[error("The file {} is empty.", .0.display())]
    EmptyInput(PathBuf),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No usable rows in {path}: {reason}")]
    NoUsableRows { path: String, reason: String },

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Failed to (de)serialize model bundle: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Feature schema mismatch: bundle has v{found}, this build expects v{expected}")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, MalurlError>;
