//! Pipeline configuration
//!
//! Loaded from, lowest to highest priority:
//! 1. Built-in defaults
//! 2. User config (`~/.config/malurl/config.toml`)
//! 3. Project config (`malurl.toml` in the working directory, or `--config`)
//! 4. CLI flags (applied by the caller)
//!
//! ```toml
//! # malurl.toml
//! backend = "random-forest"   # or "gradient-boosting"
//! n_trees = 100
//! seed = 42
//! test_ratio = 0.2
//! oversample = false
//! categorical = "vocabulary"  # or "hash"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MalurlError, Result};

/// Project config file name looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "malurl.toml";

/// Classifier backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    RandomForest,
    GradientBoosting,
}

impl FromStr for Backend {
    type Err = MalurlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "random-forest" | "rf" | "forest" => Ok(Backend::RandomForest),
            "gradient-boosting" | "gbdt" | "xgboost" => Ok(Backend::GradientBoosting),
            _ => Err(MalurlError::Config(format!(
                "unknown backend '{s}'. Valid backends: random-forest, gradient-boosting"
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::RandomForest => write!(f, "random-forest"),
            Backend::GradientBoosting => write!(f, "gradient-boosting"),
        }
    }
}

/// How the hashed domain/suffix columns reach the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalEncoding {
    /// Vocabulary-to-index mapping fitted on the training partition
    #[default]
    Vocabulary,
    /// Stable hash value used directly
    Hash,
}

impl FromStr for CategoricalEncoding {
    type Err = MalurlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(CategoricalEncoding::Vocabulary),
            "hash" => Ok(CategoricalEncoding::Hash),
            _ => Err(MalurlError::Config(format!(
                "unknown categorical encoding '{s}'. Valid values: vocabulary, hash"
            ))),
        }
    }
}

/// Effective settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of rows held out for testing
    pub test_ratio: f64,
    /// Seed for the split, oversampling and tree randomness
    pub seed: u64,
    pub backend: Backend,
    /// Trees in the forest, or boosting iterations
    pub n_trees: usize,
    /// Maximum tree depth (unlimited for the forest when unset)
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Shrinkage for gradient boosting
    pub learning_rate: f64,
    /// Randomly oversample the minority class before fitting
    pub oversample: bool,
    pub categorical: CategoricalEncoding,
    /// Bars in the feature-importance chart
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            backend: Backend::RandomForest,
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            learning_rate: 0.1,
            oversample: false,
            categorical: CategoricalEncoding::Vocabulary,
            top_n: 9,
        }
    }
}

/// On-disk form; every field optional so files can be layered
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub test_ratio: Option<f64>,
    pub seed: Option<u64>,
    pub backend: Option<Backend>,
    pub n_trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
    pub min_samples_leaf: Option<usize>,
    pub learning_rate: Option<f64>,
    pub oversample: Option<bool>,
    pub categorical: Option<CategoricalEncoding>,
    pub top_n: Option<usize>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MalurlError::Config(e.to_string()))
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MalurlError::Config(format!("{}: {e}", path.display())))
    }
}

impl PipelineConfig {
    /// Load defaults, then user config, then the project config.
    ///
    /// `explicit` replaces the `malurl.toml` lookup and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path().filter(|p| p.exists()) {
            match ConfigFile::read(&user_path) {
                Ok(file) => {
                    debug!("Loaded user config from {}", user_path.display());
                    config.merge(file);
                }
                Err(e) => warn!("Ignoring user config: {}", e),
            }
        }

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(MalurlError::FileNotFound(path.to_path_buf()));
                }
                config.merge(ConfigFile::read(path)?);
            }
            None => {
                let project = Path::new(PROJECT_CONFIG_FILE);
                if project.exists() {
                    debug!("Loaded project config from {}", project.display());
                    config.merge(ConfigFile::read(project)?);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("malurl").join("config.toml"))
    }

    /// Merge a config file into this one (file takes priority)
    pub fn merge(&mut self, other: ConfigFile) {
        if let Some(v) = other.test_ratio {
            self.test_ratio = v;
        }
        if let Some(v) = other.seed {
            self.seed = v;
        }
        if let Some(v) = other.backend {
            self.backend = v;
        }
        if let Some(v) = other.n_trees {
            self.n_trees = v;
        }
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if let Some(v) = other.min_samples_split {
            self.min_samples_split = v;
        }
        if let Some(v) = other.min_samples_leaf {
            self.min_samples_leaf = v;
        }
        if let Some(v) = other.learning_rate {
            self.learning_rate = v;
        }
        if let Some(v) = other.oversample {
            self.oversample = v;
        }
        if let Some(v) = other.categorical {
            self.categorical = v;
        }
        if let Some(v) = other.top_n {
            self.top_n = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(MalurlError::Config(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.n_trees == 0 {
            return Err(MalurlError::Config("n_trees must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(MalurlError::Config("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(MalurlError::Config("min_samples_split must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(MalurlError::Config("min_samples_leaf must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(MalurlError::Config("learning_rate must be positive".into()));
        }
        Ok(())
    }

    /// Example project config written by `malurl init`
    pub fn example_toml() -> &'static str {
        r#"# malurl project configuration

# Classifier: "random-forest" or "gradient-boosting"
backend = "random-forest"

# Trees in the forest / boosting iterations
n_trees = 100

# max_depth = 6
min_samples_split = 2
min_samples_leaf = 1

# Gradient boosting shrinkage
learning_rate = 0.1

# Hold-out fraction and seed for the train/test split
test_ratio = 0.2
seed = 42

# Balance classes by random oversampling of the minority class
oversample = false

# Domain/TLD columns: "vocabulary" (fitted index) or "hash" (stable hash)
categorical = "vocabulary"

# Bars in the feature-importance chart
top_n = 9
"#
    }
}
