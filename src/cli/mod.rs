//! CLI command definitions and handlers

mod clean;
mod features;
mod init;
mod predict;
mod train;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use malurl::dataset::clean::DEFAULT_CLEANED_FILE;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a held-out fraction strictly between 0 and 1
fn parse_ratio(s: &str) -> Result<f64, String> {
    let r: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if r > 0.0 && r < 1.0 {
        Ok(r)
    } else {
        Err("test ratio must be between 0 and 1 (exclusive)".to_string())
    }
}

/// malurl - Malicious URL classifier
#[derive(Parser, Debug)]
#[command(name = "malurl")]
#[command(
    version,
    about = "Classify URLs as malicious or benign with tree-ensemble models",
    long_about = "malurl derives lexical and domain features from URLs, trains a random \
forest or gradient-boosted classifier on a labeled CSV, and reports precision, recall, \
F1 and accuracy on a held-out test set.",
    after_help = "\
Examples:
  malurl clean urls.csv                        Deduplicate and normalise labels
  malurl train                                 Train on cleaned_data.csv
  malurl train data.csv --backend gbdt         Gradient boosting instead of a forest
  malurl train --chart importance --top-n 5    Plot the five strongest features
  malurl train --save model.json               Keep the fitted model
  malurl predict --model model.json http://free-login.example.tk
  malurl features https://www.example.com/login"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: all cores)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Config file to use instead of ./malurl.toml
    #[arg(long, global = true, env = "MALURL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalise labels, drop incomplete rows and duplicates, write a clean CSV
    #[command(after_help = "\
Examples:
  malurl clean urls.csv                  Writes cleaned_data.csv
  malurl clean urls.csv -o clean.csv     Custom output path")]
    Clean {
        /// Labeled URL CSV (url,label)
        input: PathBuf,

        /// Output CSV path
        #[arg(long, short = 'o', default_value = DEFAULT_CLEANED_FILE)]
        output: PathBuf,
    },

    /// Train a classifier and report test-set metrics
    #[command(after_help = "\
Examples:
  malurl train                                   Random forest on cleaned_data.csv
  malurl train data.csv --oversample             Balance classes before fitting
  malurl train --backend gradient-boosting       Boosted trees (no importance chart)
  malurl train --chart precision                 Weighted precision vs accuracy
  malurl train --format json > run.json          Machine-readable report")]
    Train(TrainArgs),

    /// Classify URLs with a saved model bundle
    Predict {
        /// Model bundle written by `train --save`
        #[arg(long, short = 'm')]
        model: PathBuf,

        /// URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Print the extracted feature map of each URL
    Features {
        /// URLs to inspect
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write an example malurl.toml in the current directory
    Init {
        /// Overwrite an existing malurl.toml
        #[arg(long)]
        force: bool,
    },
}

/// Options of the `train` command; unset values fall back to the config files
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled URL CSV
    #[arg(default_value = DEFAULT_CLEANED_FILE)]
    pub input: PathBuf,

    /// Classifier backend: random-forest (rf), gradient-boosting (gbdt)
    #[arg(long, short = 'b', value_parser = ["random-forest", "rf", "gradient-boosting", "gbdt"])]
    pub backend: Option<String>,

    /// Number of trees / boosting iterations
    #[arg(long)]
    pub trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Randomly oversample the minority class before fitting
    #[arg(long)]
    pub oversample: bool,

    /// Chart to draw after the report: precision, importance
    #[arg(long, value_parser = ["precision", "importance"])]
    pub chart: Option<String>,

    /// Features shown in the importance chart
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Save the fitted model bundle to this path
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Seed for the split, oversampling and trees
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for testing
    #[arg(long, value_parser = parse_ratio)]
    pub test_ratio: Option<f64>,

    /// Domain/TLD encoding: vocabulary, hash
    #[arg(long, value_parser = ["vocabulary", "hash"])]
    pub categorical: Option<String>,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    // num_threads(0) lets rayon pick one thread per core
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.workers.unwrap_or(0))
        .build()
        .context("Failed to build worker pool")?;

    let config_path = cli.config;
    pool.install(move || match cli.command {
        Commands::Clean { input, output } => clean::run(&input, &output),
        Commands::Train(args) => train::run(args, config_path.as_deref()),
        Commands::Predict { model, urls, format } => predict::run(&model, &urls, &format),
        Commands::Features { urls, format } => features::run(&urls, &format),
        Commands::Init { force } => init::run(force),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4"), Ok(4));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("0.25"), Ok(0.25));
        assert!(parse_ratio("0").is_err());
        assert!(parse_ratio("1.5").is_err());
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["malurl", "train"]).unwrap();
        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.input, PathBuf::from(DEFAULT_CLEANED_FILE));
                assert_eq!(args.format, "text");
                assert!(args.backend.is_none());
                assert!(!args.oversample);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_predict_requires_urls() {
        assert!(Cli::try_parse_from(["malurl", "predict", "--model", "m.json"]).is_err());
    }
}
