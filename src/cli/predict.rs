//! Predict command - classify URLs with a saved model bundle

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use malurl::classifier::ModelBundle;
use malurl::dataset::Label;

pub fn run(model: &Path, urls: &[String], format: &str) -> Result<()> {
    let bundle = ModelBundle::load(model)
        .with_context(|| format!("Failed to load model bundle {}", model.display()))?;
    let predictions = bundle.classify(urls);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    for p in &predictions {
        let tag = match p.label {
            Label::Malicious => style("MALICIOUS").red().bold(),
            Label::Benign => style("benign   ").green(),
        };
        println!("{}  {:.3}  {}", tag, p.malicious_probability, p.url);
    }
    Ok(())
}
