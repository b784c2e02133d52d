//! Features command - show what the extractor sees for each URL

use anyhow::Result;
use console::style;
use serde_json::json;

use malurl::features::{normalize_url, FeatureExtractor, FEATURE_NAMES};

pub fn run(urls: &[String], format: &str) -> Result<()> {
    let features = FeatureExtractor::new().extract_batch(urls);

    if format == "json" {
        let items: Vec<_> = urls
            .iter()
            .zip(&features)
            .map(|(url, f)| json!({ "url": url, "features": f.as_map() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let width = FEATURE_NAMES.iter().map(|n| n.len()).max().unwrap_or(0);
    for (url, f) in urls.iter().zip(&features) {
        println!("{}", style(url).bold());
        println!("  {}", style(format!("normalized: {}", normalize_url(url))).dim());
        for (name, value) in FEATURE_NAMES.iter().zip(f.to_row()) {
            println!("  {:<width$}  {}", name, value);
        }
        println!();
    }
    Ok(())
}
