//! Init command - write an example project config

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use malurl::config::{PipelineConfig, PROJECT_CONFIG_FILE};

/// Run the init command
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(PROJECT_CONFIG_FILE);

    if config_path.exists() && !force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(config_path, PipelineConfig::example_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    if let Some(user_path) = PipelineConfig::user_config_path() {
        println!(
            "\n{}",
            style(format!(
                "Settings can also live in {} (project file wins).",
                user_path.display()
            ))
            .dim()
        );
    }

    Ok(())
}
