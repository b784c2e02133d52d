//! Train command - run the experiment pipeline and report metrics

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::warn;

use malurl::config::PipelineConfig;
use malurl::pipeline::{Pipeline, PipelineOutput};
use malurl::reporters::{self, chart, ChartKind, OutputFormat};

use super::TrainArgs;

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Layer CLI flags over the file-based config
fn apply_overrides(config: &mut PipelineConfig, args: &TrainArgs) -> Result<()> {
    if let Some(backend) = &args.backend {
        config.backend = backend.parse()?;
    }
    if let Some(trees) = args.trees {
        config.n_trees = trees;
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }
    if args.oversample {
        config.oversample = true;
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ratio) = args.test_ratio {
        config.test_ratio = ratio;
    }
    if let Some(categorical) = &args.categorical {
        config.categorical = categorical.parse()?;
    }
    config.validate()?;
    Ok(())
}

pub fn run(args: TrainArgs, config_path: Option<&Path>) -> Result<()> {
    let start_time = Instant::now();
    let format: OutputFormat = args.format.parse()?;
    let chart_kind = args.chart.as_deref().map(str::parse::<ChartKind>).transpose()?;

    let mut config = PipelineConfig::load(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args)?;
    let pipeline = Pipeline::new(config);

    let spinner = ProgressBar::new_spinner();
    if format == OutputFormat::Text {
        spinner.set_style(create_spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
    } else {
        spinner.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let result = pipeline.run(&args.input, |stage| spinner.set_message(stage.to_string()));
    spinner.finish_and_clear();
    let PipelineOutput { summary, bundle } = result?;

    print!("{}", reporters::report_with_format(&summary, format)?);

    if format != OutputFormat::Text && chart_kind.is_some() {
        warn!("--chart is only drawn with text output; skipping chart for {format}");
    } else {
        match chart_kind {
            Some(ChartKind::Precision) => print!("{}", chart::precision_chart(&summary.evaluation)),
            Some(ChartKind::Importance) => match &summary.feature_importances {
                Some(ranked) => print!(
                    "{}",
                    chart::importance_chart(ranked, pipeline.config().top_n)
                ),
                None => warn!(
                    "{} does not expose feature importances; skipping chart",
                    summary.backend
                ),
            },
            None => {}
        }
    }

    if let Some(path) = &args.save {
        bundle
            .save(path)
            .with_context(|| format!("Failed to save model bundle to {}", path.display()))?;
        if format == OutputFormat::Text {
            println!(
                "\n{} Model saved to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    if format == OutputFormat::Text {
        print_resource_usage(start_time);
    }
    Ok(())
}

/// Print elapsed time and, where available, peak resident memory
fn print_resource_usage(start_time: Instant) {
    let elapsed = start_time.elapsed();
    let mut line = format!("\nTraining complete in {:.2}s", elapsed.as_secs_f64());
    if let Some(kb) = peak_memory_kb() {
        line.push_str(&format!(", peak memory {:.1} MB", kb as f64 / 1024.0));
    }
    println!("{}", style(line).dim());
}

#[cfg(target_os = "linux")]
fn peak_memory_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_hwm(&status)
}

#[cfg(not(target_os = "linux"))]
fn peak_memory_kb() -> Option<u64> {
    None
}

/// Extract `VmHWM` (peak RSS, kB) from /proc/self/status content
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_hwm(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmHWM:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn train_args(argv: &[&str]) -> TrainArgs {
        let mut full = vec!["malurl", "train"];
        full.extend_from_slice(argv);
        match super::super::Cli::parse_from(full).command {
            super::super::Commands::Train(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_take_priority() {
        let args = train_args(&["--backend", "gbdt", "--trees", "7", "--seed", "9", "--oversample"]);
        let mut config = PipelineConfig::default();
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.backend, malurl::config::Backend::GradientBoosting);
        assert_eq!(config.n_trees, 7);
        assert_eq!(config.seed, 9);
        assert!(config.oversample);
        assert_eq!(config.test_ratio, 0.2);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = train_args(&["--trees", "0"]);
        let mut config = PipelineConfig::default();
        assert!(apply_overrides(&mut config, &args).is_err());
    }

    #[test]
    fn test_parse_vm_hwm() {
        let status = "Name:\tmalurl\nVmPeak:\t  20000 kB\nVmHWM:\t    5120 kB\nVmRSS:\t 4000 kB\n";
        assert_eq!(parse_vm_hwm(status), Some(5120));
        assert_eq!(parse_vm_hwm("Name:\tmalurl\n"), None);
    }
}
