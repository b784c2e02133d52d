//! Clean command - normalise labels and deduplicate a URL dataset

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use malurl::dataset::clean::{deduplicate, write_records};
use malurl::dataset::{load_records, Label};

/// Rows shown in the preview
const PREVIEW_ROWS: usize = 5;

pub fn run(input: &Path, output: &Path) -> Result<()> {
    let loaded = load_records(input)?;
    let report = &loaded.report;
    if loaded.records.is_empty() {
        anyhow::bail!(
            "No usable rows in {}: every row was missing a value or had an unrecognised label",
            input.display()
        );
    }

    let (records, summary) = deduplicate(loaded.records);

    println!("{}", style("Preview").bold());
    for r in records.iter().take(PREVIEW_ROWS) {
        println!("  {}  {}", style(r.label.id()).dim(), r.url);
    }
    println!();

    println!("Rows read:          {}", report.rows_read);
    println!("Missing values:     {}", report.dropped_missing);
    println!("Unrecognised label: {}", report.dropped_invalid_label);
    println!("Duplicates removed: {}", summary.duplicates_removed);
    println!("Total rows:         {}", summary.rows_out);
    println!();

    println!("{}", style("Label distribution").bold());
    for label in Label::ALL {
        let count = summary.label_counts[label.id() as usize];
        let share = count as f64 / summary.rows_out as f64 * 100.0;
        println!("  {} ({}): {} ({:.1}%)", label, label.id(), count, share);
    }

    write_records(output, &records)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "\n{} Cleaned data saved to {}",
        style("✓").green(),
        style(output.display()).cyan()
    );

    Ok(())
}
