//! Import command - push a CSV file into the CMS

use std::{path::Path, time::Instant};

use blogport_core::{ImportRecord, codec};
use blogport_import::{ImportReport, Importer};
use color_eyre::eyre::{Result, WrapErr, bail};

use super::{load_config, print_fatal};

/// Run the import command.
///
/// With `dry_run` the file is parsed and printed but nothing is sent.
pub async fn run(config_path: &Path, file: &Path, dry_run: bool) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?file, dry_run, "Starting import");

    let records = read_records(file)?;
    println!("Parsed {} record(s) from {}", records.len(), file.display());

    if dry_run {
        print_records(&records);
        return Ok(());
    }

    let config = load_config(config_path)?;
    let importer = Importer::from_config(&config);

    let report = match importer.run(&records).await {
        Ok(report) => report,
        Err(e) => {
            print_fatal(&e);
            return Err(e).wrap_err("Import aborted");
        }
    };

    print_report(&report);
    tracing::info!(duration = ?start.elapsed(), "Import finished");

    if report.failed > 0 {
        bail!("{} record(s) failed to import", report.failed);
    }
    Ok(())
}

/// Read and parse a CSV file.
pub fn read_records(file: &Path) -> Result<Vec<ImportRecord>> {
    let text = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    codec::parse(&text).wrap_err_with(|| format!("Failed to parse {}", file.display()))
}

fn print_records(records: &[ImportRecord]) {
    println!();
    for (i, record) in records.iter().enumerate() {
        let image = if record.image_url().is_some() { " [image]" } else { "" };
        println!(
            "  {:>3}. {} ({}) {:.2}{image}",
            i + 1,
            record.title,
            record.slug,
            record.price_or_zero()
        );
    }
    println!();
    println!("Dry run: nothing was sent");
}

fn print_report(report: &ImportReport) {
    println!();
    for outcome in &report.results {
        println!("  ✓ {}: {}", outcome.title, outcome.status);
        for warning in &outcome.warnings {
            println!("    ⚠ {warning}");
        }
    }
    for err in &report.errors {
        println!("  ✗ {}: {}", err.title, err.error);
    }

    println!();
    println!("  Import Summary:");
    println!("  ─────────────────────────────────");
    println!("  Imported:     {:>6}", report.created);
    println!("  Skipped:      {:>6}", report.skipped);
    println!("  Failed:       {:>6}", report.failed);
    println!("  ─────────────────────────────────");
    println!("  Total:        {:>6}", report.total());
    println!();
}
