//! Export command - download posts from the CMS as CSV

use std::path::Path;

use blogport_core::codec;
use blogport_import::Importer;
use color_eyre::eyre::{Result, WrapErr};

use super::{load_config, print_fatal};

/// Run the export command.
///
/// Writes to `output` when given, otherwise to stdout.
pub async fn run(config_path: &Path, output: Option<&Path>) -> Result<()> {
    tracing::info!(?config_path, ?output, "Starting export");

    let config = load_config(config_path)?;
    let importer = Importer::from_config(&config);

    let records = match importer.export().await {
        Ok(records) => records,
        Err(e) => {
            print_fatal(&e);
            return Err(e).wrap_err("Export aborted");
        }
    };

    let csv = codec::serialize(&records).wrap_err("Failed to serialize records")?;

    match output {
        Some(path) => {
            std::fs::write(path, csv)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Exported {} post(s) to {}", records.len(), path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}
