//! Command implementations.

pub mod check;
pub mod export;
pub mod import;
pub mod serve;

use std::path::Path;

use blogport_core::Config;
use blogport_import::ImportError;
use color_eyre::eyre::{Result, WrapErr};

/// Load configuration from `path` (if it exists) layered with the
/// environment.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_with_env(Some(path)).wrap_err("Failed to load configuration")?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Print a fatal import error with its remediation steps.
pub(crate) fn print_fatal(err: &ImportError) {
    eprintln!();
    eprintln!("  ✗ {}", err.headline());
    if let Some(details) = err.details() {
        eprintln!("    {details}");
    }

    let steps = err.remediation();
    if !steps.is_empty() {
        eprintln!();
        for step in &steps {
            eprintln!("  {step}");
        }
    }
    eprintln!();
}
