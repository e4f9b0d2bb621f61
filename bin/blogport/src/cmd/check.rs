//! Check command - validate configuration and CMS access

use std::path::Path;

use blogport_core::Config;
use blogport_import::Importer;
use color_eyre::eyre::{Result, bail};

use super::print_fatal;

/// Run the check command.
///
/// Validates configuration and, when credentials are set, that the token can
/// access the configured space.
pub async fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Checking configuration");

    println!("Checking configuration...");
    let config = match Config::load_with_env(Some(config_path)) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Validation failed: {e}");
        }
    };

    for line in describe(&config) {
        println!("    {line}");
    }

    println!("\nChecking CMS access...");
    match Importer::from_config(&config).connect().await {
        Ok(client) => {
            println!("  ✓ Management token can access space {}", client.space_id());
        }
        Err(e) => {
            print_fatal(&e);
            bail!("CMS check failed: {}", e.headline());
        }
    }

    println!();
    println!("✓ All checks passed");
    Ok(())
}

/// Human-readable summary of the effective settings. Never includes secrets.
fn describe(config: &Config) -> Vec<String> {
    let cms = &config.cms;
    let credential = |set: bool| if set { "set" } else { "missing" };

    vec![
        format!("API:          {}", cms.api_url),
        format!(
            "Space:        {}",
            cms.space_id.as_deref().unwrap_or("(missing)")
        ),
        format!("Environment:  {}", cms.environment),
        format!("Locale:       {}", cms.locale),
        format!("Content type: {}", cms.content_type),
        format!(
            "Token:        {}",
            credential(cms.management_token.as_deref().is_some_and(|t| !t.trim().is_empty()))
        ),
    ]
}
