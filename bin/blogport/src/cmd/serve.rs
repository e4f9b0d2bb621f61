//! Serve command - run the HTTP API

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;

use super::load_config;
use crate::server::{ServerState, create_router};

/// Run the serve command.
///
/// `host` and `port` override the `[server]` section.
pub async fn run(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let missing = config.cms.missing_credentials();
    if !missing.is_empty() {
        tracing::warn!(?missing, "CMS credentials missing, imports will be rejected");
    }

    let addr = config.server.addr();
    let state = Arc::new(ServerState::new(&config));
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(%addr, "Listening");
    println!();
    println!("  Import API running at http://{addr}");
    println!("  POST /import       import posts (JSON)");
    println!("  GET  /export.csv   download all posts");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app).await.wrap_err("Server error")?;

    Ok(())
}
