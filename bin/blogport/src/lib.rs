//! Blogport CLI Library
//!
//! Command implementations and the HTTP service behind the `blogport`
//! binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (serve, import, export, check)
//! - [`server`] - HTTP API for browser-driven imports and CSV downloads
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use blogport::cmd;
//!
//! # async fn demo() -> color_eyre::eyre::Result<()> {
//! cmd::import::run(Path::new("blogport.toml"), Path::new("posts.csv"), true).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;
pub mod server;

pub use blogport_core::{Config, ImportRecord};
pub use blogport_import::{ImportError, ImportReport, Importer};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// `RUST_LOG` directives are honoured on top of the chosen level.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
