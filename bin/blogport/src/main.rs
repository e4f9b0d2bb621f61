//! Blogport CLI
//!
//! Imports blog posts from CSV into a headless CMS and exports them back.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Blogport.
#[derive(Parser)]
#[command(
    name = "blogport",
    version,
    about = "Import blog posts from CSV into a headless CMS"
)]
struct Cli {
    /// Path to configuration file (optional; environment variables also apply)
    #[arg(short, long, default_value = "blogport.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP import API
    Serve {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Import posts from a CSV file
    Import {
        /// CSV file to import
        file: PathBuf,
        /// Parse and print the records without contacting the CMS
        #[arg(long)]
        dry_run: bool,
    },
    /// Export existing posts as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate configuration and CMS credentials
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    blogport::init_tracing(cli.verbose);

    match cli.command {
        Commands::Serve { host, port } => {
            blogport::cmd::serve::run(&cli.config, host, port).await?;
        }
        Commands::Import { file, dry_run } => {
            blogport::cmd::import::run(&cli.config, &file, dry_run).await?;
        }
        Commands::Export { output } => {
            blogport::cmd::export::run(&cli.config, output.as_deref()).await?;
        }
        Commands::Check => {
            blogport::cmd::check::run(&cli.config).await?;
        }
    }

    Ok(())
}
