//! ESGF Request CLI application
//!
//! Compares ESGF search results with the local checksum inventory and
//! optionally writes request files for missing or outdated data.

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use esgf_request::cli::{handle_reconcile, Cli};
use esgf_request::config::{AppConfig, LoggingConfig};
use esgf_request::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("{} error: {}", e.category(), e);
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config.logging);

    info!("ESGF Request v{} starting", env!("CARGO_PKG_VERSION"));

    handle_reconcile(cli, config).await
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, logging: &LoggingConfig) {
    let level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| logging.level.clone());

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("esgf_request={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
