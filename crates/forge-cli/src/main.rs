//! # forge-cli
//!
//! Command line collector for Puppet Forge modules.
//!
//! Fetches every module updated since a given date, enriched with its
//! releases and owner profile, and writes one JSON item per line to stdout.
//! Logs go to stderr.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;
use forge_core::error::{ForgeError, ForgeResult};
use forge_core::utils::str_to_datetime;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;
use output::JsonLinesWriter;

/// Fetch modules, releases and owners from a Puppet Forge registry
#[derive(Parser, Debug)]
#[command(name = "puppetforge", version, about = "Fetch modules from a Puppet Forge registry")]
pub struct Cli {
    /// Category of items to fetch
    #[arg(long, default_value = "module")]
    pub category: String,

    /// Page size of list requests
    #[arg(long, value_name = "N")]
    pub max_items: Option<u32>,

    /// Only fetch modules updated at or after this date
    #[arg(long, value_name = "DATE", value_parser = parse_from_date)]
    pub from_date: Option<DateTime<Utc>>,

    /// Tag attached to every item; defaults to the registry URL
    #[arg(long)]
    pub tag: Option<String>,

    /// Record every response to the archive
    #[arg(long, conflicts_with = "fetch_archive")]
    pub archive: bool,

    /// Replay responses from the archive without touching the network
    #[arg(long)]
    pub fetch_archive: bool,

    /// Archive directory
    #[arg(long, value_name = "DIR")]
    pub archive_path: Option<Utf8PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub no_ssl_verify: bool,

    /// Configuration file; forge.toml is searched upward from the cwd otherwise
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_from_date(value: &str) -> Result<DateTime<Utc>, String> {
    str_to_datetime(value).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.json_logs);
    setup_panic_handler();

    info!("Starting puppetforge v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run_cli(cli) {
        error!("{}", err);
        eprintln!("{}", ErrorFormatter::new().format_error(&err));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> ForgeResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ForgeError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        let mut out = JsonLinesWriter::new(std::io::stdout().lock());
        commands::fetch::execute(&cli, &ctx, &mut out).await?;
        Ok(())
    })
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "forge_cli={l},forge_registry={l},forge_config={l},forge_core={l}",
            l = level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("puppetforge encountered an unexpected error: {}", panic_info);
        eprintln!("puppetforge crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
