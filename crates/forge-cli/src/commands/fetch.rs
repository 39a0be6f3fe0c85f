//! `fetch`: stream items from the registry, the archive, or both.

use std::io::Write;
use std::time::Duration;

use forge_config::{ArchiveMode, CliOverrides, ConfigLoader, ForgeConfig};
use forge_core::error::ForgeResult;
use forge_registry::{
    Archive, ForgeClient, HttpTransport, PuppetForge, RecordingTransport, ReplayTransport,
    RetryConfig, Transport, TransportConfig,
};
use tracing::{debug, info};

use super::CommandContext;
use crate::output::JsonLinesWriter;
use crate::Cli;

/// Run a fetch and write every item to `out`; returns the number of items
pub async fn execute<W: Write>(
    cli: &Cli,
    ctx: &CommandContext,
    out: &mut JsonLinesWriter<W>,
) -> ForgeResult<usize> {
    let loader = ConfigLoader::new(ctx.cwd.clone());
    let (config, source) = loader.load(cli.config.as_deref(), &overrides(cli)).await?;
    debug!("Configuration loaded from {:?}: {:?}", source, config);

    let transport = build_transport(&config).await?;
    let client = ForgeClient::with_transport(&config.base_url, config.max_items, transport)?;
    let mut backend = PuppetForge::new(client, config.tag.clone());

    let mut items = backend.fetch(&cli.category, cli.from_date)?;
    while let Some(item) = items.next_item().await? {
        out.write_item(&item)?;
    }
    out.flush()?;

    info!("Wrote {} items", out.written());
    Ok(out.written())
}

/// Map command line flags onto the highest configuration layer
pub fn overrides(cli: &Cli) -> CliOverrides {
    let archive_mode = if cli.fetch_archive {
        Some(ArchiveMode::Replay)
    } else if cli.archive {
        Some(ArchiveMode::Record)
    } else {
        None
    };

    CliOverrides {
        max_items: cli.max_items,
        tag: cli.tag.clone(),
        no_ssl_verify: cli.no_ssl_verify,
        archive_mode,
        archive_path: cli.archive_path.clone(),
    }
}

pub fn transport_config(config: &ForgeConfig) -> TransportConfig {
    TransportConfig {
        ssl_verify: config.ssl_verify,
        timeout: Duration::from_secs(config.timeout_secs),
        retry: RetryConfig {
            max_retries: config.retry.max_retries,
            initial_delay: Duration::from_millis(config.retry.initial_delay_ms),
            max_delay: Duration::from_millis(config.retry.max_delay_ms),
            multiplier: config.retry.multiplier,
        },
        ..TransportConfig::default()
    }
}

async fn build_transport(config: &ForgeConfig) -> ForgeResult<Box<dyn Transport>> {
    let transport: Box<dyn Transport> = match config.archive.mode {
        ArchiveMode::Off => Box::new(HttpTransport::with_config(transport_config(config))?),
        ArchiveMode::Record => {
            let archive = Archive::create(config.archive.resolved_path()?).await?;
            info!("Recording responses to {}", archive.root());
            let http = HttpTransport::with_config(transport_config(config))?;
            Box::new(RecordingTransport::new(http, archive))
        }
        ArchiveMode::Replay => {
            let archive = Archive::open(config.archive.resolved_path()?)?;
            info!("Replaying responses from {}", archive.root());
            Box::new(ReplayTransport::new(archive))
        }
    };

    Ok(transport)
}
