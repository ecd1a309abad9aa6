//! Background connection sweeper daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   tick    ┌────────────────┐  eligible slot  ┌──────────────┐
//!   │  SweepTimer  │──────────▶│ SweepExecutor  │────────────────▶│ DnsConnector │
//!   │ (re-armed at │           │ pools → lists  │                 │ resolve +    │
//!   │  completion) │◀──────────│ → servers →    │                 │ connect      │
//!   └──────────────┘  report   │   slots        │                 └──────┬───────┘
//!                              └────────────────┘                        │
//!                                      ▲               Connected / Disconnected
//!                                      └─────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use bcc_sweeper::config::{load_config, SweeperConfig};
use bcc_sweeper::lifecycle::{signals, Service};
use bcc_sweeper::observability::logging;

#[derive(Parser)]
#[command(name = "bcc-sweeper")]
#[command(about = "Periodically reconnects dead background connections", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not reload the configuration file when it changes.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SweeperConfig::default(),
    };

    logging::init(&config.observability.log_level)?;

    tracing::info!("bcc-sweeper v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        pools = config.pools.len(),
        period = %config.reconnect.period(),
        connect_timeout_ms = config.reconnect.connect_timeout_ms,
        "Configuration loaded"
    );

    let watch_path = if args.no_watch {
        None
    } else {
        args.config.as_deref()
    };
    let service = Service::start(config, watch_path).await?;

    signals::wait_for_shutdown().await;
    service.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
