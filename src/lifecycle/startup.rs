//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the pool registry from configuration
//! - Create the single sweep timer and spawn it
//! - Start background tasks (metrics, admin API, config reload)
//!
//! # Design Decisions
//! - Subsystems initialize in order, not concurrently
//! - The service value owns every task handle; dropping out of `shutdown` joins them

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::admin::{self, AdminState};
use crate::config::watcher::{ConfigWatcher, ReloadPlan};
use crate::config::SweeperConfig;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::net::connector::{Connector, DnsConnector};
use crate::observability::metrics;
use crate::pool::backend_pool::Pool;
use crate::pool::registry::PoolRegistry;
use crate::pool::server::ServerConnection;
use crate::pool::slot::BackgroundSlots;
use crate::sweep::executor::SweepExecutor;
use crate::sweep::stats::SweepStats;
use crate::sweep::timer::{SweepPeriod, SweepTimer};

/// Error type for service startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },
    #[error("failed to bind admin API on {addr}: {source}")]
    AdminBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
}

/// Build pools and server connections as described by the configuration.
///
/// Background slots start disconnected; the first sweep connects them.
pub fn build_registry(config: &SweeperConfig) -> PoolRegistry {
    let registry = PoolRegistry::new();
    for pool_config in &config.pools {
        let pool = Arc::new(Pool::new(pool_config.name.as_str()));
        for server in &pool_config.servers {
            let connection = ServerConnection::new(
                pool.name_arc(),
                server.name.clone(),
                server.address.clone(),
                BackgroundSlots::from_targets(server.background.iter().cloned()),
            );
            pool.attach(server.list, Arc::new(connection));
        }
        tracing::debug!(pool = %pool.name(), servers = pool.len(), "Pool registered");
        registry.insert(pool);
    }
    registry
}

/// A running sweeper with its background tasks.
pub struct Service {
    shutdown: Shutdown,
    registry: Arc<PoolRegistry>,
    stats: Arc<SweepStats>,
    period_tx: Arc<watch::Sender<SweepPeriod>>,
    admin_addr: Option<SocketAddr>,
    tasks: Vec<JoinHandle<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl Service {
    /// Start with the address-resolving TCP connector.
    pub async fn start(
        config: SweeperConfig,
        config_path: Option<&Path>,
    ) -> Result<Self, StartupError> {
        let connector = DnsConnector::from_config(&config.reconnect);
        Self::start_with(config, config_path, connector).await
    }

    /// Start with a caller-provided connector.
    pub async fn start_with<C: Connector>(
        config: SweeperConfig,
        config_path: Option<&Path>,
        connector: C,
    ) -> Result<Self, StartupError> {
        let shutdown = Shutdown::new();
        let mut tasks = Vec::new();

        let registry = Arc::new(build_registry(&config));
        tracing::info!(pools = registry.len(), "Pool registry initialized");

        if config.observability.metrics_enabled {
            let addr = parse_addr("metrics address", &config.observability.metrics_address)?;
            metrics::init_metrics(addr)?;
        }

        let (period_tx, period_rx) = watch::channel(config.reconnect.period());
        let period_tx = Arc::new(period_tx);

        let executor = SweepExecutor::new(Arc::clone(&registry), connector);
        let timer = SweepTimer::new(executor, period_rx.clone());
        let stats = timer.stats();
        tasks.push(tokio::spawn(timer.run(shutdown.subscribe())));

        let mut admin_addr = None;
        if config.admin.enabled {
            let listener = TcpListener::bind(&config.admin.bind_address)
                .await
                .map_err(|source| StartupError::AdminBind {
                    addr: config.admin.bind_address.clone(),
                    source,
                })?;
            admin_addr = listener.local_addr().ok();

            let state = AdminState {
                registry: Arc::clone(&registry),
                stats: Arc::clone(&stats),
                period: period_rx,
                api_key: Arc::from(config.admin.api_key.as_str()),
            };
            let signal = shutdown.subscribe();
            tasks.push(tokio::spawn(async move {
                if let Err(e) = admin::serve(listener, state, signal).await {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            }));
        }

        let mut watcher = None;
        if let Some(path) = config_path {
            let (config_watcher, updates) = ConfigWatcher::new(path);
            watcher = Some(config_watcher.run()?);
            tasks.push(tokio::spawn(apply_reloads(
                config.clone(),
                updates,
                Arc::clone(&period_tx),
                shutdown.subscribe(),
            )));
        }

        Ok(Self {
            shutdown,
            registry,
            stats,
            period_tx,
            admin_addr,
            tasks,
            _watcher: watcher,
        })
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<SweepStats> {
        &self.stats
    }

    /// Bound address of the admin API, if enabled.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }

    pub fn period(&self) -> SweepPeriod {
        *self.period_tx.borrow()
    }

    /// Change the sweep period. Takes effect when the timer next re-arms.
    pub fn set_period(&self, period: SweepPeriod) {
        self.period_tx.send_replace(period);
    }

    /// Stop all tasks and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Service task failed during shutdown");
            }
        }
        tracing::info!("Sweeper service stopped");
    }
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

async fn apply_reloads(
    mut current: SweeperConfig,
    mut updates: mpsc::UnboundedReceiver<SweeperConfig>,
    period_tx: Arc<watch::Sender<SweepPeriod>>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        let next = tokio::select! {
            _ = shutdown.recv() => break,
            next = updates.recv() => match next {
                Some(next) => next,
                None => break,
            },
        };

        apply_reload(&mut current, next, &period_tx);
    }
}

/// Apply what can change live and adopt `next` as the current configuration.
fn apply_reload(
    current: &mut SweeperConfig,
    next: SweeperConfig,
    period_tx: &watch::Sender<SweepPeriod>,
) -> ReloadPlan {
    let plan = ReloadPlan::between(current, &next);
    if let Some(period) = plan.period {
        period_tx.send_replace(period);
        tracing::info!(period = %period, "Sweep period updated from config");
    }
    if plan.topology_changed {
        tracing::warn!("Pool definitions changed on disk; pools are managed by the proxy and were not reloaded");
    }
    *current = next;
    plan
}
