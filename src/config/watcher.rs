//! Configuration file watcher for hot reload.
//!
//! Only the sweep period is applied live. Pool topology belongs to the proxy,
//! so topology edits in a reloaded file are reported and otherwise ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::SweeperConfig;
use crate::sweep::timer::SweepPeriod;

/// What a reloaded configuration changes for a running service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadPlan {
    /// New sweep period, if it differs.
    pub period: Option<SweepPeriod>,
    /// Pools or servers differ; not applied live.
    pub topology_changed: bool,
}

impl ReloadPlan {
    pub fn between(current: &SweeperConfig, next: &SweeperConfig) -> Self {
        let period = (current.reconnect.period_usec != next.reconnect.period_usec)
            .then(|| next.reconnect.period());
        Self {
            period,
            topology_changed: current.pools != next.pools,
        }
    }
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<SweeperConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<SweeperConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match load_config(&path) {
                        Ok(config) => {
                            tracing::info!(path = ?path, "Config file changed, reloaded");
                            let _ = tx.send(config);
                        }
                        Err(e) => tracing::error!(
                            error = %e,
                            "Failed to reload config, keeping current configuration"
                        ),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
