//! Sweep executor.
//!
//! # Responsibilities
//! - Walk every pool, its four server lists and each server's background slots
//! - Move eligible slots to Connecting and hand them to the connector
//! - Emit one warning per triggered reconnect
//!
//! # Design Decisions
//! - Never blocks: the connector call only starts the attempt
//! - Slots already connecting are skipped, whatever the slot shape
//! - A failed attempt is not tracked here; the slot is simply eligible again next tick

use std::sync::Arc;

use crate::net::connector::Connector;
use crate::observability::metrics;
use crate::pool::backend_pool::{Pool, ServerList};
use crate::pool::registry::PoolRegistry;
use crate::pool::server::ServerConnection;
use crate::pool::slot::{SlotSet, SlotStatus};
use crate::sweep::stats::SweepReport;

/// One unit of periodic work driven by the sweep timer.
pub trait Sweep: Send + 'static {
    fn sweep(&mut self) -> SweepReport;
}

impl<F> Sweep for F
where
    F: FnMut() -> SweepReport + Send + 'static,
{
    fn sweep(&mut self) -> SweepReport {
        self()
    }
}

/// Finds dead background slots across all pools and triggers reconnection.
#[derive(Debug)]
pub struct SweepExecutor<C> {
    registry: Arc<PoolRegistry>,
    connector: C,
}

impl<C: Connector> SweepExecutor<C> {
    pub fn new(registry: Arc<PoolRegistry>, connector: C) -> Self {
        Self {
            registry,
            connector,
        }
    }

    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Run one full pass over the registry.
    pub fn run_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let pools = self.registry.snapshot();

        for pool in pools.iter() {
            self.sweep_pool(pool, &mut report);
        }

        report
    }

    fn sweep_pool(&self, pool: &Pool, report: &mut SweepReport) {
        report.pools += 1;
        for list in ServerList::ALL {
            for server in pool.servers(list) {
                report.servers += 1;
                self.sweep_server(&server, report);
            }
        }
    }

    fn sweep_server(&self, server: &Arc<ServerConnection>, report: &mut SweepReport) {
        let slots = server.slots();
        for (_, slot) in slots.iter() {
            report.slots += 1;
            match slot.status() {
                SlotStatus::Connected => report.connected += 1,
                SlotStatus::Connecting => report.in_flight += 1,
                SlotStatus::Disconnected => {}
            }
        }

        for (index, slot) in slots.eligible() {
            // The connector may have completed between the check and here.
            if !slot.begin_connect() {
                continue;
            }

            match index {
                Some(i) => tracing::warn!(
                    pool = %server.pool(),
                    server = %server.name(),
                    slot = i,
                    target = %slot.target(),
                    "Reconnecting background connection"
                ),
                None => tracing::warn!(
                    pool = %server.pool(),
                    server = %server.name(),
                    target = %slot.target(),
                    "Reconnecting background connection"
                ),
            }

            metrics::record_reconnect(server.pool());
            self.connector.connect(Arc::clone(server), index);
            report.triggered += 1;
        }
    }
}

impl<C: Connector> Sweep for SweepExecutor<C> {
    fn sweep(&mut self) -> SweepReport {
        self.run_once()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::slot::{BackgroundSlot, BackgroundSlots, SingleSlot, SlotIndex, SocketHandle};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, SlotIndex)>>,
    }

    impl Connector for Recorder {
        fn connect(&self, server: Arc<ServerConnection>, slot: SlotIndex) {
            self.calls.lock().push((server.name().to_string(), slot));
        }
    }

    fn registry_with(list: ServerList, servers: Vec<ServerConnection>) -> Arc<PoolRegistry> {
        let registry = Arc::new(PoolRegistry::new());
        let pool = Arc::new(Pool::new("main"));
        for server in servers {
            pool.attach(list, Arc::new(server));
        }
        registry.insert(pool);
        registry
    }

    fn connected_slot() -> BackgroundSlot {
        BackgroundSlot::connected("b:1", SocketHandle::new("127.0.0.1:1".parse().unwrap()))
    }

    #[test]
    fn test_every_list_is_swept() {
        let registry = Arc::new(PoolRegistry::new());
        let pool = Arc::new(Pool::new("main"));
        for (n, list) in ServerList::ALL.into_iter().enumerate() {
            let server = ServerConnection::new(
                pool.name_arc(),
                format!("s{n}"),
                "a:1",
                BackgroundSlots::from_targets(["b:1"]),
            );
            pool.attach(list, Arc::new(server));
        }
        registry.insert(pool);

        let recorder = Arc::new(Recorder::default());
        let executor = SweepExecutor::new(registry, recorder.clone());
        let report = executor.run_once();

        assert_eq!(report.pools, 1);
        assert_eq!(report.servers, 4);
        assert_eq!(report.triggered, 4);
        let names: Vec<String> = recorder.calls.lock().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["s0", "s1", "s2", "s3"]);
    }

    #[test]
    fn test_connected_and_connecting_slots_are_skipped() {
        let connecting = BackgroundSlot::new("b:1");
        connecting.begin_connect();
        let registry = registry_with(
            ServerList::Active,
            vec![
                ServerConnection::new("main", "up", "a:1", SingleSlot::new(connected_slot())),
                ServerConnection::new("main", "busy", "a:1", SingleSlot::new(connecting)),
                ServerConnection::new("main", "bare", "a:1", SingleSlot::empty()),
            ],
        );

        let recorder = Arc::new(Recorder::default());
        let mut executor = SweepExecutor::new(registry, recorder.clone());
        let report = executor.sweep();

        assert_eq!(report.slots, 2);
        assert_eq!(report.connected, 1);
        assert_eq!(report.in_flight, 1);
        assert_eq!(report.triggered, 0);
        assert!(recorder.calls.lock().is_empty());
    }

    #[test]
    fn test_triggered_slot_moves_to_connecting() {
        let registry = registry_with(
            ServerList::Idle,
            vec![ServerConnection::new(
                "main",
                "down",
                "a:1",
                BackgroundSlots::from_targets(["b:1", "b:2"]),
            )],
        );
        let executor = SweepExecutor::new(registry.clone(), Arc::new(Recorder::default()));
        executor.run_once();

        let pool = registry.get("main").unwrap();
        let server = &pool.servers(ServerList::Idle)[0];
        assert!(server.slots().iter().all(|(_, s)| !s.is_eligible()));
        assert_eq!(executor.run_once().triggered, 0);
    }

    #[test]
    fn test_empty_registry() {
        let executor = SweepExecutor::new(Arc::new(PoolRegistry::new()), Arc::new(Recorder::default()));
        assert_eq!(executor.run_once(), SweepReport::default());
    }
}
