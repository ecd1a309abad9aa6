//! Background socket connector.
//!
//! # Responsibilities
//! - Resolve a slot's `host:port` target and open a TCP connection
//! - Complete the slot transition (Connected on success, Disconnected on failure)
//! - Watch the established socket and clear the slot when the peer closes it
//!
//! # Design Decisions
//! - `connect` only spawns; all resolution and I/O run outside the caller
//! - Callers move the slot to Connecting first, so one slot has at most one attempt
//! - The close watcher holds a weak server reference and the socket id, so a
//!   late close never clears a newer connection

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::oneshot;

use crate::config::ReconnectConfig;
use crate::net::connection::ConnectionId;
use crate::observability::metrics;
use crate::pool::server::ServerConnection;
use crate::pool::slot::{SlotIndex, SocketHandle};

/// Starts a reconnect for one background slot.
///
/// Invoked only for slots that were just moved to Connecting. Implementations
/// must not block; completion is reported through the slot itself.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, server: Arc<ServerConnection>, slot: SlotIndex);
}

impl<C: Connector + ?Sized> Connector for Arc<C> {
    fn connect(&self, server: Arc<ServerConnection>, slot: SlotIndex) {
        (**self).connect(server, slot)
    }
}

/// Error type for a single connection attempt.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to resolve {target}: {source}")]
    Resolve {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("{target} resolved to no addresses")]
    NoAddresses { target: String },
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Resolves the slot target through the system resolver and connects over TCP.
#[derive(Debug, Clone)]
pub struct DnsConnector {
    connect_timeout: Duration,
}

impl DnsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(Duration::from_millis(config.connect_timeout_ms))
    }
}

impl Connector for DnsConnector {
    fn connect(&self, server: Arc<ServerConnection>, slot: SlotIndex) {
        let timeout = self.connect_timeout;
        tokio::spawn(establish(server, slot, timeout));
    }
}

async fn establish(server: Arc<ServerConnection>, index: SlotIndex, timeout: Duration) {
    let Some(slot) = server.slot(index) else {
        tracing::error!(server = %server.identity(), slot = ?index, "Reconnect requested for unknown slot");
        return;
    };

    match open(slot.target(), timeout).await {
        Ok((stream, peer)) => {
            let handle = SocketHandle::new(peer);
            let id = handle.id();
            let (ready_tx, ready_rx) = oneshot::channel();
            let watcher = tokio::spawn(watch_for_close(
                Arc::downgrade(&server),
                index,
                id,
                stream,
                ready_rx,
            ));

            if slot.established(handle.with_task(watcher.abort_handle())) {
                let _ = ready_tx.send(());
                metrics::record_connect_result(server.pool(), true);
                tracing::info!(
                    server = %server.identity(),
                    slot = ?index,
                    peer = %peer,
                    connection_id = %id,
                    "Background connection established"
                );
            } else {
                tracing::debug!(
                    server = %server.identity(),
                    slot = ?index,
                    "Slot left connecting state during attempt, dropping socket"
                );
            }
        }
        Err(e) => {
            slot.connect_failed();
            metrics::record_connect_result(server.pool(), false);
            tracing::warn!(
                server = %server.identity(),
                slot = ?index,
                target = %slot.target(),
                error = %e,
                "Background connection attempt failed"
            );
        }
    }
}

/// Resolve `target` and try each address in turn.
pub async fn open(target: &str, timeout: Duration) -> Result<(TcpStream, SocketAddr), ConnectError> {
    let addrs = tokio::time::timeout(timeout, lookup_host(target))
        .await
        .map_err(|_| ConnectError::Timeout(timeout))?
        .map_err(|source| ConnectError::Resolve {
            target: target.to_string(),
            source,
        })?;

    let mut last_error = None;
    for addr in addrs {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => return Ok((stream, addr)),
            Ok(Err(source)) => last_error = Some(ConnectError::Connect { addr, source }),
            Err(_) => last_error = Some(ConnectError::Timeout(timeout)),
        }
    }

    Err(last_error.unwrap_or_else(|| ConnectError::NoAddresses {
        target: target.to_string(),
    }))
}

/// Drain and discard inbound bytes until the peer goes away, then clear the slot.
async fn watch_for_close(
    server: Weak<ServerConnection>,
    index: SlotIndex,
    id: ConnectionId,
    mut stream: TcpStream,
    ready: oneshot::Receiver<()>,
) {
    if ready.await.is_err() {
        return;
    }

    let mut buf = vec![0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Background socket read error");
                break;
            }
        }
    }

    let Some(server) = server.upgrade() else {
        return;
    };
    if let Some(slot) = server.slot(index) {
        if slot.closed(id) {
            tracing::warn!(
                server = %server.identity(),
                slot = ?index,
                connection_id = %id,
                "Background connection closed"
            );
        }
    }
}
