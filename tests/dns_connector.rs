//! Real TCP reconnects through the resolving connector.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bcc_sweeper::net::connector::{open, ConnectError};
use bcc_sweeper::pool::{BackgroundSlot, Pool, ServerList, SingleSlot, SlotStatus};
use bcc_sweeper::{Connector, DnsConnector, ServerConnection, SweepExecutor};
use common::{registry, wait_for_status};
use tokio::net::TcpListener;

const TIMEOUT: Duration = Duration::from_secs(2);

fn server_for(target: &str) -> Arc<ServerConnection> {
    Arc::new(ServerConnection::new(
        "main",
        "db",
        "127.0.0.1:5432",
        SingleSlot::new(BackgroundSlot::new(target)),
    ))
}

/// A local address nothing is listening on.
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

#[tokio::test]
async fn test_connects_and_clears_on_peer_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = server_for(&addr.to_string());
    let slot = server.slot(None).unwrap();

    assert!(slot.begin_connect());
    DnsConnector::new(TIMEOUT).connect(Arc::clone(&server), None);

    let (peer, _) = listener.accept().await.unwrap();
    wait_for_status(&server, None, SlotStatus::Connected).await;
    assert_eq!(slot.peer(), Some(addr));

    drop(peer);
    wait_for_status(&server, None, SlotStatus::Disconnected).await;
    assert!(slot.is_eligible());
}

#[tokio::test]
async fn test_refused_connection_returns_slot_to_disconnected() {
    let server = server_for(&closed_port().await);
    assert!(server.slot(None).unwrap().begin_connect());

    DnsConnector::new(TIMEOUT).connect(Arc::clone(&server), None);

    wait_for_status(&server, None, SlotStatus::Disconnected).await;
}

#[tokio::test]
async fn test_unresolvable_target_returns_slot_to_disconnected() {
    let server = server_for("not-an-address");
    assert!(server.slot(None).unwrap().begin_connect());

    DnsConnector::new(TIMEOUT).connect(Arc::clone(&server), None);

    wait_for_status(&server, None, SlotStatus::Disconnected).await;
}

#[tokio::test]
async fn test_open_reports_connect_error() {
    let target = closed_port().await;
    match open(&target, TIMEOUT).await {
        Err(ConnectError::Connect { addr, .. }) => assert_eq!(addr.to_string(), target),
        other => panic!("expected connect error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sweep_reconnects_after_peer_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let pool = Arc::new(Pool::new("main"));
    let server = server_for(&addr.to_string());
    pool.attach(ServerList::Active, Arc::clone(&server));
    let executor = SweepExecutor::new(registry(vec![pool]), DnsConnector::new(TIMEOUT));

    assert_eq!(executor.run_once().triggered, 1);
    let (first, _) = listener.accept().await.unwrap();
    wait_for_status(&server, None, SlotStatus::Connected).await;
    assert_eq!(executor.run_once().triggered, 0);

    drop(first);
    wait_for_status(&server, None, SlotStatus::Disconnected).await;

    assert_eq!(executor.run_once().triggered, 1);
    let (_second, _) = listener.accept().await.unwrap();
    wait_for_status(&server, None, SlotStatus::Connected).await;
}
