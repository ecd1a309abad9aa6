//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bcc_sweeper::net::connector::Connector;
use bcc_sweeper::pool::{
    BackgroundSlot, NumberedSlots, Pool, PoolRegistry, ServerConnection, ServerList, SingleSlot,
    SlotIndex, SlotStatus, SocketHandle,
};
use bcc_sweeper::sweep::Clock;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing_subscriber::fmt::MakeWriter;

/// A clock that only moves when told to, or when a sleep is requested.
pub struct ManualClock {
    now: Mutex<Instant>,
    deadlines: Mutex<Vec<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
            deadlines: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Every deadline the timer slept until, in order.
    pub fn deadlines(&self) -> Vec<Instant> {
        self.deadlines.lock().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()> {
        {
            let mut now = self.now.lock();
            if deadline > *now {
                *now = deadline;
            }
        }
        self.deadlines.lock().push(deadline);
        Box::pin(tokio::task::yield_now())
    }
}

/// What a [`RecordingConnector`] does with each attempt.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// Leave the slot Connecting.
    Pending,
    /// Fail at once (Connecting → Disconnected).
    Fail,
    /// Succeed at once (Connecting → Connected).
    Succeed,
}

/// Connector that records every invocation and completes it synchronously.
pub struct RecordingConnector {
    outcome: Mutex<Outcome>,
    calls: Mutex<Vec<(String, SlotIndex)>>,
}

impl RecordingConnector {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(outcome),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock() = outcome;
    }

    pub fn calls(&self) -> Vec<(String, SlotIndex)> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, server: Arc<ServerConnection>, slot: SlotIndex) {
        self.calls.lock().push((server.name().to_string(), slot));
        let Some(background) = server.slot(slot) else {
            return;
        };
        match *self.outcome.lock() {
            Outcome::Pending => {}
            Outcome::Fail => {
                background.connect_failed();
            }
            Outcome::Succeed => {
                background.established(test_handle());
            }
        }
    }
}

pub fn test_handle() -> SocketHandle {
    SocketHandle::new("127.0.0.1:6432".parse().unwrap())
}

pub fn connected(target: &str) -> BackgroundSlot {
    BackgroundSlot::connected(target, test_handle())
}

pub fn disconnected(target: &str) -> BackgroundSlot {
    BackgroundSlot::new(target)
}

/// Server with a single background slot.
pub fn single(pool: &Pool, name: &str, slot: BackgroundSlot) -> Arc<ServerConnection> {
    Arc::new(ServerConnection::new(
        pool.name_arc(),
        name,
        "10.0.0.1:5432",
        SingleSlot::new(slot),
    ))
}

/// Server with numbered background slots.
pub fn numbered(pool: &Pool, name: &str, slots: Vec<BackgroundSlot>) -> Arc<ServerConnection> {
    Arc::new(ServerConnection::new(
        pool.name_arc(),
        name,
        "10.0.0.1:5432",
        NumberedSlots::new(slots),
    ))
}

/// Registry holding the given pools.
pub fn registry(pools: Vec<Arc<Pool>>) -> Arc<PoolRegistry> {
    let registry = Arc::new(PoolRegistry::new());
    for pool in pools {
        registry.insert(pool);
    }
    registry
}

pub fn status_of(server: &ServerConnection, index: SlotIndex) -> SlotStatus {
    server.slot(index).expect("slot exists").status()
}

/// Poll until the slot reaches `expected`, failing after a few seconds.
pub async fn wait_for_status(server: &ServerConnection, index: SlotIndex, expected: SlotStatus) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let status = status_of(server, index);
        if status == expected {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "slot {:?} of {} stuck in {} (wanted {})",
            index,
            server.name(),
            status,
            expected
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn attach_all(pool: &Pool, list: ServerList, servers: &[Arc<ServerConnection>]) {
    for server in servers {
        pool.attach(list, Arc::clone(server));
    }
}

#[derive(Clone)]
struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct SharedMakeWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedMakeWriter {
    type Writer = SharedBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedBufferWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

/// Run `f` with a WARN-level subscriber and return the captured log lines.
pub fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(SharedMakeWriter {
            buf: Arc::clone(&buf),
        })
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(buf.lock().clone()).expect("logs should be valid UTF-8");
    let lines = text.lines().map(str::to_string).collect();
    (result, lines)
}

/// Lines announcing a triggered reconnect.
pub fn reconnect_lines(lines: &[String]) -> Vec<&String> {
    lines
        .iter()
        .filter(|line| line.contains("Reconnecting background connection"))
        .collect()
}
