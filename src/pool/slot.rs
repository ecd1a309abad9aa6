//! Background connection slots.
//!
//! # States
//! - Disconnected: no socket, no attempt in flight (eligible for reconnect)
//! - Connecting: an attempt is in flight, must not be re-triggered
//! - Connected: socket handle present
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: sweep-triggered (begin_connect)
//! Connecting → Connected: connector success (established)
//! Connecting → Disconnected: connector failure (connect_failed)
//! Connected → Disconnected: peer closure (closed)
//! ```
//!
//! # Design Decisions
//! - State is a tagged enum, so "handle present while connecting" cannot exist
//! - Every transition is a compare-and-set under the slot lock
//! - Single-slot and numbered-slot servers share the `SlotSet` capability

use std::net::SocketAddr;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::net::connection::ConnectionId;

/// Position of a slot inside its server's slot set.
///
/// `None` for servers with a single background slot, `Some(i)` for numbered slots.
pub type SlotIndex = Option<usize>;

/// An established background socket.
///
/// The stream itself is owned by the task that drains it; the handle keeps
/// its identity and stops that task when dropped.
#[derive(Debug)]
pub struct SocketHandle {
    id: ConnectionId,
    peer: SocketAddr,
    established_at: Instant,
    task: Option<AbortHandle>,
}

impl SocketHandle {
    /// Create a handle for a socket connected to `peer`.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            established_at: Instant::now(),
            task: None,
        }
    }

    /// Attach the task that owns the stream. It is aborted when the handle drops.
    pub fn with_task(mut self, task: AbortHandle) -> Self {
        self.task = Some(task);
        self
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn established_at(&self) -> Instant {
        self.established_at
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Connection state of a background slot.
#[derive(Debug, Default)]
pub enum SlotState {
    #[default]
    Disconnected,
    Connecting,
    Connected(SocketHandle),
}

/// Plain snapshot of a [`SlotState`], for logs and the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SlotStatus::Disconnected => "disconnected",
            SlotStatus::Connecting => "connecting",
            SlotStatus::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// A single auxiliary socket slot of a server connection.
#[derive(Debug)]
pub struct BackgroundSlot {
    /// Address to (re)connect to, as `host:port`.
    target: String,
    state: Mutex<SlotState>,
}

impl BackgroundSlot {
    /// Create a disconnected slot.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: Mutex::new(SlotState::Disconnected),
        }
    }

    /// Create a slot whose socket is already established.
    pub fn connected(target: impl Into<String>, handle: SocketHandle) -> Self {
        Self {
            target: target.into(),
            state: Mutex::new(SlotState::Connected(handle)),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn status(&self) -> SlotStatus {
        match &*self.state.lock() {
            SlotState::Disconnected => SlotStatus::Disconnected,
            SlotState::Connecting => SlotStatus::Connecting,
            SlotState::Connected(_) => SlotStatus::Connected,
        }
    }

    /// Peer address of the current socket, if connected.
    pub fn peer(&self) -> Option<SocketAddr> {
        match &*self.state.lock() {
            SlotState::Connected(handle) => Some(handle.peer()),
            _ => None,
        }
    }

    /// Identity of the current socket, if connected.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        match &*self.state.lock() {
            SlotState::Connected(handle) => Some(handle.id()),
            _ => None,
        }
    }

    /// Socket absent and no attempt in flight.
    pub fn is_eligible(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Disconnected)
    }

    /// Disconnected → Connecting. Returns false if the slot was in any other state.
    pub fn begin_connect(&self) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Disconnected) {
            *state = SlotState::Connecting;
            true
        } else {
            false
        }
    }

    /// Connecting → Connected. The handle is dropped if no attempt was in flight.
    pub fn established(&self, handle: SocketHandle) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Connecting) {
            *state = SlotState::Connected(handle);
            true
        } else {
            false
        }
    }

    /// Connecting → Disconnected.
    pub fn connect_failed(&self) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Connecting) {
            *state = SlotState::Disconnected;
            true
        } else {
            false
        }
    }

    /// Connected → Disconnected, only if the live socket is the one identified by `id`.
    pub fn closed(&self, id: ConnectionId) -> bool {
        let mut state = self.state.lock();
        match &*state {
            SlotState::Connected(handle) if handle.id() == id => {
                *state = SlotState::Disconnected;
                true
            }
            _ => false,
        }
    }
}

/// A set of background slots owned by one server connection.
pub trait SlotSet {
    /// All slots with their index, in index order.
    fn iter(&self) -> Box<dyn Iterator<Item = (SlotIndex, &BackgroundSlot)> + '_>;

    /// Look up a slot by index.
    fn get(&self, index: SlotIndex) -> Option<&BackgroundSlot>;

    fn len(&self) -> usize {
        self.iter().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Only the disconnected slots with no attempt in flight.
    fn eligible(&self) -> Box<dyn Iterator<Item = (SlotIndex, &BackgroundSlot)> + '_> {
        Box::new(self.iter().filter(|(_, slot)| slot.is_eligible()))
    }
}

/// At most one background slot, addressed without an index.
#[derive(Debug, Default)]
pub struct SingleSlot(Option<BackgroundSlot>);

impl SingleSlot {
    pub fn new(slot: BackgroundSlot) -> Self {
        Self(Some(slot))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl SlotSet for SingleSlot {
    fn iter(&self) -> Box<dyn Iterator<Item = (SlotIndex, &BackgroundSlot)> + '_> {
        Box::new(self.0.iter().map(|slot| (None, slot)))
    }

    fn get(&self, index: SlotIndex) -> Option<&BackgroundSlot> {
        match index {
            None => self.0.as_ref(),
            Some(_) => None,
        }
    }

    fn len(&self) -> usize {
        usize::from(self.0.is_some())
    }
}

/// Fixed-size array of numbered background slots.
#[derive(Debug)]
pub struct NumberedSlots(Box<[BackgroundSlot]>);

impl NumberedSlots {
    pub fn new(slots: Vec<BackgroundSlot>) -> Self {
        Self(slots.into_boxed_slice())
    }
}

impl SlotSet for NumberedSlots {
    fn iter(&self) -> Box<dyn Iterator<Item = (SlotIndex, &BackgroundSlot)> + '_> {
        Box::new(self.0.iter().enumerate().map(|(i, slot)| (Some(i), slot)))
    }

    fn get(&self, index: SlotIndex) -> Option<&BackgroundSlot> {
        index.and_then(|i| self.0.get(i))
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// The slot shape a server connection carries.
#[derive(Debug)]
pub enum BackgroundSlots {
    Single(SingleSlot),
    Numbered(NumberedSlots),
}

impl BackgroundSlots {
    /// Build disconnected slots for the given targets.
    ///
    /// Zero or one target gives the single-slot shape; more give numbered slots.
    pub fn from_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<BackgroundSlot> = targets.into_iter().map(BackgroundSlot::new).collect();
        match slots.len() {
            0 => BackgroundSlots::Single(SingleSlot::empty()),
            1 => BackgroundSlots::Single(SingleSlot(slots.pop())),
            _ => BackgroundSlots::Numbered(NumberedSlots::new(slots)),
        }
    }

    pub fn is_numbered(&self) -> bool {
        matches!(self, BackgroundSlots::Numbered(_))
    }
}

impl From<SingleSlot> for BackgroundSlots {
    fn from(slot: SingleSlot) -> Self {
        BackgroundSlots::Single(slot)
    }
}

impl From<NumberedSlots> for BackgroundSlots {
    fn from(slots: NumberedSlots) -> Self {
        BackgroundSlots::Numbered(slots)
    }
}

impl SlotSet for BackgroundSlots {
    fn iter(&self) -> Box<dyn Iterator<Item = (SlotIndex, &BackgroundSlot)> + '_> {
        match self {
            BackgroundSlots::Single(s) => s.iter(),
            BackgroundSlots::Numbered(s) => s.iter(),
        }
    }

    fn get(&self, index: SlotIndex) -> Option<&BackgroundSlot> {
        match self {
            BackgroundSlots::Single(s) => s.get(index),
            BackgroundSlots::Numbered(s) => s.get(index),
        }
    }

    fn len(&self) -> usize {
        match self {
            BackgroundSlots::Single(s) => s.len(),
            BackgroundSlots::Numbered(s) => s.len(),
        }
    }
}
