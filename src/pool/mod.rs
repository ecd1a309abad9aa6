//! Pool data model.
//!
//! # Data Flow
//! ```text
//! PoolRegistry (registry.rs)
//!     → Pool (backend_pool.rs): active / idle / used / tested lists
//!         → ServerConnection (server.rs)
//!             → BackgroundSlots (slot.rs): single slot or numbered slots
//! ```
//!
//! # Design Decisions
//! - Pool creation and destruction belong to the proxy; this module only models them
//! - Traversal works on snapshots, so no lock is held while the sweep runs
//! - Slot state is per-slot, not per-server

pub mod backend_pool;
pub mod registry;
pub mod server;
pub mod slot;

pub use backend_pool::{Pool, ServerList};
pub use registry::PoolRegistry;
pub use server::ServerConnection;
pub use slot::{
    BackgroundSlot, BackgroundSlots, NumberedSlots, SingleSlot, SlotIndex, SlotSet, SlotState,
    SlotStatus, SocketHandle,
};
