//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Sweep triggers a reconnect
//!     → connector.rs (resolve host:port, connect with timeout)
//!     → slot Connected, socket drained by a watcher task
//!     → peer closes → watcher clears the slot (connection.rs ids guard staleness)
//! ```
//!
//! # Design Decisions
//! - Connection attempts never run on the sweep's call stack
//! - Every background socket gets its own connection id

pub mod connection;
pub mod connector;
