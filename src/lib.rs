//! Background connection sweeper for a connection-pooling proxy.
//!
//! Server connections may own auxiliary background sockets. When one of those
//! dies, its slot is left without a socket while the server stays usable. The
//! sweeper walks every pool on a fixed period and starts a reconnect for each
//! such slot, without ever blocking the runtime.

// Core
pub mod net;
pub mod pool;
pub mod sweep;

// Service plumbing
pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::SweeperConfig;
pub use lifecycle::{Service, Shutdown};
pub use net::connector::{Connector, DnsConnector};
pub use pool::{PoolRegistry, ServerConnection};
pub use sweep::{SweepExecutor, SweepPeriod, SweepTimer};
