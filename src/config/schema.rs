//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sweeper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::pool::backend_pool::ServerList;
use crate::sweep::timer::SweepPeriod;

/// Root configuration for the background connection sweeper.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SweeperConfig {
    /// Sweep cadence and connector settings.
    pub reconnect: ReconnectConfig,

    /// Pools and their server connections.
    pub pools: Vec<PoolConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Background reconnect settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Interval between sweeps, in microseconds.
    pub period_usec: u64,

    /// Per-attempt timeout for resolution and connect, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl ReconnectConfig {
    pub fn period(&self) -> SweepPeriod {
        SweepPeriod::from_micros(self.period_usec)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            period_usec: 1_000_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// A pool of server connections.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Pool name, used in logs and metrics labels.
    pub name: String,

    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

/// A server connection and its background targets.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server identifier, unique within its pool.
    pub name: String,

    /// Primary backend address (e.g., "10.0.0.5:5432").
    pub address: String,

    /// Lifecycle list the server starts in.
    #[serde(default)]
    pub list: ServerList,

    /// Background targets. One target gives a single slot, several give numbered slots.
    #[serde(default)]
    pub background: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
