//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (period > 0, timeouts > 0)
//! - Check names are present and unique per scope
//! - Check every address is `host:port`
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SweeperConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::SweeperConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("reconnect.period_usec must be greater than zero")]
    ZeroPeriod,
    #[error("reconnect.connect_timeout_ms must be greater than zero")]
    ZeroConnectTimeout,
    #[error("pool #{index} has an empty name")]
    EmptyPoolName { index: usize },
    #[error("pool '{name}' is defined more than once")]
    DuplicatePool { name: String },
    #[error("pool '{pool}' has a server with an empty name")]
    EmptyServerName { pool: String },
    #[error("server '{server}' is defined more than once in pool '{pool}'")]
    DuplicateServer { pool: String, server: String },
    #[error("server '{pool}/{server}' has no background targets")]
    NoBackgroundTargets { pool: String, server: String },
    #[error("'{value}' in {location} is not a host:port address")]
    InvalidAddress { location: String, value: String },
    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SweeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.reconnect.period_usec == 0 {
        errors.push(ValidationError::ZeroPeriod);
    }
    if config.reconnect.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    let mut pool_names = HashSet::new();
    for (index, pool) in config.pools.iter().enumerate() {
        if pool.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPoolName { index });
        } else if !pool_names.insert(pool.name.as_str()) {
            errors.push(ValidationError::DuplicatePool {
                name: pool.name.clone(),
            });
        }

        let mut server_names = HashSet::new();
        for server in &pool.servers {
            if server.name.trim().is_empty() {
                errors.push(ValidationError::EmptyServerName {
                    pool: pool.name.clone(),
                });
                continue;
            }
            if !server_names.insert(server.name.as_str()) {
                errors.push(ValidationError::DuplicateServer {
                    pool: pool.name.clone(),
                    server: server.name.clone(),
                });
            }

            let location = format!("{}/{}", pool.name, server.name);
            if !is_host_port(&server.address) {
                errors.push(ValidationError::InvalidAddress {
                    location: format!("{location} address"),
                    value: server.address.clone(),
                });
            }
            if server.background.is_empty() {
                errors.push(ValidationError::NoBackgroundTargets {
                    pool: pool.name.clone(),
                    server: server.name.clone(),
                });
            }
            for target in &server.background {
                if !is_host_port(target) {
                    errors.push(ValidationError::InvalidAddress {
                        location: format!("{location} background"),
                        value: target.clone(),
                    });
                }
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            location: "observability.metrics_address".to_string(),
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                location: "admin.bind_address".to_string(),
                value: config.admin.bind_address.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port.
fn is_host_port(value: &str) -> bool {
    match value.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
