//! Pool registry.
//!
//! # Responsibilities
//! - Hold every pool the sweeper walks
//! - Provide a snapshot that stays stable for a whole sweep tick
//!
//! # Design Decisions
//! - Readers load an `Arc` of the current list; writers swap in a new list
//! - Registering or removing a pool never disturbs a sweep in progress

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::pool::backend_pool::Pool;

/// The set of pools known to the proxy.
#[derive(Debug)]
pub struct PoolRegistry {
    pools: ArcSwap<Vec<Arc<Pool>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            pools: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register a pool, replacing any pool with the same name.
    pub fn insert(&self, pool: Arc<Pool>) {
        self.pools.rcu(|current| {
            let mut next: Vec<Arc<Pool>> = current
                .iter()
                .filter(|p| p.name() != pool.name())
                .cloned()
                .collect();
            next.push(Arc::clone(&pool));
            next
        });
    }

    /// Unregister a pool by name.
    pub fn remove(&self, name: &str) -> Option<Arc<Pool>> {
        let previous = self.pools.rcu(|current| {
            current
                .iter()
                .filter(|p| p.name() != name)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().find(|p| p.name() == name).cloned()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Pool>> {
        self.pools.load().iter().find(|p| p.name() == name).cloned()
    }

    /// Pools as of now. Later inserts/removes do not affect the returned list.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Pool>>> {
        self.pools.load_full()
    }

    pub fn len(&self) -> usize {
        self.pools.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
