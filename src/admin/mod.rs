//! Admin HTTP API.
//!
//! # Routes
//! - `GET /admin/status`: sweep cadence and counters
//! - `GET /admin/pools`: per-slot background connection state
//!
//! All routes require `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::lifecycle::shutdown::ShutdownSignal;
use crate::pool::registry::PoolRegistry;
use crate::sweep::stats::SweepStats;
use crate::sweep::timer::SweepPeriod;

use self::auth::admin_auth_middleware;
use self::handlers::{get_pools, get_status};

/// Shared state injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<PoolRegistry>,
    pub stats: Arc<SweepStats>,
    pub period: watch::Receiver<SweepPeriod>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/pools", get(get_pools))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move { shutdown.recv().await })
        .await
}
