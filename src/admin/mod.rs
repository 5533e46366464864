//! Read-only admin API.
//!
//! - `GET /admin/status`: version and alive/total backend counts
//! - `GET /admin/backends`: per-backend liveness
//!
//! Served on its own listener, bearer-token protected. It never mutates the
//! registry.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::lifecycle::shutdown;
use crate::load_balancer::Registry;
use self::auth::admin_auth_middleware;
use self::handlers::{get_backends, get_status};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub registry: Arc<Registry>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(registry: Arc<Registry>, api_key: &str) -> Self {
        Self {
            registry,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown::recv(shutdown))
        .await
}
