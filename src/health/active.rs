//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend with a `GET`
//! - Mark backends alive on `200 OK`, dead on anything else
//! - Never fail: probe errors only become liveness changes

use std::sync::Arc;
use std::time::Duration;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode, Uri};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::load_balancer::{Backend, BackendError, Registry};
use crate::load_balancer::backend::parse_target;
use crate::observability::metrics;

const USER_AGENT: &str = concat!("round-robin-proxy-health-check/", env!("CARGO_PKG_VERSION"));

/// Background prober that keeps backend liveness current.
pub struct HealthMonitor {
    registry: Arc<Registry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<Registry>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        Self {
            registry,
            config,
            client,
        }
    }

    /// Run the monitor on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe all backends, then wait `interval_secs`, until shutdown.
    ///
    /// The wait starts once a cycle has finished, so a slow cycle never eats
    /// into the idle time before the next one.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }
        if self.config.interval_secs == 0 {
            tracing::error!("health_check.interval_secs is zero; health monitor not started");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            timeout = self.config.timeout_secs,
            backends = self.registry.len(),
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs);

        loop {
            tokio::select! {
                _ = self.check_all() => {}
                _ = shutdown.recv() => break,
            }
            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Health monitor received shutdown signal, exiting loop");
    }

    /// Run one probe cycle over every backend.
    ///
    /// Probes run concurrently; each backend's flag is updated under its own lock
    /// as soon as its probe completes. Returns the number of live backends.
    pub async fn check_all(&self) -> usize {
        let probes = self
            .registry
            .backends()
            .iter()
            .map(|backend| self.check_one(backend));
        let results = join_all(probes).await;

        let alive = results.into_iter().filter(|alive| *alive).count();
        tracing::debug!(alive, total = self.registry.len(), "Health check cycle complete");
        alive
    }

    async fn check_one(&self, backend: &Arc<Backend>) -> bool {
        let alive = self.probe(backend).await;

        if backend.set_alive(alive) {
            if alive {
                tracing::info!(backend = %backend.name(), address = %backend.address(), "Backend is back up");
            } else {
                tracing::warn!(backend = %backend.name(), address = %backend.address(), "Backend is down");
            }
        }

        metrics::record_backend_health(backend.address(), alive);
        alive
    }

    async fn probe(&self, backend: &Backend) -> bool {
        let address = backend.address();
        let uri = match probe_uri(address, &self.config.path) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Health check failed: unusable address");
                return false;
            }
        };

        let request = match Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Failed to build health check request");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status != StatusCode::OK {
                    tracing::warn!(address = %address, status = %status, "Health check failed: status not 200");
                }
                status == StatusCode::OK
            }
            Ok(Err(e)) => {
                tracing::warn!(address = %address, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(address = %address, timeout_secs = self.config.timeout_secs, "Health check failed: timeout");
                false
            }
        }
    }
}

/// Build the probe URI: the backend address, with `path` appended when set.
///
/// A query string in `path` becomes the probe's query.
pub fn probe_uri(address: &str, path: &str) -> Result<Uri, BackendError> {
    let mut url = parse_target(address)?;
    if !path.is_empty() {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        if query.is_some() {
            url.set_query(query);
        }
    }

    url.as_str()
        .parse::<Uri>()
        .map_err(|e| BackendError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
