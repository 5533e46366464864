//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Spawn the health monitor alongside the server
//! - Select a backend per request and forward to it

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::HealthMonitor;
use crate::http::request::{forward_uri, prepare_headers, request_id};
use crate::http::response::{bad_gateway, service_unavailable, strip_hop_by_hop};
use crate::lifecycle::shutdown;
use crate::load_balancer::Registry;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<Registry>,
}

impl HttpServer {
    /// Create a server whose registry is built from `config.backends`.
    pub fn new(config: ProxyConfig) -> Self {
        let registry = Arc::new(Registry::from_config(&config.backends));
        Self::with_registry(config, registry)
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: ProxyConfig, registry: Arc<Registry>) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        let state = AppState {
            registry: registry.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    ///
    /// The health monitor runs on its own task for the lifetime of the server.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.registry.len(),
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone())
            .spawn(shutdown.resubscribe());

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::recv(shutdown))
            .await;

        monitor.abort();
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving in-process (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Selects a backend and forwards the request to it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let backend = match state.registry.select_next() {
        Some(b) => b,
        None => {
            tracing::warn!(request_id = %request_id, "No backend available");
            metrics::record_selection_exhausted();
            metrics::record_request(method.as_str(), 503, "none", start_time);
            return service_unavailable();
        }
    };

    let target = match backend.target() {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Selected backend has an unusable address");
            metrics::record_request(method.as_str(), 503, backend.address(), start_time);
            return service_unavailable();
        }
    };

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let (mut parts, body) = request.into_parts();
    parts.uri = match forward_uri(&target, &parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to build upstream URI");
            metrics::record_request(method.as_str(), 503, backend.address(), start_time);
            return service_unavailable();
        }
    };
    parts.version = Version::HTTP_11;
    prepare_headers(&mut parts.headers, client_ip);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        upstream = %parts.uri,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            metrics::record_request(method.as_str(), parts.status.as_u16(), backend.address(), start_time);
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend.address(), error = %e, "Upstream error");
            metrics::record_request(method.as_str(), 502, backend.address(), start_time);
            bad_gateway()
        }
    }
}
