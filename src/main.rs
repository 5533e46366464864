//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │              LOAD BALANCER                   │
//!   Client Request        │  ┌─────────┐    ┌────────────────────────┐   │
//!   ──────────────────────┼─▶│  http   │───▶│ load_balancer::Registry│   │
//!                         │  │ server  │    │   select_next()        │   │
//!                         │  └────┬────┘    └───────────▲────────────┘   │
//!                         │       │ forward             │ liveness       │
//!                         │       ▼                     │                │
//!   Client Response       │  ┌─────────┐    ┌───────────┴────────────┐   │
//!   ◀─────────────────────┼──│ hyper   │    │ health::HealthMonitor  │───┼──▶ probes
//!                         │  │ client  │────┼────────────────────────┼───┼──▶ Backend
//!                         │  └─────────┘    └────────────────────────┘   │
//!                         └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use round_robin_proxy::admin::{self, AdminState};
use round_robin_proxy::config::{self, BackendConfig, ConfigError, ProxyConfig};
use round_robin_proxy::lifecycle::{signals, Shutdown};
use round_robin_proxy::observability::{logging, metrics};
use round_robin_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "round-robin-proxy", version)]
#[command(about = "Round-robin HTTP load balancer with active health checks", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Backend base URL; repeat to list several. Replaces configured backends.
    #[arg(long = "backend", value_name = "URL")]
    backends: Vec<String>,

    /// Seconds between health check cycles.
    #[arg(long, value_name = "SECS")]
    health_interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if !self.backends.is_empty() {
            config.backends = self.backends.iter().cloned().map(BackendConfig::new).collect();
        }
        if let Some(secs) = self.health_interval {
            config.health_check.interval_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        config::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return Err(e.into());
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("round-robin-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.backends.is_empty() {
        tracing::warn!("No backends configured; every request will receive 503");
    }

    // Listener failure is fatal.
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone());

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(server.registry(), &config.admin.api_key);
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(admin_listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
