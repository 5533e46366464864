//! Five demo backends on ports 8081-8085, the proxy's default backend set.
//!
//! ```text
//! cargo run --example mock_backends
//! cargo run            # in another terminal
//! curl localhost:8080  # rotates across the five ports
//! ```

use axum::{routing::get, Json, Router};
use serde_json::json;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut servers = Vec::new();
    for port in 8081..=8085u16 {
        let app = Router::new().route(
            "/",
            get(move || async move {
                tracing::info!(port, "request");
                Json(json!({ "message": format!("Server running on port {}", port) }))
            }),
        );

        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "Backend listening");
        servers.push(tokio::spawn(async move { axum::serve(listener, app).await }));
    }

    for server in servers {
        server.await??;
    }
    Ok(())
}
