use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::UNIX_EPOCH;
use crate::admin::AdminState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub backends_total: usize,
    pub backends_alive: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub name: String,
    pub address: String,
    pub alive: bool,
    /// Unix time of the last completed probe.
    pub last_checked: Option<u64>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let total = state.registry.len();
    let alive = state.registry.alive_count();
    let status = if alive > 0 { "operational" } else { "unavailable" };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: status.to_string(),
        backends_total: total,
        backends_alive: alive,
    })
}

pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .registry
        .backends()
        .iter()
        .map(|b| BackendStatus {
            name: b.name().to_string(),
            address: b.address().to_string(),
            alive: b.is_alive(),
            last_checked: b
                .last_checked()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
        })
        .collect();

    Json(statuses)
}
