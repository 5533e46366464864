//! Round-robin reverse-proxy load balancer.
//!
//! The core is [`load_balancer::Registry`], which picks a live backend per
//! request, and [`health::HealthMonitor`], which keeps backend liveness
//! current. The `http` module forwards requests to the chosen backend.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, Registry};
