//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → registry.rs (select_next under the rotation lock)
//!     → round_robin.rs (scan forward from the cursor, skip dead backends)
//!     → backend.rs (per-backend liveness check)
//!     → Return backend, or None when nothing is alive
//! ```
//!
//! # Design Decisions
//! - The rotation cursor is owned by a registry instance, not a global
//! - Two lock granularities: registry-wide for rotation, per-backend for liveness
//! - Selection is bounded to one revolution; it never recurses
//! - "No backend" is a normal outcome, surfaced as `None`

pub mod backend;
pub mod registry;
pub mod round_robin;

use std::sync::Arc;

pub use backend::{Backend, BackendError};
pub use registry::Registry;
pub use round_robin::RoundRobin;

/// Backend selection policy.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick the next backend to receive traffic, if any is alive.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
