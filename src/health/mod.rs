//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer (default 10s)
//!     → Probe each backend concurrently, each with its own timeout
//!     → 200 OK → alive, anything else → dead
//!     → Backend::set_alive under the backend's own lock
//! ```
//!
//! # Design Decisions
//! - Liveness reflects only the latest completed probe (no hysteresis)
//! - Probes use the same base address as forwarding unless a path is configured
//! - The monitor only writes liveness; it never touches the rotation cursor

pub mod active;

pub use active::HealthMonitor;
