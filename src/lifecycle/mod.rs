//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → main triggers shutdown
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast to subscribers
//!         → HTTP server stops accepting and drains
//!         → health monitor leaves its loop
//!         → admin API stops
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
