//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → proxy_handler: Registry::select_next
//!         → None → response.rs (503 Service unavailable)
//!     → request.rs (rewrite URI onto backend, prepare headers)
//!     → hyper client → backend
//!     → response.rs (strip hop-by-hop headers, 502 on upstream error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{X_FORWARDED_FOR, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
