//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its configured base address
//! - Track liveness as observed by the most recent health probe
//! - Resolve the address into a forwardable target URL

use parking_lot::Mutex;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;
use url::Url;

/// Errors raised when a backend address cannot be used as a target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The address is not a parseable URL.
    #[error("invalid backend address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The address parsed but uses a scheme the proxy cannot forward to.
    #[error("unsupported scheme '{scheme}' in backend address '{address}'")]
    UnsupportedScheme { address: String, scheme: String },
}

/// Liveness record guarded by the backend's own lock.
#[derive(Debug, Clone, Copy)]
struct Liveness {
    alive: bool,
    last_checked: Option<SystemTime>,
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Optional human-readable name (defaults to the address).
    name: String,
    /// Base address as configured, e.g. `http://localhost:8081`.
    address: String,
    /// Per-server guard, independent of the registry's rotation lock.
    liveness: Mutex<Liveness>,
}

impl Backend {
    /// Create a new backend. Backends start out alive.
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            name: address.clone(),
            address,
            liveness: Mutex::new(Liveness {
                alive: true,
                last_checked: None,
            }),
        }
    }

    /// Create a named backend.
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        let mut backend = Self::new(address);
        let name = name.into();
        if !name.is_empty() {
            backend.name = name;
        }
        backend
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current liveness belief.
    pub fn is_alive(&self) -> bool {
        self.liveness.lock().alive
    }

    /// Record the outcome of a completed probe.
    ///
    /// Returns `true` when the flag actually flipped.
    pub fn set_alive(&self, alive: bool) -> bool {
        let mut liveness = self.liveness.lock();
        let changed = liveness.alive != alive;
        liveness.alive = alive;
        liveness.last_checked = Some(SystemTime::now());
        changed
    }

    /// Time of the most recent probe, if any has completed.
    pub fn last_checked(&self) -> Option<SystemTime> {
        self.liveness.lock().last_checked
    }

    /// Parse the address into a URL suitable for forwarding.
    pub fn target(&self) -> Result<Url, BackendError> {
        parse_target(&self.address)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Parse a backend address into a forwardable `http` URL.
pub fn parse_target(address: &str) -> Result<Url, BackendError> {
    let url = Url::parse(address).map_err(|e| BackendError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(BackendError::UnsupportedScheme {
            address: address.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(BackendError::InvalidAddress {
            address: address.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
