//! Backend registry.
//!
//! # Responsibilities
//! - Own the fixed, ordered set of backends for the process lifetime
//! - Own the selection policy and its rotation state
//! - Answer "which backend handles the next request"

use std::sync::Arc;
use crate::config::BackendConfig;
use crate::load_balancer::{
    LoadBalancer,
    backend::Backend,
    round_robin::RoundRobin,
};

/// Fixed set of backends plus the policy that rotates through them.
#[derive(Debug)]
pub struct Registry {
    backends: Vec<Arc<Backend>>,
    balancer: Box<dyn LoadBalancer>,
}

impl Registry {
    /// Build a round-robin registry from plain addresses.
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backends = addresses
            .into_iter()
            .map(|address| Arc::new(Backend::new(address)))
            .collect();
        Self::with_balancer(backends, Box::new(RoundRobin::new()))
    }

    /// Build a round-robin registry from configuration.
    ///
    /// Addresses are taken as given; a malformed one surfaces when a request
    /// is routed to it.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        let backends = configs
            .iter()
            .map(|config| Arc::new(Backend::with_name(config.name.clone(), config.address.clone())))
            .collect();
        Self::with_balancer(backends, Box::new(RoundRobin::new()))
    }

    /// Build a registry around an explicit policy.
    pub fn with_balancer(backends: Vec<Arc<Backend>>, balancer: Box<dyn LoadBalancer>) -> Self {
        tracing::debug!(backend_count = backends.len(), "Backend registry created");
        Self { backends, balancer }
    }

    /// Select the backend for the next request.
    ///
    /// Returns `None` when the registry is empty or no backend is alive.
    pub fn select_next(&self) -> Option<Arc<Backend>> {
        if self.backends.is_empty() {
            tracing::debug!("No backends registered");
            return None;
        }

        let selected = self.balancer.next_server(&self.backends);
        if selected.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "All backends are down");
            for b in &self.backends {
                tracing::trace!(address = %b.address(), alive = b.is_alive(), "Backend status");
            }
        }
        selected
    }

    /// All registered backends, in rotation order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently believed alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}
