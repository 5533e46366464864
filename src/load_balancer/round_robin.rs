//! Round-robin load balancing strategy.

use parking_lot::Mutex;
use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Round-robin selector.
///
/// Holds a single rotation cursor. The cursor lock is held for the whole scan,
/// so concurrent callers never consume the same rotation slot.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rotation at a given position.
    pub fn starting_at(position: usize) -> Self {
        Self {
            cursor: Mutex::new(position),
        }
    }

    /// Current (unnormalized) cursor position.
    pub fn position(&self) -> usize {
        *self.cursor.lock()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        let len = backends.len();
        if len == 0 {
            return None;
        }

        let mut cursor = self.cursor.lock();
        *cursor %= len;

        // At most one revolution: every backend is inspected once.
        for _ in 0..len {
            let backend = &backends[*cursor];
            *cursor = (*cursor + 1) % len;
            if backend.is_alive() {
                return Some(Arc::clone(backend));
            }
        }
        None
    }
}
