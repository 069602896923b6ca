//! Server-wide display name reservations
//!
//! Every connection claims its display name before it can join a room.
//! A taken name gets the lowest free `" (n)"` suffix, so `"bob"` logging
//! in twice becomes `"bob"` and `"bob (1)"`, which share a base name.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

/// Longest display name kept, in characters
pub const MAX_NAME_LEN: usize = 50;

/// Shortest display name; shorter requests are padded
pub const MIN_NAME_LEN: usize = 2;

/// Names currently held by live connections
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: Mutex<HashSet<String>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique name derived from `requested`
    ///
    /// The reservation lasts as long as the returned claim.
    pub fn claim(self: &Arc<Self>, requested: &str) -> NameClaim {
        let base = normalize(requested);
        let mut taken = self.taken.lock();
        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{} ({})", base, suffix);
            suffix += 1;
        }
        taken.insert(name.clone());
        if name != requested {
            debug!(requested, assigned = %name, "display name adjusted");
        }
        NameClaim {
            registry: Arc::clone(self),
            name,
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.lock().contains(name)
    }

    fn release(&self, name: &str) {
        self.taken.lock().remove(name);
    }
}

/// A reserved display name, released on drop
#[derive(Debug)]
pub struct NameClaim {
    registry: Arc<NameRegistry>,
    name: String,
}

impl NameClaim {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NameClaim {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}

fn normalize(requested: &str) -> String {
    let mut name: String = requested.chars().take(MAX_NAME_LEN).collect();
    if name.chars().count() < MIN_NAME_LEN {
        name = format!("aa{}", name);
    }
    name
}
