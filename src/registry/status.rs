//! Transient status texts of room members

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::types::clamp_status;

/// Status text keyed by node name
#[derive(Default)]
pub struct StatusBoard {
    statuses: RwLock<BTreeMap<String, String>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a status; an empty text clears it. Returns the stored text.
    pub fn set(&self, name: &str, status: &str) -> String {
        let status = clamp_status(status);
        let mut statuses = self.statuses.write();
        if status.is_empty() {
            statuses.remove(name);
        } else {
            statuses.insert(name.to_string(), status.clone());
        }
        status
    }

    pub fn clear(&self, name: &str) {
        self.statuses.write().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.statuses.read().get(name).cloned()
    }

    pub fn all(&self) -> BTreeMap<String, String> {
        self.statuses.read().clone()
    }
}
