//! Server-side mute list
//!
//! Muted nodes keep their membership but their chat lines are not
//! broadcast. The server answers them privately with a control string.
//! Mutes apply by base name, so duplicate logins stay muted, or by the
//! host a node connects from.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::types::Node;
use crate::utils::is_expired;

/// Notice sent to a node muted in a lobby room
///
/// The leading `?` cannot be typed by a client, which stops spoofing.
pub const YOU_HAVE_BEEN_MUTED_LOBBY: &str =
    "?YOUR LOBBY CHATTING HAS BEEN TEMPORARILY 'MUTED' BY THE ADMINS, TRY AGAIN LATER";

/// Notice sent to a node muted by a game host
pub const YOU_HAVE_BEEN_MUTED_GAME: &str =
    "?YOUR CHATTING IN THIS GAME HAS BEEN 'MUTED' BY THE HOST";

type Expiry = Option<DateTime<Utc>>;

/// Base names and host addresses muted until an optional expiry
///
/// A node is muted when either its base name or its host is listed.
#[derive(Default)]
pub struct MuteList {
    names: RwLock<HashMap<String, Expiry>>,
    hosts: RwLock<HashMap<String, Expiry>>,
}

impl MuteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute `base_name` until `until`, or indefinitely
    pub fn mute(&self, base_name: &str, until: Expiry) {
        self.names.write().insert(base_name.to_string(), until);
    }

    pub fn unmute(&self, base_name: &str) -> bool {
        self.names.write().remove(base_name).is_some()
    }

    /// Mute every node connecting from `host`, whatever its name
    pub fn mute_host(&self, host: &str, until: Expiry) {
        self.hosts.write().insert(host.to_string(), until);
    }

    pub fn unmute_host(&self, host: &str) -> bool {
        self.hosts.write().remove(host).is_some()
    }

    /// Whether `node` is muted right now; expired entries are pruned
    pub fn is_muted(&self, node: &Node) -> bool {
        self.is_muted_at(node, Utc::now())
    }

    pub fn is_muted_at(&self, node: &Node, now: DateTime<Utc>) -> bool {
        check(&self.names, node.base_name(), now) || check(&self.hosts, &node.host(), now)
    }
}

fn check(table: &RwLock<HashMap<String, Expiry>>, key: &str, now: DateTime<Utc>) -> bool {
    let expiry = match table.read().get(key) {
        Some(expiry) => *expiry,
        None => return false,
    };
    if is_expired(expiry, now) {
        table.write().remove(key);
        return false;
    }
    true
}
