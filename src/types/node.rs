use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// A network endpoint occupying one membership slot in a room
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Display name, unique per server (e.g. "bob" or "bob (2)")
    pub name: String,

    /// Transport address the node connected from
    pub address: String,
}

impl Node {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Name without the duplicate-login suffix, used for mute matching
    ///
    /// `"bob (2)"` and `"bob"` share the base name `"bob"`.
    pub fn base_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }

    /// Host part of the address, without a port
    ///
    /// Addresses that are not `ip:port` are returned unchanged.
    pub fn host(&self) -> String {
        match self.address.parse::<SocketAddr>() {
            Ok(addr) => addr.ip().to_string(),
            Err(_) => self.address.clone(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Role assigned by the registry when a node joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    None,
    Moderator,
}

impl Role {
    /// Text annotation rendered next to the member's name
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Role::None => None,
            Role::Moderator => Some("[Mod]"),
        }
    }
}
