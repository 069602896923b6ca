//! Runtime configuration read from the environment

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::SlapPolicy;

/// Chat server and session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Address the HTTP/WebSocket server listens on
    pub bind_addr: String,

    /// Seconds between liveness pings per room
    pub ping_interval_secs: u64,

    /// Events buffered per room before slow subscribers lag
    pub channel_capacity: usize,

    /// Base names that join as moderators
    pub moderators: Vec<String>,

    /// Authenticated identity the server publishes as
    pub server_name: String,

    /// Room treated as the lobby
    pub lobby_room: String,

    /// What third parties see when someone is slapped
    pub third_party_slaps: SlapPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3030".to_string(),
            ping_interval_secs: 60,
            channel_capacity: 1024,
            moderators: Vec::new(),
            server_name: "Server".to_string(),
            lobby_room: "lobby".to_string(),
            third_party_slaps: SlapPolicy::Silent,
        }
    }
}

impl ChatConfig {
    /// Build the configuration from `CHAT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Unparseable values keep their defaults and log a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("CHAT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse_positive(&lookup, "CHAT_PING_INTERVAL_SECS") {
            config.ping_interval_secs = secs;
        }
        if let Some(capacity) = parse_positive(&lookup, "CHAT_CHANNEL_CAPACITY") {
            config.channel_capacity = capacity;
        }
        if let Some(list) = lookup("CHAT_MODERATORS") {
            config.moderators = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(name) = lookup("CHAT_SERVER_NAME") {
            config.server_name = name;
        }
        if let Some(room) = lookup("CHAT_LOBBY_ROOM") {
            config.lobby_room = room;
        }
        if let Some(policy) = parse_var(&lookup, "CHAT_THIRD_PARTY_SLAPS") {
            config.third_party_slaps = policy;
        }

        config
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "invalid configuration value, using default");
            None
        }
    }
}

/// Like `parse_var`, but zero is rejected as well
fn parse_positive<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
{
    let value: T = parse_var(lookup, key)?;
    if value == T::default() {
        warn!(key, "configuration value must be positive, using default");
        return None;
    }
    Some(value)
}
