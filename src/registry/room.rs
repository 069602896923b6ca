//! One chat room: registry, channel and the server-side request handlers
//!
//! Requests carry the authenticated sender supplied by the transport. The
//! sender of a chat line is never read from the payload.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{
    spawn_heartbeat, MembershipRegistry, ModeratorCheck, MuteList, RoomChannel, StatusBoard,
    Subscription, YOU_HAVE_BEEN_MUTED_GAME, YOU_HAVE_BEEN_MUTED_LOBBY,
};
use crate::error::{ChatError, ChatResult};
use crate::types::{ChatEvent, JoinResponse, Node, Role, Version};

/// Where a room lives; selects the mute notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Lobby,
    Game,
}

impl RoomKind {
    pub fn mute_notice(&self) -> &'static str {
        match self {
            RoomKind::Lobby => YOU_HAVE_BEEN_MUTED_LOBBY,
            RoomKind::Game => YOU_HAVE_BEEN_MUTED_GAME,
        }
    }
}

/// Room overview served by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub name: String,
    pub kind: RoomKind,
    pub members: usize,
    pub version: Version,
}

/// A named chat room
pub struct ChatRoom {
    name: String,
    kind: RoomKind,
    server: Node,
    channel: RoomChannel,
    registry: MembershipRegistry,
    statuses: StatusBoard,
    mutes: MuteList,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl ChatRoom {
    pub fn new(
        name: impl Into<String>,
        kind: RoomKind,
        server: Node,
        moderators: Arc<dyn ModeratorCheck>,
        capacity: usize,
    ) -> Self {
        let name = name.into();
        let channel = RoomChannel::new(name.clone(), capacity);
        let registry = MembershipRegistry::new(server.clone(), channel.clone(), moderators);
        Self {
            name,
            kind,
            server,
            channel,
            registry,
            statuses: StatusBoard::new(),
            mutes: MuteList::new(),
            heartbeat: Mutex::new(None),
        }
    }

    /// Start the liveness ping; a running ping is replaced
    pub fn start_heartbeat(&self, interval: Duration) {
        let handle = spawn_heartbeat(self.channel.clone(), self.server.clone(), interval);
        if let Some(previous) = self.heartbeat.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn subscribe(&self, node: &Node) -> Subscription {
        self.channel.subscribe(node)
    }

    pub fn join(&self, from: &Node) -> ChatResult<JoinResponse> {
        let (snapshot, version) = self.registry.join(from)?;
        Ok(JoinResponse::new(&snapshot, version))
    }

    /// Explicit leave request
    pub fn leave(&self, from: &Node) {
        if self.registry.leave(from) {
            self.statuses.clear(&from.name);
        }
    }

    /// Implicit leave after the transport lost the connection
    pub fn connection_lost(&self, node: &Node) {
        if self.registry.leave(node) {
            info!(room = %self.name, node = %node, "connection lost, member removed");
            self.statuses.clear(&node.name);
        }
    }

    pub fn send_message(&self, from: &Node, text: &str) -> ChatResult<()> {
        self.send_line(
            from,
            ChatEvent::MessageOccurred {
                text: text.to_string(),
            },
        )
    }

    pub fn send_emphatic(&self, from: &Node, text: &str) -> ChatResult<()> {
        self.send_line(
            from,
            ChatEvent::EmphaticMessageOccurred {
                text: text.to_string(),
            },
        )
    }

    fn send_line(&self, from: &Node, event: ChatEvent) -> ChatResult<()> {
        self.require_member(from)?;
        if self.mutes.is_muted(from) {
            debug!(room = %self.name, node = %from, "line from muted node withheld");
            self.channel.publish_to(
                &self.server,
                from,
                ChatEvent::MessageOccurred {
                    text: self.kind.mute_notice().to_string(),
                },
            );
            return Ok(());
        }
        self.channel.publish(from, event);
        Ok(())
    }

    pub fn slap(&self, from: &Node, target: &str) -> ChatResult<()> {
        self.require_member(from)?;
        self.channel.publish(
            from,
            ChatEvent::SlapOccurred {
                target: target.to_string(),
            },
        );
        Ok(())
    }

    pub fn set_status(&self, from: &Node, status: &str) -> ChatResult<()> {
        self.require_member(from)?;
        let status = self.statuses.set(&from.name, status);
        self.channel.publish(from, ChatEvent::StatusChanged { status });
        Ok(())
    }

    pub fn get_all_status(&self) -> BTreeMap<String, String> {
        self.statuses.all()
    }

    pub fn set_role(&self, node: &Node, role: Role) -> ChatResult<()> {
        self.registry.set_role(node, role)
    }

    pub fn mute(&self, base_name: &str, until: Option<DateTime<Utc>>) {
        info!(room = %self.name, base_name, ?until, "muted");
        self.mutes.mute(base_name, until);
    }

    pub fn unmute(&self, base_name: &str) -> bool {
        self.mutes.unmute(base_name)
    }

    pub fn mute_host(&self, host: &str, until: Option<DateTime<Utc>>) {
        info!(room = %self.name, host, ?until, "host muted");
        self.mutes.mute_host(host, until);
    }

    pub fn unmute_host(&self, host: &str) -> bool {
        self.mutes.unmute_host(host)
    }

    /// Stop the ping, remove every member and refuse further joins
    pub fn close(&self) {
        if let Some(handle) = self.heartbeat.lock().take() {
            handle.abort();
        }
        self.registry.shutdown();
    }

    /// No members and no open subscriptions
    pub fn is_idle(&self) -> bool {
        self.registry.member_count() == 0 && self.channel.subscriber_count() == 0
    }

    fn require_member(&self, node: &Node) -> ChatResult<()> {
        if self.registry.is_member(node) {
            Ok(())
        } else {
            Err(ChatError::NotJoined(node.name.clone()))
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            kind: self.kind,
            members: self.registry.member_count(),
            version: self.registry.version(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn server_node(&self) -> &Node {
        &self.server
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        if let Some(handle) = self.heartbeat.get_mut().take() {
            handle.abort();
        }
    }
}
