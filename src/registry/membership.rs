//! Authoritative room membership
//!
//! Every mutation runs under one mutex together with its version bump and
//! broadcast, so broadcast order equals version order and no two events
//! for the room share a version. The broadcast happens before the join
//! reply is built, so a subscriber sees `MemberAdded` no later than the
//! snapshot that already contains it.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::{ModeratorCheck, RoomChannel};
use crate::error::{ChatError, ChatResult};
use crate::types::{ChatEvent, Node, Role, Version};

struct RegistryState {
    members: BTreeMap<Node, Role>,
    version: Version,
    closed: bool,
}

/// Membership map plus its monotonic version counter
pub struct MembershipRegistry {
    room: String,
    server: Node,
    channel: RoomChannel,
    moderators: Arc<dyn ModeratorCheck>,
    state: Mutex<RegistryState>,
}

impl MembershipRegistry {
    pub fn new(
        server: Node,
        channel: RoomChannel,
        moderators: Arc<dyn ModeratorCheck>,
    ) -> Self {
        Self {
            room: channel.room().to_string(),
            server,
            channel,
            moderators,
            state: Mutex::new(RegistryState {
                members: BTreeMap::new(),
                version: 0,
                closed: false,
            }),
        }
    }

    /// Add `requester` and return a copy of the membership with its version
    pub fn join(&self, requester: &Node) -> ChatResult<(BTreeMap<Node, Role>, Version)> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(ChatError::RoomClosed(self.room.clone()));
        }
        // Room state is keyed by display name, so one name holds one slot
        if state.members.keys().any(|member| member.name == requester.name) {
            return Err(ChatError::AlreadyJoined(requester.name.clone()));
        }

        let role = if self.moderators.is_moderator(requester) {
            Role::Moderator
        } else {
            Role::None
        };
        state.members.insert(requester.clone(), role);
        state.version += 1;
        let version = state.version;

        self.channel.publish(
            &self.server,
            ChatEvent::MemberAdded {
                participant: requester.clone(),
                role,
                version,
            },
        );
        info!(room = %self.room, node = %requester, ?role, version, "member joined");

        Ok((state.members.clone(), version))
    }

    /// Remove `requester`; returns false if it was not a member
    ///
    /// A second leave for the same node neither bumps the version nor
    /// broadcasts.
    pub fn leave(&self, requester: &Node) -> bool {
        let mut state = self.state.lock();
        if state.members.remove(requester).is_none() {
            debug!(room = %self.room, node = %requester, "leave for non-member ignored");
            return false;
        }
        state.version += 1;
        let version = state.version;

        self.channel.publish(
            &self.server,
            ChatEvent::MemberRemoved {
                participant: requester.clone(),
                version,
            },
        );
        info!(room = %self.room, node = %requester, version, "member left");
        true
    }

    /// Update a member's role and announce it without a version
    pub fn set_role(&self, node: &Node, role: Role) -> ChatResult<()> {
        let mut state = self.state.lock();
        match state.members.get_mut(node) {
            Some(current) => *current = role,
            None => return Err(ChatError::NotJoined(node.name.clone())),
        }
        self.channel.publish(
            &self.server,
            ChatEvent::MemberRoleChanged {
                participant: node.clone(),
                role,
            },
        );
        Ok(())
    }

    /// Remove every member (one versioned broadcast each) and refuse new joins
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        let members = std::mem::take(&mut state.members);
        for node in members.into_keys() {
            state.version += 1;
            self.channel.publish(
                &self.server,
                ChatEvent::MemberRemoved {
                    participant: node,
                    version: state.version,
                },
            );
        }
        info!(room = %self.room, version = state.version, "registry shut down");
    }

    pub fn members(&self) -> BTreeMap<Node, Role> {
        self.state.lock().members.clone()
    }

    pub fn is_member(&self, node: &Node) -> bool {
        self.state.lock().members.contains_key(node)
    }

    pub fn member_count(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn version(&self) -> Version {
        self.state.lock().version
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
