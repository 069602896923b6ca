//! Broadcast event contract for chat rooms

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Node, Role, Version};

/// Events published on a room's broadcast channel
///
/// The sending node is never part of the payload; it travels in the
/// [`Envelope`] and is filled in by the server from the connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A node joined the room
    MemberAdded {
        participant: Node,
        role: Role,
        version: Version,
    },

    /// A node left the room or its connection dropped
    MemberRemoved { participant: Node, version: Version },

    /// Advisory role update, last write wins
    MemberRoleChanged { participant: Node, role: Role },

    /// Plain chat line
    MessageOccurred { text: String },

    /// "/me"-style action line
    EmphaticMessageOccurred { text: String },

    /// The sender slapped `target`
    SlapOccurred { target: String },

    /// The sender changed its status text
    StatusChanged { status: String },

    /// Keeps idle connections alive
    Ping,
}

impl ChatEvent {
    /// Version of a membership-changing event
    pub fn version(&self) -> Option<Version> {
        match self {
            ChatEvent::MemberAdded { version, .. } | ChatEvent::MemberRemoved { version, .. } => {
                Some(*version)
            }
            _ => None,
        }
    }
}

/// Broadcast wrapper carrying the authenticated sender
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Authenticated sender, set by the server
    pub from: Node,

    /// Private recipient; `None` reaches every subscriber
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Node>,

    #[serde(flatten)]
    pub event: ChatEvent,

    /// Unix timestamp in milliseconds when the event was published
    pub timestamp: i64,
}

impl Envelope {
    /// Whether `node` should see this envelope
    pub fn is_visible_to(&self, node: &Node) -> bool {
        self.to.as_ref().map_or(true, |to| to == node)
    }
}

/// One entry of a membership snapshot on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub node: Node,
    pub role: Role,
}

/// Reply to a join request: snapshot plus the version it was taken at
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub members: Vec<MemberEntry>,
    pub version: Version,
}

impl JoinResponse {
    pub fn new(snapshot: &BTreeMap<Node, Role>, version: Version) -> Self {
        Self {
            members: snapshot
                .iter()
                .map(|(node, role)| MemberEntry {
                    node: node.clone(),
                    role: *role,
                })
                .collect(),
            version,
        }
    }

    /// Membership snapshot keyed by node
    pub fn snapshot(&self) -> BTreeMap<Node, Role> {
        self.members
            .iter()
            .map(|entry| (entry.node.clone(), entry.role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Node {
        Node::new("alice", "10.0.0.1")
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = ChatEvent::MemberAdded {
            participant: alice(),
            role: Role::Moderator,
            version: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"member_added\""));
        assert!(json.contains("\"role\":\"moderator\""));
    }

    #[test]
    fn test_envelope_flattens_event() {
        let envelope = Envelope {
            from: alice(),
            to: None,
            event: ChatEvent::Ping,
            timestamp: 42,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"type\":\"ping\""));
        assert!(!json.contains("\"to\""));

        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event, ChatEvent::Ping);
    }

    #[test]
    fn test_private_envelope_visibility() {
        let bob = Node::new("bob", "10.0.0.2");
        let envelope = Envelope {
            from: alice(),
            to: Some(bob.clone()),
            event: ChatEvent::MessageOccurred {
                text: "hi".to_string(),
            },
            timestamp: 0,
        };
        assert!(envelope.is_visible_to(&bob));
        assert!(!envelope.is_visible_to(&alice()));
    }

    #[test]
    fn test_version_only_on_membership_events() {
        let removed = ChatEvent::MemberRemoved {
            participant: alice(),
            version: 3,
        };
        assert_eq!(removed.version(), Some(3));
        assert_eq!(ChatEvent::Ping.version(), None);
    }

    #[test]
    fn test_join_response_snapshot() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert(alice(), Role::None);
        let response = JoinResponse::new(&snapshot, 1);
        assert_eq!(response.members.len(), 1);
        assert_eq!(response.snapshot(), snapshot);
    }
}
