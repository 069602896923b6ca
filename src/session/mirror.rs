//! Client-local copy of a room's membership

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use super::MembershipChange;
use crate::types::{Node, Role};

/// Number of departed members remembered
pub const RECENTLY_DEPARTED_CAP: usize = 10;

/// Ordered member set with role annotations
#[derive(Debug, Default)]
pub struct MembershipMirror {
    members: BTreeSet<Node>,
    roles: BTreeMap<Node, Role>,
    departed: VecDeque<Node>,
}

impl MembershipMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole membership with a join snapshot
    pub fn reset(&mut self, snapshot: &BTreeMap<Node, Role>) {
        self.members = snapshot.keys().cloned().collect();
        self.roles = snapshot.clone();
    }

    /// Apply a change; returns false when it would double-add or remove a stranger
    pub fn apply(&mut self, change: &MembershipChange) -> bool {
        match change {
            MembershipChange::Added {
                participant, role, ..
            } => {
                if !self.members.insert(participant.clone()) {
                    debug!(node = %participant, "already present, add skipped");
                    return false;
                }
                self.roles.insert(participant.clone(), *role);
                true
            }
            MembershipChange::Removed { participant, .. } => {
                if !self.members.remove(participant) {
                    debug!(node = %participant, "not present, remove skipped");
                    return false;
                }
                self.roles.remove(participant);
                self.departed.push_back(participant.clone());
                if self.departed.len() > RECENTLY_DEPARTED_CAP {
                    self.departed.pop_front();
                }
                true
            }
        }
    }

    /// Update a member's role; unknown members are ignored
    pub fn set_role(&mut self, node: &Node, role: Role) -> bool {
        match self.roles.get_mut(node) {
            Some(current) => {
                *current = role;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.roles.clear();
    }

    pub fn members(&self) -> Vec<Node> {
        self.members.iter().cloned().collect()
    }

    pub fn role(&self, node: &Node) -> Option<Role> {
        self.roles.get(node).copied()
    }

    /// Member name with its role tag, e.g. `"alice [Mod]"`
    pub fn display_name(&self, node: &Node) -> String {
        match self.role(node).and_then(|role| role.tag()) {
            Some(tag) => format!("{} {}", node.name, tag),
            None => node.name.clone(),
        }
    }

    /// Last members to leave, oldest first
    pub fn recently_departed(&self) -> Vec<Node> {
        self.departed.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
