//! Join handshake state machine
//!
//! Membership events that arrive while the join request is in flight are
//! queued. Once the snapshot is in, only queued events newer than the
//! snapshot's version are replayed; older ones are already reflected in
//! it. After that events apply as they arrive, except stragglers the
//! channel buffered before the snapshot but delivered after it.

use std::mem;

use crate::types::{ChatEvent, Node, Role, Version};

/// A versioned membership change taken from the broadcast channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Added {
        participant: Node,
        role: Role,
        version: Version,
    },
    Removed {
        participant: Node,
        version: Version,
    },
}

impl MembershipChange {
    /// Extract the change from a membership event
    pub fn from_event(event: &ChatEvent) -> Option<Self> {
        match event {
            ChatEvent::MemberAdded {
                participant,
                role,
                version,
            } => Some(MembershipChange::Added {
                participant: participant.clone(),
                role: *role,
                version: *version,
            }),
            ChatEvent::MemberRemoved {
                participant,
                version,
            } => Some(MembershipChange::Removed {
                participant: participant.clone(),
                version: *version,
            }),
            _ => None,
        }
    }

    pub fn version(&self) -> Version {
        match self {
            MembershipChange::Added { version, .. } | MembershipChange::Removed { version, .. } => {
                *version
            }
        }
    }

    pub fn participant(&self) -> &Node {
        match self {
            MembershipChange::Added { participant, .. }
            | MembershipChange::Removed { participant, .. } => participant,
        }
    }
}

/// Whether a session is still waiting for its join snapshot
#[derive(Debug)]
pub enum InitState {
    /// Join in flight; membership events are deferred in delivery order
    NotInitialized { queue: Vec<MembershipChange> },
    /// Snapshot applied; events are applied as they arrive
    Initialized { init_version: Version },
}

impl InitState {
    pub fn new() -> Self {
        InitState::NotInitialized { queue: Vec::new() }
    }

    /// Defer `change` while initializing, otherwise hand it back to apply now
    ///
    /// Once initialized, a change at or below the snapshot version is
    /// already part of the snapshot and is dropped.
    pub fn offer(&mut self, change: MembershipChange) -> Option<MembershipChange> {
        match self {
            InitState::NotInitialized { queue } => {
                queue.push(change);
                None
            }
            InitState::Initialized { init_version } if change.version() <= *init_version => None,
            InitState::Initialized { .. } => Some(change),
        }
    }

    /// Switch to initialized and return the queued changes still to apply
    ///
    /// Completing twice returns nothing the second time.
    pub fn complete(&mut self, init_version: Version) -> Vec<MembershipChange> {
        match mem::replace(self, InitState::Initialized { init_version }) {
            InitState::NotInitialized { queue } => newer_than(&queue, init_version),
            already @ InitState::Initialized { .. } => {
                *self = already;
                Vec::new()
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, InitState::Initialized { .. })
    }
}

impl Default for InitState {
    fn default() -> Self {
        Self::new()
    }
}

/// Queued changes not yet reflected in a snapshot taken at `init_version`
pub fn newer_than(queue: &[MembershipChange], init_version: Version) -> Vec<MembershipChange> {
    queue
        .iter()
        .filter(|change| change.version() > init_version)
        .cloned()
        .collect()
}
