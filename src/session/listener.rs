//! Observers of a chat session
//!
//! Listeners are snapshotted before each notification round, so a listener
//! may add or remove listeners from inside a callback. Rounds run one at a
//! time. Member lists carry the sequence number they were taken at under
//! the session lock, and a list older than one already delivered is
//! dropped, so the last list a listener sees is the newest one.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use super::MembershipChange;
use crate::types::{ChatLine, Node, SoundCue};

/// Callbacks a UI registers on a session; every method defaults to a no-op
pub trait ChatListener: Send + Sync {
    /// Full member list after any change, already sorted
    fn members_changed(&self, _members: &[Node]) {}

    /// A membership change was applied to the mirror
    fn member_event(&self, _change: &MembershipChange) {}

    fn line_added(&self, _line: &ChatLine) {}

    /// `status` is empty when cleared
    fn status_changed(&self, _name: &str, _status: &str) {}

    fn play_sound(&self, _cue: SoundCue) {}
}

/// Something to tell listeners once the session lock is released
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Members { seq: u64, members: Vec<Node> },
    Applied(MembershipChange),
    Line(ChatLine),
    Status { name: String, status: String },
    Sound(SoundCue),
}

#[derive(Default)]
pub struct ListenerSet {
    listeners: RwLock<Vec<Arc<dyn ChatListener>>>,
    /// Sequence of the newest member list delivered so far
    delivered: ReentrantMutex<Cell<u64>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn ChatListener>) {
        self.listeners.write().push(listener);
    }

    /// Remove a listener by identity
    pub fn remove(&self, listener: &Arc<dyn ChatListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|existing| !Arc::ptr_eq(existing, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    pub(crate) fn dispatch(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let delivered = self.delivered.lock();
        let snapshot: Vec<_> = self.listeners.read().clone();
        for notification in &notifications {
            if let Notification::Members { seq, .. } = notification {
                if *seq <= delivered.get() {
                    continue;
                }
                delivered.set(*seq);
            }
            for listener in &snapshot {
                match notification {
                    Notification::Members { members, .. } => listener.members_changed(members),
                    Notification::Applied(change) => listener.member_event(change),
                    Notification::Line(line) => listener.line_added(line),
                    Notification::Status { name, status } => listener.status_changed(name, status),
                    Notification::Sound(cue) => listener.play_sound(*cue),
                }
            }
        }
    }
}
