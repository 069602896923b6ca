//! Per-room broadcast channel
//!
//! A thin wrapper over `tokio::sync::broadcast`. Every published event is
//! wrapped in an [`Envelope`] stamped with the authenticated sender.
//! Delivery is at most once: a subscriber that falls more than
//! `capacity` events behind skips the oldest ones.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::types::{ChatEvent, Envelope, Node};
use crate::utils::current_millis;

/// Broadcast channel for one room
#[derive(Clone)]
pub struct RoomChannel {
    room: String,
    tx: broadcast::Sender<Envelope>,
}

impl RoomChannel {
    /// Create a new channel with the given capacity
    pub fn new(room: impl Into<String>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            room: room.into(),
            tx,
        }
    }

    /// Publish an event to every subscriber
    ///
    /// Returns the number of subscribers reached; zero means nobody was
    /// listening, which callers may log but never treat as fatal.
    pub fn publish(&self, from: &Node, event: ChatEvent) -> usize {
        self.send(Envelope {
            from: from.clone(),
            to: None,
            event,
            timestamp: current_millis(),
        })
    }

    /// Publish an event only `to` will surface
    pub fn publish_to(&self, from: &Node, to: &Node, event: ChatEvent) -> usize {
        self.send(Envelope {
            from: from.clone(),
            to: Some(to.clone()),
            event,
            timestamp: current_millis(),
        })
    }

    fn send(&self, envelope: Envelope) -> usize {
        self.tx.send(envelope).unwrap_or(0)
    }

    /// Subscribe on behalf of `node`
    pub fn subscribe(&self, node: &Node) -> Subscription {
        Subscription {
            room: self.room.clone(),
            node: node.clone(),
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn room(&self) -> &str {
        &self.room
    }
}

/// A node's live view of a room channel
pub struct Subscription {
    room: String,
    node: Node,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Next envelope visible to this node, or `None` once the channel closes
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.is_visible_to(&self.node) => return Some(envelope),
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => {
                    warn!(room = %self.room, node = %self.node, missed, "subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}
