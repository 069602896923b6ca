//! Request/response seam between a session and its room
//!
//! A transport supplies the authenticated identities, the room
//! subscription and the blocking round trips a session needs.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ChatError, ChatResult};
use crate::registry::{ChatRoom, Subscription};
use crate::types::{JoinResponse, Node};

/// Operations a chat session issues against its room
pub trait ChatTransport: Send + Sync + 'static {
    /// Identity the server authenticated this connection as
    fn local_node(&self) -> &Node;

    /// Identity the server publishes control notices as
    fn server_node(&self) -> &Node;

    fn is_connected(&self) -> bool;

    /// Start receiving the room's broadcasts
    fn subscribe(&self) -> ChatResult<Subscription>;

    fn join(&self) -> impl Future<Output = ChatResult<JoinResponse>> + Send;

    fn leave(&self) -> impl Future<Output = ChatResult<()>> + Send;

    fn set_status(&self, status: &str) -> impl Future<Output = ChatResult<()>> + Send;

    fn get_all_status(&self) -> impl Future<Output = ChatResult<BTreeMap<String, String>>> + Send;

    fn send_message(&self, text: &str) -> impl Future<Output = ChatResult<()>> + Send;

    fn send_emphatic(&self, text: &str) -> impl Future<Output = ChatResult<()>> + Send;

    fn slap(&self, target: &str) -> impl Future<Output = ChatResult<()>> + Send;
}

/// In-process transport talking straight to a [`ChatRoom`]
pub struct LocalTransport {
    room: Arc<ChatRoom>,
    node: Node,
    connected: AtomicBool,
}

impl LocalTransport {
    pub fn new(room: Arc<ChatRoom>, node: Node) -> Self {
        Self {
            room,
            node,
            connected: AtomicBool::new(true),
        }
    }

    /// Drop the connection; the room treats it as an implicit leave
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.room.connection_lost(&self.node);
        }
    }

    pub fn room(&self) -> &Arc<ChatRoom> {
        &self.room
    }

    fn ensure_connected(&self) -> ChatResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ChatError::Disconnected)
        }
    }
}

impl ChatTransport for LocalTransport {
    fn local_node(&self) -> &Node {
        &self.node
    }

    fn server_node(&self) -> &Node {
        self.room.server_node()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> ChatResult<Subscription> {
        self.ensure_connected()?;
        Ok(self.room.subscribe(&self.node))
    }

    async fn join(&self) -> ChatResult<JoinResponse> {
        self.ensure_connected()?;
        self.room.join(&self.node)
    }

    async fn leave(&self) -> ChatResult<()> {
        self.ensure_connected()?;
        self.room.leave(&self.node);
        Ok(())
    }

    async fn set_status(&self, status: &str) -> ChatResult<()> {
        self.ensure_connected()?;
        self.room.set_status(&self.node, status)
    }

    async fn get_all_status(&self) -> ChatResult<BTreeMap<String, String>> {
        self.ensure_connected()?;
        Ok(self.room.get_all_status())
    }

    async fn send_message(&self, text: &str) -> ChatResult<()> {
        self.ensure_connected()?;
        self.room.send_message(&self.node, text)
    }

    async fn send_emphatic(&self, text: &str) -> ChatResult<()> {
        self.ensure_connected()?;
        self.room.send_emphatic(&self.node, text)
    }

    async fn slap(&self, target: &str) -> ChatResult<()> {
        self.ensure_connected()?;
        self.room.slap(&self.node, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ModeratorList, RoomKind};

    fn room() -> Arc<ChatRoom> {
        Arc::new(ChatRoom::new(
            "lobby",
            RoomKind::Lobby,
            Node::new("Server", "127.0.0.1"),
            Arc::new(ModeratorList::default()),
            64,
        ))
    }

    #[tokio::test]
    async fn test_disconnect_is_implicit_leave() {
        let room = room();
        let transport = LocalTransport::new(room.clone(), Node::new("alice", "10.0.0.1"));
        transport.join().await.unwrap();
        assert_eq!(room.registry().member_count(), 1);

        transport.disconnect();

        assert_eq!(room.registry().member_count(), 0);
        assert_eq!(room.registry().version(), 2);
        assert!(matches!(transport.leave().await, Err(ChatError::Disconnected)));
    }
}
