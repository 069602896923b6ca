//! Room-keyed store of chat rooms

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::info;

use super::{
    ChatRoom, ModeratorCheck, ModeratorList, NameClaim, NameRegistry, RoomKind, RoomSummary,
    Subscription, DEFAULT_PING_INTERVAL,
};
use crate::config::ChatConfig;
use crate::error::{ChatError, ChatResult};
use crate::types::Node;

/// Settings shared by every room a store creates
#[derive(Clone)]
pub struct RoomSettings {
    pub server: Node,
    pub moderators: Arc<dyn ModeratorCheck>,
    pub capacity: usize,
    /// `None` disables the liveness ping
    pub ping_interval: Option<Duration>,
    /// Name of the room treated as the lobby; all others are game rooms
    pub lobby_room: String,
}

impl RoomSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            server: Node::new(config.server_name.clone(), config.bind_addr.clone()),
            moderators: Arc::new(ModeratorList::new(config.moderators.iter().cloned())),
            capacity: config.channel_capacity,
            ping_interval: Some(match config.ping_interval_secs {
                0 => DEFAULT_PING_INTERVAL,
                secs => Duration::from_secs(secs),
            }),
            lobby_room: config.lobby_room.clone(),
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Explicit room registry handed to the transport
///
/// Game rooms are created on first use and removed again once nobody is
/// joined or connected. The lobby room lives until the store shuts down.
pub struct RoomStore {
    settings: RoomSettings,
    rooms: RwLock<HashMap<String, Arc<ChatRoom>>>,
    names: Arc<NameRegistry>,
}

impl RoomStore {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: RwLock::new(HashMap::new()),
            names: Arc::new(NameRegistry::new()),
        }
    }

    /// Reserve a server-wide unique display name for a new connection
    pub fn claim_name(&self, requested: &str) -> NameClaim {
        self.names.claim(requested)
    }

    /// Look up `name`, creating the room on first use
    ///
    /// The liveness ping starts only when called inside a Tokio runtime.
    pub fn get_or_create(&self, name: &str) -> Arc<ChatRoom> {
        if let Some(room) = self.rooms.read().get(name) {
            return Arc::clone(room);
        }
        let mut rooms = self.rooms.write();
        Arc::clone(self.insert_room(&mut rooms, name))
    }

    /// Get or create `name` and subscribe `node` to it in one step
    ///
    /// Holding the map lock while subscribing keeps
    /// [`RoomStore::release_if_idle`] from removing the room in between.
    pub fn enter(&self, name: &str, node: &Node) -> (Arc<ChatRoom>, Subscription) {
        {
            let rooms = self.rooms.read();
            if let Some(room) = rooms.get(name) {
                return (Arc::clone(room), room.subscribe(node));
            }
        }
        let mut rooms = self.rooms.write();
        let room = Arc::clone(self.insert_room(&mut rooms, name));
        let subscription = room.subscribe(node);
        (room, subscription)
    }

    fn insert_room<'a>(
        &self,
        rooms: &'a mut HashMap<String, Arc<ChatRoom>>,
        name: &str,
    ) -> &'a Arc<ChatRoom> {
        rooms.entry(name.to_string()).or_insert_with(|| {
            let kind = if name == self.settings.lobby_room {
                RoomKind::Lobby
            } else {
                RoomKind::Game
            };
            let room = ChatRoom::new(
                name,
                kind,
                self.settings.server.clone(),
                Arc::clone(&self.settings.moderators),
                self.settings.capacity,
            );
            if let (Some(interval), Ok(_)) = (
                self.settings.ping_interval,
                tokio::runtime::Handle::try_current(),
            ) {
                room.start_heartbeat(interval);
            }
            info!(room = name, ?kind, "room created");
            Arc::new(room)
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<ChatRoom>> {
        self.rooms.read().get(name).cloned()
    }

    /// Look up an existing room
    pub fn room(&self, name: &str) -> ChatResult<Arc<ChatRoom>> {
        self.get(name).ok_or_else(|| ChatError::UnknownRoom(name.to_string()))
    }

    /// Close and forget a game room with no members and no subscribers
    ///
    /// Returns whether the room was removed.
    pub fn release_if_idle(&self, name: &str) -> bool {
        if name == self.settings.lobby_room {
            return false;
        }
        let room = {
            let mut rooms = self.rooms.write();
            let idle = rooms.get(name).map_or(false, |room| room.is_idle());
            if idle {
                rooms.remove(name)
            } else {
                None
            }
        };
        match room {
            Some(room) => {
                room.close();
                info!(room = name, "idle room removed");
                true
            }
            None => false,
        }
    }

    /// Shut a room down and forget it
    pub fn close(&self, name: &str) -> bool {
        let room = self.rooms.write().remove(name);
        match room {
            Some(room) => {
                room.close();
                true
            }
            None => false,
        }
    }

    pub fn close_all(&self) {
        let rooms: Vec<_> = self.rooms.write().drain().map(|(_, room)| room).collect();
        for room in rooms {
            room.close();
        }
    }

    /// Rooms sorted by name
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<_> = self.rooms.read().values().map(|room| room.summary()).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new(RoomSettings::default())
    }
}
