//! WebSocket application state

use std::sync::Arc;

use crate::registry::RoomStore;

/// Shared application state for HTTP and WebSocket handlers
pub struct AppState {
    pub rooms: Arc<RoomStore>,
}

impl AppState {
    pub fn new(rooms: Arc<RoomStore>) -> Self {
        Self { rooms }
    }
}
