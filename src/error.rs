//! Error types for chat rooms and sessions

use thiserror::Error;

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors raised by the registry, sessions and transports
#[derive(Debug, Error)]
pub enum ChatError {
    /// The room has been shut down and accepts no further joins.
    #[error("room '{0}' is closed")]
    RoomClosed(String),

    #[error("room '{0}' does not exist")]
    UnknownRoom(String),

    /// The node already occupies a membership slot in the room.
    #[error("{0} has already joined")]
    AlreadyJoined(String),

    #[error("{0} has not joined")]
    NotJoined(String),

    /// The underlying connection is gone.
    #[error("transport disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
