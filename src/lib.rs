//! Lobby Chat
//!
//! Room-based chat shared by in-game chat and the online lobby. Many nodes
//! join a named room, exchange lines, and converge on the same ordered view
//! of who is present although joins, leaves and messages race over
//! independent connections.
//!
//! # Modules
//!
//! - `types`: Node identity, roles, broadcast events and chat lines
//! - `registry`: Server-side membership registry, room channel and room store
//! - `session`: Client-side session with versioned join reconciliation
//! - `filters`: Ignore list and flood control
//! - `api`: HTTP and WebSocket transport
//! - `config`: Environment-driven configuration
//! - `utils`: Timestamps and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use lobby_chat::registry::RoomStore;
//! use lobby_chat::session::{ChatSession, LocalTransport, SessionOptions};
//! use lobby_chat::types::Node;
//!
//! # async fn run() -> lobby_chat::ChatResult<()> {
//! let rooms = RoomStore::default();
//! let room = rooms.get_or_create("lobby");
//! let transport = LocalTransport::new(room, Node::new("alice", "127.0.0.1"));
//! let session = ChatSession::connect(transport, SessionOptions::default()).await?;
//! session.send_message("hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod registry;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::ChatConfig;
pub use error::{ChatError, ChatResult};
pub use registry::{ChatRoom, MembershipRegistry, RoomStore};
pub use session::{ChatListener, ChatSession, ChatTransport, LocalTransport, SessionOptions};
pub use types::{ChatEvent, ChatLine, Envelope, Node, Role};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
