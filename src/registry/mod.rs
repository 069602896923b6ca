//! Server-side room state
//!
//! This module contains the authoritative membership registry and the
//! collaborators a room needs around it: the broadcast channel, the
//! status board, the mute list, moderator checks, display name
//! reservations and the liveness ping.

mod channel;
mod heartbeat;
mod membership;
mod moderator;
mod mute;
mod names;
mod room;
mod status;
mod store;

pub use channel::{RoomChannel, Subscription};
pub use heartbeat::{spawn_heartbeat, DEFAULT_PING_INTERVAL};
pub use membership::MembershipRegistry;
pub use moderator::{ModeratorCheck, ModeratorList};
pub use mute::{MuteList, YOU_HAVE_BEEN_MUTED_GAME, YOU_HAVE_BEEN_MUTED_LOBBY};
pub use names::{NameClaim, NameRegistry, MAX_NAME_LEN, MIN_NAME_LEN};
pub use room::{ChatRoom, RoomKind, RoomSummary};
pub use status::StatusBoard;
pub use store::{RoomSettings, RoomStore};
