//! Data types shared by the registry, sessions and the wire protocol
//!
//! This module contains node identity, roles, broadcast events and the
//! chat lines rendered by sessions.

mod event;
mod line;
mod node;

pub use event::{ChatEvent, Envelope, JoinResponse, MemberEntry};
pub use line::{ChatLine, LineKind, SoundCue};
pub use node::{Node, Role};

/// Membership version stamped on join/leave broadcasts
pub type Version = u64;

/// Maximum number of characters kept for a status text
pub const MAX_STATUS_LEN: usize = 64;

/// Truncate a status text to [`MAX_STATUS_LEN`] characters
pub fn clamp_status(status: &str) -> String {
    status.trim().chars().take(MAX_STATUS_LEN).collect()
}
