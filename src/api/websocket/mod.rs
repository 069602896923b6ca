//! WebSocket transport for chat rooms
//!
//! Provides the `/ws/:room` endpoint. A connection is authenticated as a
//! [`Node`](crate::types::Node) from its display name and peer address;
//! the server relays room envelopes and answers tagged requests.
//! Closing the socket of a joined node counts as leaving the room.

pub mod events;
pub mod handler;
pub mod state;
