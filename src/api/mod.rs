//! API module for HTTP and WebSocket endpoints
//!
//! This module exposes chat rooms to remote clients over WebSocket, plus a
//! small REST surface for health and room listing.

pub mod http;
pub mod websocket;

pub use http::create_router;
pub use websocket::state::AppState;
