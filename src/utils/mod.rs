//! Utility functions and helpers
//!
//! Timestamps and crash-safe file writes.

pub mod atomic;
pub mod time;

pub use atomic::atomic_write;
pub use time::{current_millis, is_expired};
