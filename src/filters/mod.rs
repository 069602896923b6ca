//! Client-side filters applied before lines reach history or listeners
//!
//! - `ignore`: persisted set of names whose messages and slaps are hidden
//! - `flood`: per-sender rate limit on incoming messages

pub mod flood;
pub mod ignore;

pub use flood::{FloodControl, WindowFloodControl};
pub use ignore::{IgnoreFilter, IgnoreList};
