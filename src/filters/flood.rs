//! Incoming message flood control

use std::collections::HashMap;

use parking_lot::Mutex;

/// Length of a counting window in milliseconds
pub const WINDOW_MILLIS: i64 = 60_000;

/// Messages a sender may deliver within one window
pub const MESSAGES_PER_WINDOW: u32 = 20;

/// Decides whether a message from `sender` at `timestamp_millis` is delivered
pub trait FloodControl: Send + Sync {
    fn allow(&self, sender: &str, timestamp_millis: i64) -> bool;
}

/// Fixed-window counter per sender
///
/// All counters reset once the current window is older than its length.
pub struct WindowFloodControl {
    window_millis: i64,
    limit: u32,
    state: Mutex<WindowState>,
}

#[derive(Default)]
struct WindowState {
    window_start: Option<i64>,
    counts: HashMap<String, u32>,
}

impl WindowFloodControl {
    pub fn new() -> Self {
        Self::with_limits(WINDOW_MILLIS, MESSAGES_PER_WINDOW)
    }

    pub fn with_limits(window_millis: i64, limit: u32) -> Self {
        Self {
            window_millis,
            limit,
            state: Mutex::new(WindowState::default()),
        }
    }
}

impl Default for WindowFloodControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FloodControl for WindowFloodControl {
    fn allow(&self, sender: &str, timestamp_millis: i64) -> bool {
        let mut state = self.state.lock();
        let start = *state.window_start.get_or_insert(timestamp_millis);
        if timestamp_millis - start > self.window_millis {
            state.counts.clear();
            state.window_start = Some(timestamp_millis);
        }

        let count = state.counts.entry(sender.to_string()).or_insert(0);
        *count += 1;
        *count <= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_within_window() {
        let flood = WindowFloodControl::with_limits(1_000, 3);
        assert!(flood.allow("bob", 0));
        assert!(flood.allow("bob", 10));
        assert!(flood.allow("bob", 20));
        assert!(!flood.allow("bob", 30));
        // Other senders have their own budget
        assert!(flood.allow("alice", 40));
    }

    #[test]
    fn test_window_rolls_over() {
        let flood = WindowFloodControl::with_limits(1_000, 1);
        assert!(flood.allow("bob", 0));
        assert!(!flood.allow("bob", 500));
        assert!(flood.allow("bob", 1_500));
    }
}
