//! Bounded message history

use std::collections::VecDeque;

use crate::types::ChatLine;

/// Lines kept before the oldest is evicted
pub const MAX_HISTORY: usize = 1000;

#[derive(Debug)]
pub struct MessageHistory {
    lines: VecDeque<ChatLine>,
    cap: usize,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, line: ChatLine) {
        self.lines.push_back(line);
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
    }

    /// Lines oldest first
    pub fn lines(&self) -> Vec<ChatLine> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent() {
        let mut history = MessageHistory::new();
        for i in 0..1005 {
            history.push(ChatLine::notice(format!("line {}", i), i));
        }
        let lines = history.lines();
        assert_eq!(lines.len(), MAX_HISTORY);
        assert_eq!(lines[0].text, "line 5");
        assert_eq!(lines[MAX_HISTORY - 1].text, "line 1004");
    }
}
