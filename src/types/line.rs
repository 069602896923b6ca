use serde::{Deserialize, Serialize};

use super::Node;

/// How a history line should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Message,
    /// "/me"-style action
    Emphatic,
    /// Locally generated notice (joins, leaves, slaps, mutes)
    Notice,
}

/// A line delivered to a session's history and listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    /// Sender name; `None` for locally generated notices
    pub sender: Option<String>,
    pub text: String,
    pub kind: LineKind,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl ChatLine {
    pub fn message(sender: &Node, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: Some(sender.name.clone()),
            text: text.into(),
            kind: LineKind::Message,
            timestamp,
        }
    }

    pub fn emphatic(sender: &Node, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: Some(sender.name.clone()),
            text: text.into(),
            kind: LineKind::Emphatic,
            timestamp,
        }
    }

    pub fn notice(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: None,
            text: text.into(),
            kind: LineKind::Notice,
            timestamp,
        }
    }
}

/// Sounds a UI may play in response to session activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    MemberJoined,
    MemberLeft,
    MessageReceived,
    Slapped,
}
