//! WebSocket frame types
//!
//! Room broadcasts go out as serialized [`Envelope`](crate::types::Envelope)s.
//! Requests carry an `id` echoed back in the matching response frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Node;

/// Request sent by a client
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    Join,
    Leave,
    SetStatus { status: String },
    GetAllStatus,
    SendMessage { text: String },
    SendEmphatic { text: String },
    Slap { target: String },
    /// Heartbeat; answered with a pong frame, carries no id
    Ping,
}

/// A request with its correlation id
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(default)]
    pub id: u64,

    #[serde(flatten)]
    pub request: ClientRequest,
}

/// Welcome message sent on connection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub room: String,
    /// Identity the server authenticated this connection as
    pub node: Node,
    /// Identity server notices are published from
    pub server: Node,
}

impl WelcomeMessage {
    pub fn new(room: &str, node: Node, server: Node) -> Self {
        Self {
            msg_type: "connected".to_string(),
            room: room.to_string(),
            node,
            server,
        }
    }
}

/// Reply to a client request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseMessage {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            msg_type: "response".to_string(),
            id,
            result,
            error: None,
        }
    }

    pub fn error(id: u64, error: impl ToString) -> Self {
        Self {
            msg_type: "response".to_string(),
            id,
            result: Value::Null,
            error: Some(error.to_string()),
        }
    }
}

/// Pong response message
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PongMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
}

impl Default for PongMessage {
    fn default() -> Self {
        Self {
            msg_type: "pong".to_string(),
        }
    }
}
