//! WebSocket connection handler

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::events::{ClientFrame, ClientRequest, PongMessage, ResponseMessage, WelcomeMessage};
use super::state::AppState;
use crate::error::ChatResult;
use crate::registry::ChatRoom;
use crate::types::Node;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Display name the node joins under
    pub name: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    Query(params): Query<WsParams>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let name = match params.name.map(|n| n.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => return (StatusCode::BAD_REQUEST, "missing name").into_response(),
    };
    // The room's own identity cannot be claimed by a client
    if name == state.rooms.settings().server.name {
        return (StatusCode::FORBIDDEN, "reserved name").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, room, name, addr))
}

/// Handle an individual WebSocket connection
async fn handle_socket(
    mut socket: WebSocket,
    state: Arc<AppState>,
    room_name: String,
    requested: String,
    addr: SocketAddr,
) {
    // Held for the lifetime of the connection
    let claim = state.rooms.claim_name(&requested);
    let node = Node::new(claim.name(), addr.to_string());
    // Subscribe before any join request can be issued
    let (room, mut subscription) = state.rooms.enter(&room_name, &node);
    debug!(room = room.name(), node = %node, "socket connected");

    let welcome = WelcomeMessage::new(room.name(), node.clone(), room.server_node().clone());
    if let Ok(json) = serde_json::to_string(&welcome) {
        if socket.send(Message::Text(json)).await.is_err() {
            drop(subscription);
            state.rooms.release_if_idle(room.name());
            return; // Client disconnected immediately
        }
    }

    loop {
        tokio::select! {
            // Room broadcasts to client
            envelope = subscription.recv() => {
                match envelope {
                    Some(envelope) => {
                        if let Ok(json) = serde_json::to_string(&envelope) {
                            if socket.send(Message::Text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break, // Room closed
                }
            }

            // Client requests
            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &room, &node).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(room = room.name(), node = %node, error = %e, "socket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    room.connection_lost(&node);
    drop(subscription);
    state.rooms.release_if_idle(room.name());
    info!(room = room.name(), node = %node, "socket closed");
}

/// Handle a message from the client
/// Returns false if the connection should be closed
async fn handle_client_message(
    msg: Message,
    socket: &mut WebSocket,
    room: &ChatRoom,
    node: &Node,
) -> bool {
    match msg {
        Message::Text(text) => {
            let frame = match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!(node = %node, error = %e, "unparseable client frame");
                    return true;
                }
            };
            let reply = match frame.request {
                ClientRequest::Ping => serde_json::to_string(&PongMessage::default()),
                request => {
                    let response = match handle_request(room, node, request) {
                        Ok(result) => ResponseMessage::ok(frame.id, result),
                        Err(e) => ResponseMessage::error(frame.id, e),
                    };
                    serde_json::to_string(&response)
                }
            };
            match reply {
                Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
                Err(_) => true,
            }
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => socket.send(Message::Pong(data)).await.is_ok(),
        Message::Pong(_) => true,
        Message::Close(_) => false,
    }
}

/// Execute a request on behalf of the authenticated `node`
pub fn handle_request(room: &ChatRoom, node: &Node, request: ClientRequest) -> ChatResult<Value> {
    match request {
        ClientRequest::Join => Ok(serde_json::to_value(room.join(node)?)?),
        ClientRequest::Leave => {
            room.leave(node);
            Ok(Value::Null)
        }
        ClientRequest::SetStatus { status } => {
            room.set_status(node, &status)?;
            Ok(Value::Null)
        }
        ClientRequest::GetAllStatus => Ok(serde_json::to_value(room.get_all_status())?),
        ClientRequest::SendMessage { text } => {
            room.send_message(node, &text)?;
            Ok(Value::Null)
        }
        ClientRequest::SendEmphatic { text } => {
            room.send_emphatic(node, &text)?;
            Ok(Value::Null)
        }
        ClientRequest::Slap { target } => {
            room.slap(node, &target)?;
            Ok(Value::Null)
        }
        ClientRequest::Ping => Ok(Value::Null),
    }
}
