//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use super::websocket::{handler::ws_handler, state::AppState};
use crate::error::ChatError;
use crate::registry::RoomSummary;

/// Error body returned by the JSON endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        let code = match e {
            ChatError::UnknownRoom(_) => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws/:room", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/:room", get(get_room))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Open rooms with member counts and membership versions
async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms.summaries())
}

/// One room's summary, 404 when no such room is open
async fn get_room(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.rooms.room(&name) {
        Ok(room) => (StatusCode::OK, Json(room.summary())).into_response(),
        Err(e) => {
            let status = match e {
                ChatError::UnknownRoom(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ApiError::from(e))).into_response()
        }
    }
}
