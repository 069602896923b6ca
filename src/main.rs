//! Lobby Chat Server - Binary Entry Point
//!
//! Serves chat rooms over WebSocket. Configuration comes from `CHAT_*`
//! environment variables, log filtering from `RUST_LOG`.

use std::net::SocketAddr;
use std::sync::Arc;

use lobby_chat::api::{create_router, AppState};
use lobby_chat::registry::{RoomSettings, RoomStore};
use lobby_chat::{ChatConfig, ChatResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ChatResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lobby_chat=info")),
        )
        .init();

    let config = ChatConfig::from_env();
    let rooms = Arc::new(RoomStore::new(RoomSettings::from_config(&config)));
    rooms.get_or_create(&config.lobby_room);

    let app = create_router(Arc::new(AppState::new(Arc::clone(&rooms))));
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!(addr = %config.bind_addr, version = lobby_chat::VERSION, "chat server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Members of every room see a final MemberRemoved
    rooms.close_all();
    info!("chat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
