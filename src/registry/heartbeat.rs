//! Periodic no-op broadcast keeping idle connections alive

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::RoomChannel;
use crate::types::{ChatEvent, Node};

/// Ping period used when none or a zero one is configured
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn a task publishing `Ping` on `channel` every `interval`
///
/// A ping nobody receives is logged and otherwise ignored. A zero
/// `interval` falls back to [`DEFAULT_PING_INTERVAL`]. The task runs
/// until its handle is aborted.
pub fn spawn_heartbeat(channel: RoomChannel, server: Node, interval: Duration) -> JoinHandle<()> {
    let interval = if interval.is_zero() {
        warn!(room = channel.room(), "zero ping interval, using default");
        DEFAULT_PING_INTERVAL
    } else {
        interval
    };
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let reached = channel.publish(&server, ChatEvent::Ping);
            if reached == 0 {
                debug!(room = channel.room(), "ping had no subscribers");
            }
        }
    })
}
