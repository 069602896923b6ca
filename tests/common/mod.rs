//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use lobby_chat::registry::{ChatRoom, ModeratorList, RoomKind, Subscription};
use lobby_chat::session::{ChatListener, ChatTransport, LocalTransport, MembershipChange};
use lobby_chat::types::{ChatLine, JoinResponse, Node, SoundCue};
use lobby_chat::ChatResult;

pub fn node(name: &str) -> Node {
    Node::new(name, format!("10.0.0.{}", name.len()))
}

pub fn server() -> Node {
    Node::new("Server", "127.0.0.1")
}

pub fn room_with(kind: RoomKind, moderators: &[&str], capacity: usize) -> Arc<ChatRoom> {
    Arc::new(ChatRoom::new(
        "test-room",
        kind,
        server(),
        Arc::new(ModeratorList::new(moderators.iter().copied())),
        capacity,
    ))
}

pub fn room() -> Arc<ChatRoom> {
    room_with(RoomKind::Lobby, &[], 1024)
}

pub fn transport(room: &Arc<ChatRoom>, name: &str) -> LocalTransport {
    LocalTransport::new(Arc::clone(room), node(name))
}

/// Poll `condition` until it holds or two seconds pass
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Records everything a session reports
#[derive(Default)]
pub struct Recorder {
    pub members: Mutex<Vec<Vec<Node>>>,
    pub applied: Mutex<Vec<MembershipChange>>,
    pub lines: Mutex<Vec<ChatLine>>,
    pub statuses: Mutex<Vec<(String, String)>>,
    pub sounds: Mutex<Vec<SoundCue>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines.lock().iter().map(|line| line.text.clone()).collect()
    }

    pub fn applied_versions(&self) -> Vec<u64> {
        self.applied.lock().iter().map(|change| change.version()).collect()
    }

    pub fn last_members(&self) -> Option<Vec<Node>> {
        self.members.lock().last().cloned()
    }
}

impl ChatListener for Recorder {
    fn members_changed(&self, members: &[Node]) {
        self.members.lock().push(members.to_vec());
    }

    fn member_event(&self, change: &MembershipChange) {
        self.applied.lock().push(change.clone());
    }

    fn line_added(&self, line: &ChatLine) {
        self.lines.lock().push(line.clone());
    }

    fn status_changed(&self, name: &str, status: &str) {
        self.statuses.lock().push((name.to_string(), status.to_string()));
    }

    fn play_sound(&self, cue: SoundCue) {
        self.sounds.lock().push(cue);
    }
}

/// Transport whose join request pauses until the test opens the gate
///
/// With `hold_after_join` the pause happens after the registry has
/// processed the join but before the reply reaches the session.
pub struct GatedTransport {
    pub inner: LocalTransport,
    pub reached: Arc<Notify>,
    pub gate: Arc<Notify>,
    pub hold_after_join: bool,
}

impl GatedTransport {
    pub fn new(inner: LocalTransport, hold_after_join: bool) -> Self {
        Self {
            inner,
            reached: Arc::new(Notify::new()),
            gate: Arc::new(Notify::new()),
            hold_after_join,
        }
    }
}

impl ChatTransport for GatedTransport {
    fn local_node(&self) -> &Node {
        self.inner.local_node()
    }

    fn server_node(&self) -> &Node {
        self.inner.server_node()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn subscribe(&self) -> ChatResult<Subscription> {
        self.inner.subscribe()
    }

    async fn join(&self) -> ChatResult<JoinResponse> {
        if !self.hold_after_join {
            self.reached.notify_one();
            self.gate.notified().await;
        }
        let response = self.inner.join().await;
        if self.hold_after_join {
            self.reached.notify_one();
            self.gate.notified().await;
        }
        response
    }

    async fn leave(&self) -> ChatResult<()> {
        self.inner.leave().await
    }

    async fn set_status(&self, status: &str) -> ChatResult<()> {
        self.inner.set_status(status).await
    }

    async fn get_all_status(&self) -> ChatResult<BTreeMap<String, String>> {
        self.inner.get_all_status().await
    }

    async fn send_message(&self, text: &str) -> ChatResult<()> {
        self.inner.send_message(text).await
    }

    async fn send_emphatic(&self, text: &str) -> ChatResult<()> {
        self.inner.send_emphatic(text).await
    }

    async fn slap(&self, target: &str) -> ChatResult<()> {
        self.inner.slap(target).await
    }
}

/// Transport whose status fetch replies with the map read before `during_fetch` ran
///
/// The reply is held back long enough for the session to process whatever
/// `during_fetch` broadcast.
pub struct StaleStatusTransport {
    pub inner: LocalTransport,
    during_fetch: Box<dyn Fn() + Send + Sync>,
}

impl StaleStatusTransport {
    pub fn new(inner: LocalTransport, during_fetch: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner,
            during_fetch: Box::new(during_fetch),
        }
    }
}

impl ChatTransport for StaleStatusTransport {
    fn local_node(&self) -> &Node {
        self.inner.local_node()
    }

    fn server_node(&self) -> &Node {
        self.inner.server_node()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn subscribe(&self) -> ChatResult<Subscription> {
        self.inner.subscribe()
    }

    async fn join(&self) -> ChatResult<JoinResponse> {
        self.inner.join().await
    }

    async fn leave(&self) -> ChatResult<()> {
        self.inner.leave().await
    }

    async fn set_status(&self, status: &str) -> ChatResult<()> {
        self.inner.set_status(status).await
    }

    async fn get_all_status(&self) -> ChatResult<BTreeMap<String, String>> {
        let stale = self.inner.get_all_status().await?;
        (self.during_fetch)();
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(stale)
    }

    async fn send_message(&self, text: &str) -> ChatResult<()> {
        self.inner.send_message(text).await
    }

    async fn send_emphatic(&self, text: &str) -> ChatResult<()> {
        self.inner.send_emphatic(text).await
    }

    async fn slap(&self, target: &str) -> ChatResult<()> {
        self.inner.slap(target).await
    }
}
