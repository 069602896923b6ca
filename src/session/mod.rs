//! Client-side chat session
//!
//! A session mirrors one room's membership and collects its chat lines.
//! Joining follows a subscribe-then-fetch handshake:
//!
//! 1. Subscribe to the room's broadcasts.
//! 2. Send the join request. Membership events delivered meanwhile are queued.
//! 3. Install the returned snapshot and replay only queued events whose
//!    version is newer than the snapshot's.
//! 4. From then on apply membership events as they arrive.
//!
//! Steps 3 and 4 switch under the session mutex, so no event is applied
//! between installing the snapshot and finishing the replay.

mod history;
mod init;
mod listener;
mod mirror;
mod transport;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use history::{MessageHistory, MAX_HISTORY};
pub use init::{newer_than, InitState, MembershipChange};
pub use listener::{ChatListener, ListenerSet};
pub use mirror::{MembershipMirror, RECENTLY_DEPARTED_CAP};
pub use transport::{ChatTransport, LocalTransport};

use listener::Notification;

use crate::config::ChatConfig;
use crate::error::ChatResult;
use crate::filters::{FloodControl, IgnoreFilter, IgnoreList, WindowFloodControl};
use crate::registry::{YOU_HAVE_BEEN_MUTED_GAME, YOU_HAVE_BEEN_MUTED_LOBBY};
use crate::types::{ChatEvent, ChatLine, Envelope, Node, Role, SoundCue};

/// Notice shown when the local node's own lines are flood-limited
pub const MESSAGE_LIMIT_EXCEEDED: &str = "MESSAGE LIMIT EXCEEDED, TRY AGAIN LATER";

/// What a session shows when it witnesses someone else's slap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlapPolicy {
    /// Third parties see nothing
    #[default]
    Silent,
    /// Third parties see "X slapped Y"
    Announce,
}

impl FromStr for SlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(SlapPolicy::Silent),
            "announce" => Ok(SlapPolicy::Announce),
            other => Err(format!("unknown slap policy '{}'", other)),
        }
    }
}

/// Collaborators and preferences of a session
#[derive(Clone)]
pub struct SessionOptions {
    pub slap_policy: SlapPolicy,
    pub ignore: Arc<dyn IgnoreFilter>,
    pub flood: Arc<dyn FloodControl>,
    pub join_sounds: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            slap_policy: SlapPolicy::Silent,
            ignore: Arc::new(IgnoreList::in_memory()),
            flood: Arc::new(WindowFloodControl::new()),
            join_sounds: true,
        }
    }
}

impl SessionOptions {
    /// Defaults with the slap policy taken from `config`
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            slap_policy: config.third_party_slaps,
            ..Self::default()
        }
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("slap_policy", &self.slap_policy)
            .field("join_sounds", &self.join_sounds)
            .finish_non_exhaustive()
    }
}

struct SessionState {
    init: InitState,
    mirror: MembershipMirror,
    history: MessageHistory,
    statuses: BTreeMap<String, String>,
    members_seq: u64,
}

impl SessionState {
    /// Current member list, numbered in the order it was taken
    fn members_note(&mut self) -> Notification {
        self.members_seq += 1;
        Notification::Members {
            seq: self.members_seq,
            members: self.mirror.members(),
        }
    }
}

struct SessionInner<T> {
    transport: T,
    options: SessionOptions,
    listeners: ListenerSet,
    state: Mutex<SessionState>,
}

/// A joined chat room as seen from one node
pub struct ChatSession<T: ChatTransport> {
    inner: Arc<SessionInner<T>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Subscribe, join and reconcile; returns once the mirror is initialized
    pub async fn connect(transport: T, options: SessionOptions) -> ChatResult<Self> {
        Self::connect_with_listeners(transport, options, Vec::new()).await
    }

    /// Like [`ChatSession::connect`], with listeners registered before the join
    pub async fn connect_with_listeners(
        transport: T,
        options: SessionOptions,
        listeners: Vec<Arc<dyn ChatListener>>,
    ) -> ChatResult<Self> {
        let inner = Arc::new(SessionInner {
            transport,
            options,
            listeners: ListenerSet::new(),
            state: Mutex::new(SessionState {
                init: InitState::new(),
                mirror: MembershipMirror::new(),
                history: MessageHistory::new(),
                statuses: BTreeMap::new(),
                members_seq: 0,
            }),
        });
        for listener in listeners {
            inner.listeners.add(listener);
        }

        let mut subscription = inner.transport.subscribe()?;
        let pump_inner = Arc::clone(&inner);
        let pump = tokio::spawn(async move {
            while let Some(envelope) = subscription.recv().await {
                pump_inner.handle_envelope(envelope);
            }
            debug!(node = %pump_inner.transport.local_node(), "room channel closed");
        });
        let session = Self {
            inner,
            pump: Mutex::new(Some(pump)),
        };

        let response = match session.inner.transport.join().await {
            Ok(response) => response,
            Err(e) => {
                session.stop_pump();
                return Err(e);
            }
        };
        session.inner.complete_join(&response.snapshot(), response.version);

        match session.inner.transport.get_all_status().await {
            Ok(statuses) => session.inner.seed_statuses(statuses),
            Err(e) => warn!(error = %e, "could not fetch member statuses"),
        }

        Ok(session)
    }

    pub fn add_listener(&self, listener: Arc<dyn ChatListener>) {
        self.inner.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ChatListener>) -> bool {
        self.inner.listeners.remove(listener)
    }

    pub async fn send_message(&self, text: &str) -> ChatResult<()> {
        self.inner.transport.send_message(text).await
    }

    pub async fn send_emphatic(&self, text: &str) -> ChatResult<()> {
        self.inner.transport.send_emphatic(text).await
    }

    /// Send typed input; `/me ` turns it into an action line
    pub async fn submit(&self, input: &str) -> ChatResult<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        match input.strip_prefix("/me ") {
            Some(action) => self.send_emphatic(action).await,
            None => self.send_message(input).await,
        }
    }

    pub async fn slap(&self, target: &str) -> ChatResult<()> {
        self.inner.transport.slap(target).await
    }

    pub async fn set_status(&self, status: &str) -> ChatResult<()> {
        self.inner.transport.set_status(status).await
    }

    /// Unsubscribe, leave if still connected, and empty the mirror
    pub async fn shutdown(&self) -> ChatResult<()> {
        self.stop_pump();
        let result = if self.inner.transport.is_connected() {
            self.inner.transport.leave().await
        } else {
            Ok(())
        };
        let note = {
            let mut state = self.inner.state.lock();
            state.mirror.clear();
            state.members_note()
        };
        self.inner.listeners.dispatch(vec![note]);
        info!(node = %self.inner.transport.local_node(), "session shut down");
        result
    }

    fn stop_pump(&self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }

    pub fn local_node(&self) -> &Node {
        self.inner.transport.local_node()
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().init.is_initialized()
    }

    pub fn members(&self) -> Vec<Node> {
        self.inner.state.lock().mirror.members()
    }

    /// Member names annotated with role tags
    pub fn display_names(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        state
            .mirror
            .members()
            .iter()
            .map(|node| state.mirror.display_name(node))
            .collect()
    }

    pub fn role(&self, node: &Node) -> Option<Role> {
        self.inner.state.lock().mirror.role(node)
    }

    pub fn history(&self) -> Vec<ChatLine> {
        self.inner.state.lock().history.lines()
    }

    pub fn recently_departed(&self) -> Vec<Node> {
        self.inner.state.lock().mirror.recently_departed()
    }

    pub fn statuses(&self) -> BTreeMap<String, String> {
        self.inner.state.lock().statuses.clone()
    }
}

impl<T: ChatTransport> Drop for ChatSession<T> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.get_mut().take() {
            pump.abort();
        }
    }
}

impl<T: ChatTransport> SessionInner<T> {
    fn complete_join(&self, snapshot: &BTreeMap<Node, Role>, version: u64) {
        let mut notes = Vec::new();
        {
            let mut state = self.state.lock();
            state.mirror.reset(snapshot);
            let replay = state.init.complete(version);
            debug!(
                node = %self.transport.local_node(),
                version,
                replayed = replay.len(),
                "join snapshot installed"
            );
            for change in replay {
                self.apply_change(&mut state, change, &mut notes);
            }
            notes.push(state.members_note());
        }
        self.listeners.dispatch(notes);
    }

    /// Fill in statuses of current members the session has not heard yet
    ///
    /// A `StatusChanged` the pump applied during the fetch is newer than
    /// the fetched value and wins.
    fn seed_statuses(&self, statuses: BTreeMap<String, String>) {
        let mut notes = Vec::new();
        {
            let mut state = self.state.lock();
            let present: BTreeSet<String> = state
                .mirror
                .members()
                .into_iter()
                .map(|node| node.name)
                .collect();
            for (name, status) in statuses {
                if !present.contains(&name) {
                    continue;
                }
                if let Entry::Vacant(entry) = state.statuses.entry(name.clone()) {
                    entry.insert(status.clone());
                    notes.push(Notification::Status { name, status });
                }
            }
        }
        self.listeners.dispatch(notes);
    }

    fn handle_envelope(&self, envelope: Envelope) {
        let Envelope {
            from,
            event,
            timestamp,
            ..
        } = envelope;
        let mut notes = Vec::new();

        if let Some(change) = MembershipChange::from_event(&event) {
            {
                let mut state = self.state.lock();
                // Queue or apply is decided per event under the lock
                if let Some(change) = state.init.offer(change) {
                    self.apply_change(&mut state, change, &mut notes);
                    notes.push(state.members_note());
                }
            }
            self.listeners.dispatch(notes);
            return;
        }

        match event {
            ChatEvent::MemberAdded { .. } | ChatEvent::MemberRemoved { .. } => {}
            ChatEvent::MemberRoleChanged { participant, role } => {
                let mut state = self.state.lock();
                if state.mirror.set_role(&participant, role) {
                    notes.push(state.members_note());
                }
            }
            ChatEvent::MessageOccurred { text } => {
                self.handle_line(&from, text, false, timestamp, &mut notes)
            }
            ChatEvent::EmphaticMessageOccurred { text } => {
                self.handle_line(&from, text, true, timestamp, &mut notes)
            }
            ChatEvent::SlapOccurred { target } => {
                self.handle_slap(&from, &target, timestamp, &mut notes)
            }
            ChatEvent::StatusChanged { status } => {
                let mut state = self.state.lock();
                if status.is_empty() {
                    state.statuses.remove(&from.name);
                } else {
                    state.statuses.insert(from.name.clone(), status.clone());
                }
                notes.push(Notification::Status {
                    name: from.name,
                    status,
                });
            }
            ChatEvent::Ping => {}
        }
        self.listeners.dispatch(notes);
    }

    fn apply_change(
        &self,
        state: &mut SessionState,
        change: MembershipChange,
        notes: &mut Vec<Notification>,
    ) {
        if !state.mirror.apply(&change) {
            return;
        }
        let (text, cue) = match &change {
            MembershipChange::Added { participant, .. } => {
                (format!("{} has joined", participant.name), SoundCue::MemberJoined)
            }
            MembershipChange::Removed { participant, .. } => {
                // Leaving members take their status with them
                state.statuses.remove(&participant.name);
                (format!("{} has left", participant.name), SoundCue::MemberLeft)
            }
        };
        let line = ChatLine::notice(text, crate::utils::current_millis());
        state.history.push(line.clone());
        notes.push(Notification::Applied(change));
        notes.push(Notification::Line(line));
        if self.options.join_sounds {
            notes.push(Notification::Sound(cue));
        }
    }

    fn handle_line(
        &self,
        from: &Node,
        text: String,
        emphatic: bool,
        timestamp: i64,
        notes: &mut Vec<Notification>,
    ) {
        let local = self.transport.local_node();

        if from == self.transport.server_node() && is_control_notice(&text) {
            let line = ChatLine::notice(text.trim_start_matches('?'), timestamp);
            self.push_line(line, notes);
            return;
        }
        if self.options.ignore.should_ignore(&from.name) {
            return;
        }
        if !self.options.flood.allow(&from.name, timestamp) {
            if from == local {
                self.push_line(ChatLine::notice(MESSAGE_LIMIT_EXCEEDED, timestamp), notes);
            }
            return;
        }

        let line = if emphatic {
            ChatLine::emphatic(from, text, timestamp)
        } else {
            ChatLine::message(from, text, timestamp)
        };
        self.push_line(line, notes);
        if from != local {
            notes.push(Notification::Sound(SoundCue::MessageReceived));
        }
    }

    fn handle_slap(&self, from: &Node, target: &str, timestamp: i64, notes: &mut Vec<Notification>) {
        if self.options.ignore.should_ignore(&from.name) {
            return;
        }
        let local = self.transport.local_node();

        if target == local.name {
            self.push_line(
                ChatLine::notice(format!("You were slapped by {}", from.name), timestamp),
                notes,
            );
            notes.push(Notification::Sound(SoundCue::Slapped));
        } else if from == local {
            self.push_line(
                ChatLine::notice(format!("You just slapped {}", target), timestamp),
                notes,
            );
        } else if self.options.slap_policy == SlapPolicy::Announce {
            self.push_line(
                ChatLine::notice(format!("{} slapped {}", from.name, target), timestamp),
                notes,
            );
        }
    }

    fn push_line(&self, line: ChatLine, notes: &mut Vec<Notification>) {
        self.state.lock().history.push(line.clone());
        notes.push(Notification::Line(line));
    }
}

/// Whether `text` is one of the server's reserved control bodies
pub fn is_control_notice(text: &str) -> bool {
    text == YOU_HAVE_BEEN_MUTED_LOBBY || text == YOU_HAVE_BEEN_MUTED_GAME
}
