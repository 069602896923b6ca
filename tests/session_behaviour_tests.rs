//! Integration tests for chat lines, filters, slaps and status handling

mod common;

use std::sync::Arc;

use common::{node, room, room_with, transport, wait_until, Recorder, StaleStatusTransport};
use lobby_chat::filters::{IgnoreList, WindowFloodControl};
use lobby_chat::registry::RoomKind;
use lobby_chat::session::{
    ChatListener, ChatSession, LocalTransport, SessionOptions, SlapPolicy, MAX_HISTORY,
    MESSAGE_LIMIT_EXCEEDED,
};
use lobby_chat::types::{LineKind, SoundCue};

async fn join(
    room: &Arc<lobby_chat::ChatRoom>,
    name: &str,
    options: SessionOptions,
) -> (ChatSession<LocalTransport>, Arc<Recorder>) {
    let recorder = Recorder::new();
    let session = ChatSession::connect_with_listeners(
        transport(room, name),
        options,
        vec![recorder.clone() as Arc<dyn ChatListener>],
    )
    .await
    .unwrap();
    (session, recorder)
}

fn unlimited() -> SessionOptions {
    SessionOptions {
        flood: Arc::new(WindowFloodControl::with_limits(60_000, u32::MAX)),
        ..SessionOptions::default()
    }
}

fn has_line(recorder: &Recorder, text: &str) -> bool {
    recorder.texts().iter().any(|line| line == text)
}

#[tokio::test]
async fn test_message_reaches_every_member() {
    let room = room();
    let (a, _) = join(&room, "A", SessionOptions::default()).await;
    let (_b, b_rec) = join(&room, "B", SessionOptions::default()).await;

    a.send_message("hello lobby").await.unwrap();

    assert!(wait_until(|| has_line(&b_rec, "hello lobby")).await);
    let line = b_rec
        .lines
        .lock()
        .iter()
        .find(|line| line.text == "hello lobby")
        .cloned()
        .unwrap();
    assert_eq!(line.sender.as_deref(), Some("A"));
    assert_eq!(line.kind, LineKind::Message);
    assert!(b_rec.sounds.lock().contains(&SoundCue::MessageReceived));
    assert!(wait_until(|| a.history().iter().any(|l| l.text == "hello lobby")).await);
}

#[tokio::test]
async fn test_me_prefix_sends_emphatic_line() {
    let room = room();
    let (a, a_rec) = join(&room, "A", SessionOptions::default()).await;

    a.submit("/me waves").await.unwrap();

    assert!(wait_until(|| has_line(&a_rec, "waves")).await);
    let line = a_rec.lines.lock().last().cloned().unwrap();
    assert_eq!(line.kind, LineKind::Emphatic);
}

#[tokio::test]
async fn test_ignored_sender_hidden_only_for_ignoring_session() {
    let room = room();
    let ignore = Arc::new(IgnoreList::in_memory());
    ignore.add("spammer").unwrap();

    let (a, a_rec) = join(
        &room,
        "A",
        SessionOptions {
            ignore: ignore.clone(),
            ..SessionOptions::default()
        },
    )
    .await;
    let (_b, b_rec) = join(&room, "B", SessionOptions::default()).await;
    let (_c, c_rec) = join(&room, "C", SessionOptions::default()).await;
    let (spammer, _) = join(&room, "spammer", SessionOptions::default()).await;

    spammer.send_message("buy gold").await.unwrap();
    spammer.slap("A").await.unwrap();
    // Lines are delivered in order, so the marker arrives last
    a.send_message("marker").await.unwrap();

    assert!(wait_until(|| has_line(&a_rec, "marker")).await);
    assert!(!has_line(&a_rec, "buy gold"));
    assert!(!has_line(&a_rec, "You were slapped by spammer"));
    assert!(!a.history().iter().any(|line| line.text == "buy gold"));

    assert!(wait_until(|| has_line(&b_rec, "buy gold")).await);
    assert!(wait_until(|| has_line(&c_rec, "buy gold")).await);
}

#[tokio::test]
async fn test_slap_as_seen_by_each_party() {
    let room = room();
    let (a, a_rec) = join(&room, "A", SessionOptions::default()).await;
    let (_b, b_rec) = join(&room, "B", SessionOptions::default()).await;
    let (_c, c_rec) = join(&room, "C", SessionOptions::default()).await;
    let (_d, d_rec) = join(
        &room,
        "D",
        SessionOptions {
            slap_policy: SlapPolicy::Announce,
            ..SessionOptions::default()
        },
    )
    .await;

    a.slap("B").await.unwrap();
    a.send_message("marker").await.unwrap();

    assert!(wait_until(|| has_line(&a_rec, "You just slapped B")).await);
    assert!(wait_until(|| has_line(&b_rec, "You were slapped by A")).await);
    assert!(b_rec.sounds.lock().contains(&SoundCue::Slapped));
    assert!(!a_rec.sounds.lock().contains(&SoundCue::Slapped));

    // Silent third party
    assert!(wait_until(|| has_line(&c_rec, "marker")).await);
    assert!(!c_rec.texts().iter().any(|line| line.contains("slapped")));

    // Announcing third party
    assert!(wait_until(|| has_line(&d_rec, "A slapped B")).await);
}

#[tokio::test]
async fn test_history_keeps_last_thousand_lines() {
    let room = room_with(RoomKind::Lobby, &[], 4096);
    let (a, _) = join(&room, "A", unlimited()).await;
    let (b, _) = join(&room, "B", unlimited()).await;

    for i in 0..1100 {
        b.send_message(&format!("msg {}", i)).await.unwrap();
    }

    assert!(wait_until(|| a
        .history()
        .last()
        .map_or(false, |line| line.text == "msg 1099"))
    .await);
    let history = a.history();
    assert_eq!(history.len(), MAX_HISTORY);
    assert_eq!(history[0].text, "msg 100");
}

#[tokio::test]
async fn test_own_flood_reported_locally() {
    let room = room();
    let (a, a_rec) = join(
        &room,
        "A",
        SessionOptions {
            flood: Arc::new(WindowFloodControl::with_limits(60_000, 2)),
            ..SessionOptions::default()
        },
    )
    .await;
    let (_b, b_rec) = join(
        &room,
        "B",
        SessionOptions {
            flood: Arc::new(WindowFloodControl::with_limits(60_000, 2)),
            ..SessionOptions::default()
        },
    )
    .await;

    for text in ["one", "two", "three"] {
        a.send_message(text).await.unwrap();
    }

    assert!(wait_until(|| has_line(&a_rec, MESSAGE_LIMIT_EXCEEDED)).await);
    assert!(!has_line(&a_rec, "three"));
    assert!(wait_until(|| has_line(&b_rec, "two")).await);
    assert!(!has_line(&b_rec, "three"));
    assert!(!has_line(&b_rec, MESSAGE_LIMIT_EXCEEDED));
}

#[tokio::test]
async fn test_muted_member_sees_system_notice() {
    let room = room_with(RoomKind::Lobby, &[], 64);
    let (a, a_rec) = join(&room, "A", SessionOptions::default()).await;
    let (b, b_rec) = join(&room, "B", SessionOptions::default()).await;
    room.mute("A", None);

    a.send_message("let me talk").await.unwrap();
    b.send_message("marker").await.unwrap();

    let notice = "YOUR LOBBY CHATTING HAS BEEN TEMPORARILY 'MUTED' BY THE ADMINS, TRY AGAIN LATER";
    assert!(wait_until(|| has_line(&a_rec, notice)).await);
    let line = a_rec
        .lines
        .lock()
        .iter()
        .find(|line| line.text == notice)
        .cloned()
        .unwrap();
    assert_eq!(line.kind, LineKind::Notice);
    assert_eq!(line.sender, None);

    assert!(wait_until(|| has_line(&b_rec, "marker")).await);
    assert!(!has_line(&b_rec, "let me talk"));
    assert!(!b_rec.texts().iter().any(|text| text.contains("MUTED")));
}

#[tokio::test]
async fn test_game_room_uses_host_notice() {
    let room = room_with(RoomKind::Game, &[], 64);
    let (a, a_rec) = join(&room, "A (2)", SessionOptions::default()).await;
    room.mute("A", None);

    a.send_message("hello").await.unwrap();

    assert!(wait_until(|| has_line(
        &a_rec,
        "YOUR CHATTING IN THIS GAME HAS BEEN 'MUTED' BY THE HOST"
    ))
    .await);
}

#[tokio::test]
async fn test_statuses_broadcast_and_seeded() {
    let room = room();
    let (a, _) = join(&room, "A", SessionOptions::default()).await;
    let (b, b_rec) = join(&room, "B", SessionOptions::default()).await;

    a.set_status("hosting a game").await.unwrap();

    assert!(wait_until(|| b.statuses().get("A").map(String::as_str) == Some("hosting a game")).await);
    assert!(b_rec
        .statuses
        .lock()
        .contains(&("A".to_string(), "hosting a game".to_string())));

    // A late joiner learns the status from the join-time fetch
    let (c, _) = join(&room, "C", SessionOptions::default()).await;
    assert_eq!(c.statuses().get("A").map(String::as_str), Some("hosting a game"));

    a.shutdown().await.unwrap();
    assert!(wait_until(|| !b.statuses().contains_key("A")).await);
}

#[tokio::test]
async fn test_status_fetch_does_not_overwrite_newer_changes() {
    let room = room();
    let (a, _) = join(&room, "A", SessionOptions::default()).await;
    let (b, _) = join(&room, "B", SessionOptions::default()).await;
    a.set_status("old").await.unwrap();
    b.set_status("away").await.unwrap();

    let during_fetch = {
        let room = room.clone();
        move || {
            room.set_status(&node("A"), "new").unwrap();
            room.leave(&node("B"));
        }
    };
    let c = ChatSession::connect(
        StaleStatusTransport::new(transport(&room, "C"), during_fetch),
        SessionOptions::default(),
    )
    .await
    .unwrap();

    let statuses = c.statuses();
    assert_eq!(statuses.get("A").map(String::as_str), Some("new"));
    // B left before the fetched map was seeded
    assert!(!statuses.contains_key("B"));
}

#[tokio::test]
async fn test_join_and_leave_announcements() {
    let room = room();
    let (_a, a_rec) = join(&room, "A", SessionOptions::default()).await;
    let (b, _) = join(&room, "B", SessionOptions::default()).await;

    assert!(wait_until(|| has_line(&a_rec, "B has joined")).await);
    assert!(a_rec.sounds.lock().contains(&SoundCue::MemberJoined));

    b.shutdown().await.unwrap();
    assert!(wait_until(|| has_line(&a_rec, "B has left")).await);
    assert!(a_rec.sounds.lock().contains(&SoundCue::MemberLeft));
}

#[tokio::test]
async fn test_late_joiner_sees_no_earlier_messages() {
    let room = room();
    let (a, _) = join(&room, "A", SessionOptions::default()).await;
    a.send_message("before you came").await.unwrap();

    let (b, b_rec) = join(&room, "B", SessionOptions::default()).await;
    a.send_message("after you came").await.unwrap();

    assert!(wait_until(|| has_line(&b_rec, "after you came")).await);
    assert!(!b.history().iter().any(|line| line.text == "before you came"));
    assert_eq!(node("B"), *b.local_node());
}
