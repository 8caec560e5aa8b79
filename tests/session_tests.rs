//! Session layer integration tests.
//!
//! Connections are driven through `serve_connection` over in-memory channels,
//! with tokio's clock paused so idle and keepalive timers run instantly.

use std::sync::Arc;
use std::time::Duration;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use gem_duel::core::{GameConfig, PlayerId, RoomError};
use gem_duel::session::{serve_connection, Disconnect, Frame, Hub, RoomId, ServerConfig, ServerMessage};

struct Client {
    tx: UnboundedSender<String>,
    rx: UnboundedReceiver<Frame>,
    task: JoinHandle<Result<Disconnect, RoomError>>,
}

impl Client {
    fn connect(hub: &Arc<Hub>, room: RoomId) -> Self {
        let (tx, inbound) = unbounded::<String>();
        let (outbound, rx) = unbounded::<Frame>();
        let task = tokio::spawn(serve_connection(Arc::clone(hub), room, inbound, outbound));
        Self { tx, rx, task }
    }

    fn send(&self, frame: String) {
        self.tx.unbounded_send(frame).unwrap();
    }

    async fn next(&mut self) -> Value {
        let frame = self.rx.next().await.expect("connection closed");
        serde_json::from_str(&frame).unwrap()
    }

    /// Skip frames until one of type `kind` arrives.
    async fn next_of(&mut self, kind: &str) -> Value {
        loop {
            let frame = self.next().await;
            if frame["type"] == kind {
                return frame;
            }
        }
    }
}

fn hub() -> Arc<Hub> {
    let config = ServerConfig::default().with_game(GameConfig::default().with_seed(11));
    Arc::new(Hub::new(config))
}

fn join_frame(player: PlayerId) -> String {
    format!(r#"{{"type":"player_join","playerId":"{}"}}"#, player.0)
}

fn action_frame(player: PlayerId, action_type: &str, data: &str) -> String {
    format!(r#"{{"type":"game_action","playerId":"{}","actionType":"{action_type}","data":{data}}}"#, player.0)
}

// =============================================================================
// Connection Lifecycle Tests
// =============================================================================

/// The first frame on a new connection describes the room.
#[tokio::test(start_paused = true)]
async fn test_connect_receives_room_info() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let mut client = Client::connect(&hub, host.room);

    let info = client.next().await;
    assert_eq!(info["type"], "room_info");
    assert_eq!(info["data"]["name"], "den");
    assert_eq!(info["data"]["gameState"]["status"], "waiting");
    assert_eq!(info["data"]["gameState"]["players"].as_array().unwrap().len(), 1);
}

/// Connecting to a room that does not exist fails without serving.
#[tokio::test(start_paused = true)]
async fn test_connect_unknown_room() {
    let hub = hub();
    let client = Client::connect(&hub, RoomId::random());
    assert!(matches!(client.task.await.unwrap(), Err(RoomError::UnknownRoom(_))));
}

/// A silent client is pinged, then dropped at the idle timeout.
#[tokio::test(start_paused = true)]
async fn test_idle_client_is_pinged_then_dropped() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let mut client = Client::connect(&hub, host.room);

    assert_eq!(client.next().await["type"], "room_info");
    assert_eq!(client.next().await["type"], "ping");
    assert_eq!(client.task.await.unwrap(), Ok(Disconnect::IdleTimeout));
    assert_eq!(host.session.subscriber_count(), 0);
}

/// Inbound traffic keeps the connection alive past the idle timeout.
#[tokio::test(start_paused = true)]
async fn test_activity_resets_idle_timer() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let mut client = Client::connect(&hub, host.room);
    client.next().await;

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(40)).await;
        client.send(join_frame(host.player));
        client.next_of("player_joined").await;
    }
    assert!(!client.task.is_finished());

    drop(client.tx);
    assert_eq!(client.task.await.unwrap(), Ok(Disconnect::Closed));
}

// =============================================================================
// Protocol Tests
// =============================================================================

/// Malformed frames get an error back and the connection stays open.
#[tokio::test(start_paused = true)]
async fn test_malformed_frame_reports_error() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let mut client = Client::connect(&hub, host.room);
    client.next().await;

    client.send("not json".to_owned());
    assert_eq!(client.next().await["type"], "error");

    client.send(action_frame(host.player, "castSpell", "{}"));
    assert_eq!(client.next().await["type"], "error");

    client.send(join_frame(host.player));
    assert_eq!(client.next().await["type"], "player_joined");
}

/// A rejected action is answered to the sender with the action type.
#[tokio::test(start_paused = true)]
async fn test_rejected_action_reply() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let mut client = Client::connect(&hub, host.room);
    client.next().await;

    client.send(format!(r#"{{"type":"start_game","playerId":"{}"}}"#, host.player.0));
    let reply = client.next().await;
    assert_eq!(reply["type"], "action_rejected");
    assert_eq!(reply["actionType"], "start_game");
}

// =============================================================================
// Full Match Flow Tests
// =============================================================================

/// Two clients chat, start by joining, play a move, and see each other leave.
#[tokio::test(start_paused = true)]
async fn test_two_client_flow() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let guest = hub.registry().join("den", "bo").unwrap();

    let mut a = Client::connect(&hub, host.room);
    assert_eq!(a.next().await["type"], "room_info");
    a.send(join_frame(host.player));
    let joined = a.next_of("player_joined").await;
    assert_eq!(joined["playerName"], "ann");

    a.send(r#"{"type":"chat_message","message":"hello"}"#.to_owned());
    let chat = a.next_of("chat_message").await;
    assert_eq!(chat["message"], "hello");
    assert_eq!(chat["playerName"], "ann");

    // late joiner gets the buffered chat
    let mut b = Client::connect(&hub, guest.room);
    assert_eq!(b.next().await["type"], "room_info");
    let replay = b.next().await;
    assert_eq!(replay["type"], "history_snapshot");
    assert_eq!(replay["data"]["chat"][0]["message"], "hello");

    // the second seat joining starts the match
    b.send(join_frame(guest.player));
    assert_eq!(a.next_of("player_joined").await["playerName"], "bo");
    assert_eq!(b.next_of("player_joined").await["playerName"], "bo");

    let start = b.next_of("game_start").await;
    assert_eq!(start["gameState"]["status"], "playing");
    let update = b.next_of("game_state_update").await;
    let first = update["gameState"]["currentPlayer"].as_str().unwrap().to_owned();
    a.next_of("game_state_update").await;

    // whoever moves first takes the center token
    let (mover, mover_id, watcher) = if first == host.player.0.to_string() {
        (&mut a, host.player, &mut b)
    } else {
        (&mut b, guest.player, &mut a)
    };
    mover.send(action_frame(mover_id, "takeGems", r#"{"positions":[{"x":2,"y":2}]}"#));
    let entry = watcher.next_of("game_action").await;
    assert_eq!(entry["action"]["actionType"], "takeGems");
    let update = watcher.next_of("game_state_update").await;
    assert!(update["gameState"]["board"]["cells"][2][2].is_null());
    assert_eq!(update["gameState"]["flags"]["mainActionTaken"], true);

    drop(b.tx);
    assert_eq!(b.task.await.unwrap(), Ok(Disconnect::Closed));
    let left = a.next_of("player_left").await;
    assert_eq!(left["playerName"], "bo");
}

/// A client bound to one seat cannot act as the other.
#[tokio::test(start_paused = true)]
async fn test_bound_client_cannot_impersonate() {
    let hub = hub();
    let host = hub.registry().create("den", "ann").unwrap();
    let guest = hub.registry().join("den", "bo").unwrap();
    let mut a = Client::connect(&hub, host.room);
    a.next().await;

    a.send(join_frame(host.player));
    a.next_of("player_joined").await;
    let before = host.session.snapshot();
    assert_eq!(before.status, gem_duel::MatchStatus::Playing);

    a.send(action_frame(guest.player, "takeGems", r#"{"positions":[{"x":2,"y":2}]}"#));
    a.next_of("error").await;
    let after = host.session.snapshot();
    assert_eq!(after.version, before.version);
    assert!(!after.flags.main_action_taken);
}

// =============================================================================
// Backpressure Tests
// =============================================================================

/// A client whose sink stops accepting frames is cut off, its seat is
/// released to the room, and nothing it sent afterwards is executed.
#[tokio::test(start_paused = true)]
async fn test_slow_consumer_is_disconnected() {
    let config = ServerConfig::default()
        .with_game(GameConfig::default().with_seed(11))
        .with_queue_capacity(8);
    let hub = Arc::new(Hub::new(config));
    let host = hub.registry().create("den", "ann").unwrap();
    let guest = hub.registry().join("den", "bo").unwrap();

    let mut observer = Client::connect(&hub, guest.room);
    observer.next().await;
    observer.send(join_frame(guest.player));
    observer.next_of("player_joined").await;

    // a zero-buffer sink that is never read accepts one frame, then stalls
    let (stalled_tx, inbound) = unbounded::<String>();
    let (outbound, _never_read) = futures::channel::mpsc::channel::<Frame>(0);
    let stalled = tokio::spawn(serve_connection(Arc::clone(&hub), host.room, inbound, outbound));
    stalled_tx.unbounded_send(join_frame(host.player)).unwrap();
    observer.next_of("game_start").await;

    for _ in 0..32 {
        host.session.broadcast(&ServerMessage::Ping);
        tokio::task::yield_now().await;
    }

    let reason = tokio::time::timeout(Duration::from_secs(1), stalled).await;
    assert_eq!(reason.unwrap().unwrap(), Ok(Disconnect::Evicted));
    assert_eq!(host.session.subscriber_count(), 1);
    let left = observer.next_of("player_left").await;
    assert_eq!(left["playerName"], "ann");

    let version = host.session.snapshot().version;
    let _ = stalled_tx.unbounded_send(action_frame(host.player, "takeGems", r#"{"positions":[{"x":2,"y":2}]}"#));
    tokio::task::yield_now().await;
    assert_eq!(host.session.snapshot().version, version);
}
