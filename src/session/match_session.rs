//! One hosted match and its connections.
//!
//! ## Locking
//!
//! - `inner`: match state, version and replay log. Held for one whole
//!   engine call; the snapshot and history are built before release.
//! - `subscribers`: outbound queues by connection. Never held together with
//!   `inner` and never across an `.await`.
//!
//! ## Slow consumers
//!
//! Outbound queues are bounded. A send that finds a queue full (or closed)
//! evicts that subscriber: its queue is dropped and its eviction signal
//! fires, so the connection task stops reading at once and runs the normal
//! cleanup. The evicted connection's player binding is parked until that
//! cleanup detaches it, so the departure is still announced.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::action::Action;
use crate::core::error::{ActionError, RoomError};
use crate::core::event::GameEvent;
use crate::core::player::{Player, PlayerId};
use crate::core::rng::GameRng;
use crate::core::state::{MatchState, MatchStatus};
use crate::rules::{capture, DuelRules, MatchSnapshot, RulesEngine};

use super::config::ServerConfig;
use super::history::{describe, ChatEntry, HistoryEntry, ReplayLog};
use super::message::{Frame, ReplayView, ServerMessage};
use super::registry::RoomId;

/// Identifier of one attached connection within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// What an accepted action produced.
#[derive(Clone, Debug)]
pub struct ActionReport {
    pub events: Vec<GameEvent>,
    pub history: Vec<HistoryEntry>,
    pub snapshot: MatchSnapshot,
    /// The action moved the match from waiting to playing.
    pub started: bool,
}

struct Inner {
    state: MatchState,
    version: u64,
    log: ReplayLog,
}

struct Subscriber {
    tx: mpsc::Sender<Frame>,
    player: Option<PlayerId>,
    /// Dropped on eviction; the connection task holds the receiver.
    _evict: oneshot::Sender<()>,
}

#[derive(Default)]
struct Subscribers {
    live: FxHashMap<ConnectionId, Subscriber>,
    /// Evicted connections not yet detached, with their bound player.
    evicted: FxHashMap<ConnectionId, Option<PlayerId>>,
}

impl Subscribers {
    fn evict(&mut self, room: RoomId, conn: ConnectionId) {
        if let Some(sub) = self.live.remove(&conn) {
            warn!(%room, %conn, player = ?sub.player, "evicting slow or closed connection");
            self.evicted.insert(conn, sub.player);
        }
    }
}

/// A match plus everyone connected to it.
pub struct Session {
    id: RoomId,
    name: String,
    rules: DuelRules,
    capacity: usize,
    created_at: DateTime<Utc>,
    inner: Mutex<Inner>,
    subscribers: Mutex<Subscribers>,
    next_connection: AtomicU64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// A waiting match. Seeded from the game config when it carries a seed.
    #[must_use]
    pub fn new(id: RoomId, name: impl Into<String>, config: &ServerConfig) -> Self {
        let rng = config.game.seed.map_or_else(GameRng::from_entropy, GameRng::new);
        let state = MatchState::new(rng);
        Self {
            id,
            name: name.into(),
            rules: DuelRules::new(config.game.clone()),
            capacity: config.room_capacity,
            created_at: state.created_at,
            inner: Mutex::new(Inner { state, version: 0, log: ReplayLog::new(config.history_cap) }),
            subscribers: Mutex::new(Subscribers::default()),
            next_connection: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Seat a new player under `name`.
    pub fn seat(&self, name: &str, is_host: bool) -> Result<PlayerId, RoomError> {
        if name.trim().is_empty() {
            return Err(RoomError::EmptyPlayerName);
        }
        let mut inner = self.inner.lock();
        let state = &mut inner.state;
        if state.players.len() >= self.capacity || state.is_full() {
            return Err(RoomError::RoomFull(self.name.clone()));
        }
        if state.players.iter().any(|p| p.name == name) {
            return Err(RoomError::DuplicatePlayerName(name.to_owned()));
        }
        let id = PlayerId::random();
        state
            .seat_player(Player::new(id, name, is_host))
            .ok_or_else(|| RoomError::RoomFull(self.name.clone()))?;
        Ok(id)
    }

    /// Name of a seated player.
    #[must_use]
    pub fn player_name(&self, player: PlayerId) -> Option<String> {
        self.inner.lock().state.player_by_id(player).map(|p| p.name.clone())
    }

    /// Run one action through the rules engine.
    ///
    /// The whole engine call, the version bump, history description and
    /// snapshot happen under one lock, so concurrent submissions are applied
    /// one at a time and every report reflects exactly its own action.
    pub fn execute(&self, player: PlayerId, action: &Action) -> Result<ActionReport, ActionError> {
        let mut inner = self.inner.lock();
        self.apply(&mut inner, player, action)
    }

    /// Start the match on `player`'s behalf once both seats are taken.
    ///
    /// `None` when the match is not waiting or a seat is still open. The
    /// check and the start share one critical section, so concurrent joins
    /// start the match once.
    pub fn start_if_ready(&self, player: PlayerId) -> Option<ActionReport> {
        let mut inner = self.inner.lock();
        if inner.state.status != MatchStatus::Waiting || !inner.state.is_full() {
            return None;
        }
        match self.apply(&mut inner, player, &Action::StartGame) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(room = %self.id, %player, %err, "automatic start rejected");
                None
            }
        }
    }

    fn apply(&self, inner: &mut Inner, player: PlayerId, action: &Action) -> Result<ActionReport, ActionError> {
        let was_waiting = inner.state.status == MatchStatus::Waiting;
        let events = self.rules.apply_action(&mut inner.state, player, action)?;

        inner.version += 1;
        let history = describe(&inner.state, player, action.kind(), &events, Utc::now());
        for entry in &history {
            inner.log.push_history(entry.clone());
        }
        let snapshot = capture(&inner.state, inner.version);
        let started = was_waiting && inner.state.status != MatchStatus::Waiting;
        debug!(room = %self.id, %player, action = action.kind(), version = inner.version, "action applied");

        Ok(ActionReport { events, history, snapshot, started })
    }

    /// Current full view. Mask it with [`MatchSnapshot::masked_for`] before
    /// sending it to a client.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let inner = self.inner.lock();
        capture(&inner.state, inner.version)
    }

    /// Buffered chat and history, oldest first.
    #[must_use]
    pub fn replay(&self) -> ReplayView {
        let log = self.inner.lock().log.clone();
        ReplayView {
            chat: log.chat().iter().cloned().collect(),
            history: log.history().iter().cloned().collect(),
        }
    }

    /// Record a chat line from a seated player.
    pub fn append_chat(&self, player: PlayerId, message: &str) -> Result<ChatEntry, RoomError> {
        let mut inner = self.inner.lock();
        let player_name = inner
            .state
            .player_by_id(player)
            .map(|p| p.name.clone())
            .ok_or(RoomError::UnknownPlayer(player))?;
        let entry = ChatEntry {
            id: Uuid::new_v4(),
            player_id: player,
            player_name,
            message: message.to_owned(),
            timestamp: Utc::now(),
        };
        inner.log.push_chat(entry.clone());
        Ok(entry)
    }

    /// Register a connection with an outbound queue of `capacity` frames.
    ///
    /// The oneshot receiver resolves when the connection is evicted.
    pub fn attach(&self, capacity: usize) -> (ConnectionId, mpsc::Receiver<Frame>, oneshot::Receiver<()>) {
        let id = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (evict, evicted) = oneshot::channel();
        self.subscribers.lock().live.insert(id, Subscriber { tx, player: None, _evict: evict });
        (id, rx, evicted)
    }

    /// Whether `conn` is attached and not evicted.
    #[must_use]
    pub fn is_attached(&self, conn: ConnectionId) -> bool {
        self.subscribers.lock().live.contains_key(&conn)
    }

    /// Tie a connection to a seated player and mark them active.
    pub fn bind_player(&self, conn: ConnectionId, player: PlayerId) -> Result<String, RoomError> {
        let name = {
            let mut inner = self.inner.lock();
            let seat = inner.state.seat_of(player).ok_or(RoomError::UnknownPlayer(player))?;
            let seated = inner.state.player_mut(seat);
            seated.touch(Utc::now());
            seated.name.clone()
        };
        if let Some(sub) = self.subscribers.lock().live.get_mut(&conn) {
            sub.player = Some(player);
        }
        Ok(name)
    }

    /// Player bound to a connection, if any.
    #[must_use]
    pub fn bound_player(&self, conn: ConnectionId) -> Option<PlayerId> {
        self.subscribers.lock().live.get(&conn).and_then(|sub| sub.player)
    }

    /// Remove a connection, live or evicted. Returns the player it was
    /// bound to.
    pub fn detach(&self, conn: ConnectionId) -> Option<PlayerId> {
        let mut subscribers = self.subscribers.lock();
        match subscribers.live.remove(&conn) {
            Some(sub) => sub.player,
            None => subscribers.evicted.remove(&conn).flatten(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().live.len()
    }

    /// Queue a message to every connection. Returns how many accepted it.
    pub fn broadcast(&self, message: &ServerMessage) -> usize {
        let Some(frame) = self.encode(message) else {
            return 0;
        };
        let mut subscribers = self.subscribers.lock();
        let failed: Vec<ConnectionId> = subscribers
            .live
            .iter()
            .filter(|(_, sub)| sub.tx.try_send(frame.clone()).is_err())
            .map(|(&id, _)| id)
            .collect();
        for id in failed {
            subscribers.evict(self.id, id);
        }
        subscribers.live.len()
    }

    /// Queue a message rendered for each connection's bound player.
    /// Rendered once per distinct viewer. Returns how many accepted it.
    pub fn broadcast_as(&self, render: impl Fn(Option<PlayerId>) -> ServerMessage) -> usize {
        let mut subscribers = self.subscribers.lock();
        let mut frames: FxHashMap<Option<PlayerId>, Option<Frame>> = FxHashMap::default();
        let mut failed = Vec::new();
        for (&id, sub) in &subscribers.live {
            let frame = frames.entry(sub.player).or_insert_with(|| self.encode(&render(sub.player)));
            if let Some(frame) = frame {
                if sub.tx.try_send(frame.clone()).is_err() {
                    failed.push(id);
                }
            }
        }
        for id in failed {
            subscribers.evict(self.id, id);
        }
        subscribers.live.len()
    }

    /// Queue a message to one connection. False if it was dropped.
    pub fn send_to(&self, conn: ConnectionId, message: &ServerMessage) -> bool {
        let Some(frame) = self.encode(message) else {
            return false;
        };
        let mut subscribers = self.subscribers.lock();
        let Some(sub) = subscribers.live.get(&conn) else {
            return false;
        };
        if sub.tx.try_send(frame).is_ok() {
            return true;
        }
        subscribers.evict(self.id, conn);
        false
    }

    fn encode(&self, message: &ServerMessage) -> Option<Frame> {
        match message.encode() {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!(room = %self.id, %err, "failed to encode message");
                None
            }
        }
    }
}
