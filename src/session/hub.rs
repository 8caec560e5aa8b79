//! Routes inbound frames to sessions and fans results out.
//!
//! ## Message flow
//!
//! - connect: `room_info` then, if anything is buffered, `history_snapshot`,
//!   both to the new connection only
//! - `player_join`: binds the connection, broadcasts `player_joined`; once
//!   both seats are taken a waiting match starts as if `start_game` was sent
//! - `chat_message`: buffered, broadcast
//! - `start_game` / `game_action`: one engine call; a rejection goes back to
//!   the sender as `action_rejected`, an acceptance broadcasts each history
//!   entry as `game_action`, then `game_start` when the match just began,
//!   then `game_state_update`
//! - disconnect: detaches, broadcasts `player_left` for a bound player
//!
//! State frames are rendered per connection: cards a player reserved blind
//! are withheld from everyone but the connection bound to that player.
//!
//! Frames from a connection that has been evicted are refused.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::action::Action;
use crate::core::error::{ProtocolError, RoomError};
use crate::core::player::PlayerId;

use super::config::ServerConfig;
use super::match_session::{ActionReport, ConnectionId, Session};
use super::message::{ClientMessage, Frame, RoomView, ServerMessage};
use super::registry::{Registry, RoomId};

/// A connection's handle on its room.
pub struct Attachment {
    pub session: Arc<Session>,
    pub conn: ConnectionId,
    pub outbound: mpsc::Receiver<Frame>,
    /// Resolves when the session evicts this connection.
    pub evicted: oneshot::Receiver<()>,
}

/// Owns the room directory and server settings.
pub struct Hub {
    registry: Registry,
}

impl Hub {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { registry: Registry::new(config) }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        self.registry.config()
    }

    /// Attach a connection to a room and queue its catch-up frames.
    pub fn connect(&self, room: RoomId) -> Result<Attachment, RoomError> {
        let session = self
            .registry
            .get(room)
            .ok_or_else(|| RoomError::UnknownRoom(room.to_string()))?;
        let (conn, outbound, evicted) = session.attach(self.config().queue_capacity);

        let info = RoomView {
            id: room,
            name: session.name().to_owned(),
            game_state: session.snapshot().masked_for(None),
        };
        session.send_to(conn, &ServerMessage::RoomInfo { data: info });
        let replay = session.replay();
        if !replay.chat.is_empty() || !replay.history.is_empty() {
            session.send_to(conn, &ServerMessage::HistorySnapshot { data: replay });
        }
        debug!(%room, %conn, "connection attached");
        Ok(Attachment { session, conn, outbound, evicted })
    }

    /// Handle one inbound text frame from `conn`.
    ///
    /// Protocol errors are returned for the caller to report; rule
    /// rejections are answered here.
    pub fn handle_frame(&self, session: &Session, conn: ConnectionId, text: &str) -> Result<(), ProtocolError> {
        if !session.is_attached(conn) {
            return Err(ProtocolError::Detached);
        }
        let message = ClientMessage::parse(text, self.config().max_frame_bytes)?;
        let claimed = message.claimed_player();

        match message {
            ClientMessage::PlayerJoin(_) => {
                let player = claimed.ok_or(ProtocolError::MissingPlayer)?;
                match session.bind_player(conn, player) {
                    Ok(player_name) => {
                        info!(room = %session.id(), %player, "player connected");
                        session.broadcast(&ServerMessage::PlayerJoined { player_id: player, player_name });
                        if let Some(report) = session.start_if_ready(player) {
                            Self::publish(session, report);
                        }
                    }
                    Err(err) => {
                        session.send_to(conn, &ServerMessage::error(err));
                    }
                }
            }
            ClientMessage::ChatMessage(chat) => {
                let player = Self::actor(session, conn, claimed)?;
                match session.append_chat(player, &chat.message) {
                    Ok(entry) => {
                        session.broadcast(&ServerMessage::ChatMessage(entry));
                    }
                    Err(err) => {
                        session.send_to(conn, &ServerMessage::error(err));
                    }
                }
            }
            ClientMessage::StartGame(_) => {
                let player = Self::actor(session, conn, claimed)?;
                Self::run(session, conn, player, &Action::StartGame);
            }
            ClientMessage::GameAction(envelope) => {
                let player = Self::actor(session, conn, claimed)?;
                let action = envelope.to_action()?;
                Self::run(session, conn, player, &action);
            }
        }
        Ok(())
    }

    /// Detach a connection and announce a bound player's departure.
    pub fn disconnect(&self, session: &Session, conn: ConnectionId) {
        let Some(player) = session.detach(conn) else {
            debug!(room = %session.id(), %conn, "anonymous connection closed");
            return;
        };
        let player_name = session.player_name(player).unwrap_or_default();
        info!(room = %session.id(), %player, "player disconnected");
        session.broadcast(&ServerMessage::PlayerLeft { player_id: player, player_name });
    }

    /// Evict expired rooms.
    pub fn sweep(&self, now: DateTime<Utc>) -> Vec<RoomId> {
        self.registry.sweep_expired(now)
    }

    /// The bound player acts; an unbound connection acts as whoever it claims.
    fn actor(
        session: &Session,
        conn: ConnectionId,
        claimed: Option<PlayerId>,
    ) -> Result<PlayerId, ProtocolError> {
        match (session.bound_player(conn), claimed) {
            (Some(bound), Some(claimed)) if bound != claimed => Err(ProtocolError::PlayerMismatch),
            (Some(bound), _) => Ok(bound),
            (None, Some(claimed)) => Ok(claimed),
            (None, None) => Err(ProtocolError::MissingPlayer),
        }
    }

    fn run(session: &Session, conn: ConnectionId, player: PlayerId, action: &Action) {
        match session.execute(player, action) {
            Ok(report) => Self::publish(session, report),
            Err(err) => {
                warn!(room = %session.id(), %player, action = action.kind(), %err, "action rejected");
                session.send_to(
                    conn,
                    &ServerMessage::ActionRejected { action_type: action.kind().to_owned(), message: err.to_string() },
                );
            }
        }
    }

    /// Broadcast an accepted action: history entries, `game_start` when the
    /// match just began, then the new state.
    fn publish(session: &Session, report: ActionReport) {
        for entry in report.history {
            session.broadcast(&ServerMessage::GameAction { action: entry });
        }
        let game_state = report.snapshot;
        if report.started {
            info!(room = %session.id(), "match started");
            session.broadcast_as(|viewer| ServerMessage::GameStart {
                game_state: game_state.masked_for(viewer),
            });
        }
        if game_state.winner.is_some() {
            info!(room = %session.id(), winner = ?game_state.winner, "match finished");
        }
        session.broadcast_as(|viewer| ServerMessage::GameStateUpdate {
            game_state: game_state.masked_for(viewer),
        });
    }
}
