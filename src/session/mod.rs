//! Hosting matches for connected clients.
//!
//! ## Modules
//!
//! - `config`: server settings
//! - `message`: inbound envelopes and outbound frames
//! - `history`: chat and action history for replay
//! - `match_session`: one match behind its lock, plus its subscribers
//! - `registry`: the room directory
//! - `hub`: frame routing and fan-out
//! - `connection`: the per-connection read/write task

pub mod config;
pub mod connection;
pub mod history;
pub mod hub;
pub mod match_session;
pub mod message;
pub mod registry;

pub use config::ServerConfig;
pub use connection::{serve_connection, Disconnect};
pub use history::{describe, ChatEntry, HistoryEntry, ReplayLog};
pub use hub::{Attachment, Hub};
pub use match_session::{ActionReport, ConnectionId, Session};
pub use message::{ActionEnvelope, ClientMessage, Frame, ReplayView, RoomView, ServerMessage};
pub use registry::{JoinTicket, Registry, RoomId};
