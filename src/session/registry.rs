//! Room directory.
//!
//! Rooms are looked up by id for connections and by name for joins. The
//! registry is constructed explicitly and shared by reference; there is no
//! process-wide instance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::error::RoomError;
use crate::core::player::PlayerId;

use super::config::ServerConfig;
use super::match_session::Session;

/// Room identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// Fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of creating or joining a room.
#[derive(Clone, Debug)]
pub struct JoinTicket {
    pub room: RoomId,
    pub player: PlayerId,
    pub session: Arc<Session>,
}

#[derive(Default)]
struct Rooms {
    by_id: FxHashMap<RoomId, Arc<Session>>,
    by_name: FxHashMap<String, RoomId>,
}

/// Every hosted room.
pub struct Registry {
    config: ServerConfig,
    rooms: RwLock<Rooms>,
}

impl Registry {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config, rooms: RwLock::new(Rooms::default()) }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open a room and seat its host.
    pub fn create(&self, room_name: &str, player_name: &str) -> Result<JoinTicket, RoomError> {
        if room_name.trim().is_empty() {
            return Err(RoomError::EmptyRoomName);
        }
        if player_name.trim().is_empty() {
            return Err(RoomError::EmptyPlayerName);
        }

        let mut rooms = self.rooms.write();
        if rooms.by_name.contains_key(room_name) {
            return Err(RoomError::DuplicateRoom(room_name.to_owned()));
        }
        let id = RoomId::random();
        let session = Arc::new(Session::new(id, room_name, &self.config));
        let player = session.seat(player_name, true)?;
        rooms.by_name.insert(room_name.to_owned(), id);
        rooms.by_id.insert(id, Arc::clone(&session));

        info!(room = %id, name = room_name, %player, "room created");
        Ok(JoinTicket { room: id, player, session })
    }

    /// Take the free seat in an existing room.
    pub fn join(&self, room_name: &str, player_name: &str) -> Result<JoinTicket, RoomError> {
        let session = self
            .get_by_name(room_name)
            .ok_or_else(|| RoomError::UnknownRoom(room_name.to_owned()))?;
        let player = session.seat(player_name, false)?;

        info!(room = %session.id(), %player, "player joined");
        Ok(JoinTicket { room: session.id(), player, session })
    }

    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<Arc<Session>> {
        self.rooms.read().by_id.get(&id).cloned()
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Session>> {
        let rooms = self.rooms.read();
        rooms.by_name.get(name).and_then(|id| rooms.by_id.get(id)).cloned()
    }

    /// Drop a room. Connections already holding it keep their `Arc`.
    pub fn remove(&self, id: RoomId) -> Option<Arc<Session>> {
        let mut rooms = self.rooms.write();
        let session = rooms.by_id.remove(&id)?;
        rooms.by_name.remove(session.name());
        Some(session)
    }

    /// Evict every room older than the configured age, active or not.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<RoomId> {
        let max_age = self.config.room_max_age_chrono();
        let mut rooms = self.rooms.write();
        let expired: Vec<RoomId> = rooms
            .by_id
            .values()
            .filter(|session| now - session.created_at() > max_age)
            .map(|session| session.id())
            .collect();
        for id in &expired {
            if let Some(session) = rooms.by_id.remove(id) {
                rooms.by_name.remove(session.name());
                info!(room = %id, "room expired");
            }
        }
        expired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.read().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_and_join() {
        let registry = Registry::new(ServerConfig::default());
        let host = registry.create("den", "ann").unwrap();
        assert_eq!(registry.create("den", "bo").unwrap_err(), RoomError::DuplicateRoom("den".into()));

        let guest = registry.join("den", "bo").unwrap();
        assert_eq!(guest.room, host.room);
        assert_ne!(guest.player, host.player);
        assert_eq!(registry.join("den", "cy").unwrap_err(), RoomError::RoomFull("den".into()));
        assert_eq!(registry.join("attic", "cy").unwrap_err(), RoomError::UnknownRoom("attic".into()));
        assert!(registry.get(host.room).is_some());
    }

    #[test]
    fn test_join_rejects_duplicate_name() {
        let registry = Registry::new(ServerConfig::default());
        registry.create("den", "ann").unwrap();
        assert_eq!(
            registry.join("den", "ann").unwrap_err(),
            RoomError::DuplicatePlayerName("ann".into())
        );
    }

    #[test]
    fn test_empty_names() {
        let registry = Registry::new(ServerConfig::default());
        assert_eq!(registry.create("", "ann").unwrap_err(), RoomError::EmptyRoomName);
        assert_eq!(registry.create("den", "").unwrap_err(), RoomError::EmptyPlayerName);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_evicts_old_rooms_only() {
        let registry = Registry::new(ServerConfig::default());
        let ticket = registry.create("den", "ann").unwrap();
        registry.create("attic", "bo").unwrap();

        assert!(registry.sweep_expired(Utc::now()).is_empty());
        let later = ticket.session.created_at() + Duration::hours(25);
        let evicted = registry.sweep_expired(later);

        assert_eq!(evicted.len(), 2);
        assert!(registry.is_empty());
        assert!(registry.get_by_name("den").is_none());
    }
}
