//! Session-layer configuration.

use std::time::Duration;

use chrono::Duration as Age;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;

/// Knobs for rooms, connections and broadcast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Outbound messages buffered per connection before it is evicted.
    pub queue_capacity: usize,
    /// A connection that sends nothing for this long is closed.
    pub idle_timeout: Duration,
    /// Interval between keepalive pings. Must be shorter than `idle_timeout`.
    pub keepalive_interval: Duration,
    /// Largest inbound text frame accepted, in bytes.
    pub max_frame_bytes: usize,
    /// Chat and history entries kept for replay.
    pub history_cap: usize,
    /// Rooms older than this are swept regardless of activity.
    pub room_max_age: Duration,
    /// Seats per room.
    pub room_capacity: usize,
    /// Rules for every match hosted by this server.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            idle_timeout: Duration::from_secs(60),
            keepalive_interval: Duration::from_secs(54),
            max_frame_bytes: 4096,
            history_cap: 1000,
            room_max_age: Duration::from_secs(24 * 60 * 60),
            room_capacity: 2,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Set the per-connection outbound queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the idle timeout and keepalive interval.
    #[must_use]
    pub fn with_timeouts(mut self, idle: Duration, keepalive: Duration) -> Self {
        self.idle_timeout = idle;
        self.keepalive_interval = keepalive;
        self
    }

    /// Set the inbound frame limit.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, bytes: usize) -> Self {
        self.max_frame_bytes = bytes;
        self
    }

    /// Set the replay log cap.
    #[must_use]
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    /// Set the room expiry age.
    #[must_use]
    pub fn with_room_max_age(mut self, age: Duration) -> Self {
        self.room_max_age = age;
        self
    }

    /// Set the rules configuration.
    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Room expiry age as a calendar duration.
    #[must_use]
    pub fn room_max_age_chrono(&self) -> Age {
        Age::from_std(self.room_max_age).unwrap_or_else(|_| Age::weeks(52 * 100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.max_frame_bytes, 4096);
        assert_eq!(config.room_capacity, 2);
        assert!(config.keepalive_interval < config.idle_timeout);
        assert_eq!(config.room_max_age_chrono(), Age::hours(24));
    }

    #[test]
    fn test_builders() {
        let config = ServerConfig::default()
            .with_queue_capacity(0)
            .with_timeouts(Duration::from_secs(5), Duration::from_secs(2))
            .with_history_cap(3);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
        assert_eq!(config.history_cap, 3);
    }
}
