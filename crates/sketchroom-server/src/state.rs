//! Shared relay state: the room registry and admission policy.

use crate::auth::{AuthError, JwtAuthorizer, OpenAccess, RoomAuthorizer};
use crate::config::Config;
use crate::room::{Joined, Room};
use dashmap::DashMap;
use sketchroom_core::{ClientMessage, Shape};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct AppState {
    rooms: DashMap<String, Room>,
    authorizer: Arc<dyn RoomAuthorizer>,
    channel_capacity: usize,
    room_idle_ttl: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let authorizer: Arc<dyn RoomAuthorizer> = match &config.jwt_secret {
            Some(secret) => Arc::new(JwtAuthorizer::new(secret)),
            None => {
                tracing::warn!("no JWT secret configured, rooms are open to everyone");
                Arc::new(OpenAccess)
            }
        };
        Self::with_authorizer(config, authorizer)
    }

    pub fn with_authorizer(config: &Config, authorizer: Arc<dyn RoomAuthorizer>) -> Self {
        Self {
            rooms: DashMap::new(),
            authorizer,
            channel_capacity: config.channel_capacity,
            room_idle_ttl: config.room_idle_ttl(),
        }
    }

    pub fn authorize(&self, room: &str, token: Option<&str>) -> Result<(), AuthError> {
        self.authorizer.authorize(room, token)
    }

    /// Get or create `room_id` and admit `peer_id` to it.
    pub fn join_room(&self, room_id: &str, peer_id: &str) -> Joined {
        let capacity = self.channel_capacity;
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                tracing::info!(room = %room_id, "room created");
                Room::new(room_id, capacity)
            })
            .join(peer_id)
    }

    pub fn leave_room(&self, room_id: &str, peer_id: &str) {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return;
        };
        room.leave(peer_id);
        let empty = room.is_empty();
        drop(room);

        if empty && self.room_idle_ttl.is_zero() {
            // A peer may have joined between the guard drop and here.
            if self.rooms.remove_if(room_id, |_, r| r.is_empty()).is_some() {
                tracing::info!(room = %room_id, "room closed");
            }
        }
    }

    pub fn handle_message(&self, room_id: &str, peer_id: &str, msg: ClientMessage) {
        match self.rooms.get_mut(room_id) {
            Some(mut room) => room.handle(peer_id, msg),
            None => tracing::warn!(room = %room_id, peer = %peer_id, "message for unknown room"),
        }
    }

    /// Drop rooms that have been empty longer than the idle TTL.
    pub fn sweep_idle_rooms(&self) -> usize {
        let now = Instant::now();
        let ttl = self.room_idle_ttl;
        let before = self.rooms.len();
        self.rooms.retain(|id, room| {
            let keep = !room.idle_longer_than(ttl, now);
            if !keep {
                tracing::info!(room = %id, "idle room evicted");
            }
            keep
        });
        before.saturating_sub(self.rooms.len())
    }

    /// `(rooms, peers)` currently tracked.
    pub fn stats(&self) -> (usize, usize) {
        let peers = self.rooms.iter().map(|r| r.peer_count()).sum();
        (self.rooms.len(), peers)
    }

    pub fn room_shapes(&self, room_id: &str) -> Option<Vec<Shape>> {
        self.rooms
            .get(room_id)
            .map(|r| r.whiteboard().shapes.to_vec())
    }
}

/// Periodically evict idle rooms until the runtime shuts down.
pub fn spawn_sweeper(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    let period = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = state.sweep_idle_rooms();
            if evicted > 0 {
                tracing::debug!(evicted, "idle sweep finished");
            }
        }
    })
}
