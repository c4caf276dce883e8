//! Per-room relay state.
//!
//! A [`Room`] holds the authoritative whiteboard for one room id, the
//! presence roster and the broadcast channel its peers listen on. Every
//! mutation is applied and queued for broadcast while the caller holds the
//! room's map guard, so all peers observe the same order.

use kurbo::Point;
use sketchroom_core::presence::random_peer_color;
use sketchroom_core::{
    ClientMessage, History, HistorySnapshot, PeerId, PresencePatch, PresenceRecord,
    PresenceTracker, ServerMessage, ShapeStore,
};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// A broadcast frame tagged with the peer it came from.
pub type RoomMessage = (PeerId, ServerMessage);

/// Shapes and shared history of one room.
#[derive(Debug, Default)]
pub struct Whiteboard {
    pub shapes: ShapeStore,
    pub history: History,
}

/// What a newly admitted peer needs.
pub struct Joined {
    pub rx: broadcast::Receiver<RoomMessage>,
    /// `initial-state`, sent to the joiner only.
    pub initial_state: ServerMessage,
    /// `roster-update` with everyone except the joiner.
    pub roster: ServerMessage,
    pub peer: PresenceRecord,
}

pub struct Room {
    id: String,
    whiteboard: Whiteboard,
    peers: PresenceTracker,
    tx: broadcast::Sender<RoomMessage>,
    emptied_at: Option<Instant>,
}

impl Room {
    pub fn new(id: impl Into<String>, channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            id: id.into(),
            whiteboard: Whiteboard::default(),
            peers: PresenceTracker::new(),
            tx,
            emptied_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn whiteboard(&self) -> &Whiteboard {
        &self.whiteboard
    }

    pub fn peers(&self) -> &PresenceTracker {
        &self.peers
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Admit a peer: snapshot the room for it, then announce it to the rest.
    pub fn join(&mut self, peer_id: &str) -> Joined {
        let snapshot = self.whiteboard.history.snapshot();
        let initial_state = ServerMessage::InitialState {
            room: self.id.clone(),
            shapes: self.whiteboard.shapes.to_vec(),
            log: snapshot.log,
            cursor: snapshot.cursor,
        };
        let roster = ServerMessage::RosterUpdate {
            peers: self.peers.roster().to_vec(),
        };

        let rx = self.tx.subscribe();
        let peer = PresenceRecord::new(peer_id, random_peer_color());
        self.peers.insert(peer.clone());
        self.emptied_at = None;
        self.broadcast(peer_id, ServerMessage::PeerJoined { peer: peer.clone() });

        Joined {
            rx,
            initial_state,
            roster,
            peer,
        }
    }

    /// Drop a peer's presence. Its shapes stay.
    pub fn leave(&mut self, peer_id: &str) -> bool {
        if self.peers.remove(peer_id).is_none() {
            return false;
        }
        self.broadcast(
            peer_id,
            ServerMessage::PeerLeft {
                peer_id: peer_id.to_string(),
            },
        );
        if self.peers.is_empty() {
            self.emptied_at = Some(Instant::now());
        }
        true
    }

    /// Apply a client frame to the room and relay it to the other peers.
    ///
    /// Concurrent updates to the same shape are not reconciled: whichever
    /// arrives last overwrites.
    pub fn handle(&mut self, from: &str, msg: ClientMessage) {
        match &msg {
            ClientMessage::ShapeMutation { mutation } => {
                if !self.whiteboard.shapes.apply(mutation) {
                    tracing::debug!(room = %self.id, peer = %from, "mutation for a missing shape");
                }
            }
            ClientMessage::DrawingPreview {
                is_drawing,
                drawing,
            } => {
                self.peers
                    .upsert(from, PresencePatch::drawing(*is_drawing, drawing.clone()));
            }
            ClientMessage::CursorMove { x, y } => {
                self.peers.upsert(from, PresencePatch::cursor(Point::new(*x, *y)));
            }
            ClientMessage::ToolChange { tool } => {
                self.peers.upsert(from, PresencePatch::tool(*tool));
            }
            ClientMessage::HistorySync { log, cursor } => {
                self.whiteboard.history.replace(HistorySnapshot {
                    log: log.clone(),
                    cursor: *cursor,
                });
            }
        }
        self.broadcast(from, msg.into_relayed(from));
    }

    /// Whether the room has had no peers for at least `ttl`.
    pub fn idle_longer_than(&self, ttl: Duration, now: Instant) -> bool {
        self.emptied_at
            .is_some_and(|at| now.saturating_duration_since(at) >= ttl)
    }

    fn broadcast(&self, from: &str, msg: ServerMessage) {
        // No receivers is fine: the room may be empty.
        let _ = self.tx.send((from.to_string(), msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchroom_core::shapes::{Rectangle, ShapeStyle};
    use sketchroom_core::{Shape, ShapeMutation, ToolKind};

    fn rect(x: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(x, x), Point::new(x + 0.1, x + 0.1)))
    }

    fn add(room: &mut Room, from: &str, shape: Shape) {
        room.handle(
            from,
            ClientMessage::ShapeMutation {
                mutation: ShapeMutation::Add { shape },
            },
        );
    }

    #[test]
    fn test_join_snapshot() {
        let mut room = Room::new("lobby", 16);
        let _a = room.join("a");
        let _b = room.join("b");
        let shapes = [rect(0.1), rect(0.2), rect(0.3)];
        for shape in &shapes {
            add(&mut room, "a", shape.clone());
        }

        let joined = room.join("c");
        let ServerMessage::InitialState {
            room: id,
            shapes: got,
            ..
        } = joined.initial_state
        else {
            panic!("expected initial-state");
        };
        assert_eq!(id, "lobby");
        assert_eq!(got, shapes);

        let ServerMessage::RosterUpdate { peers } = joined.roster else {
            panic!("expected roster-update");
        };
        let ids: Vec<_> = peers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(room.peer_count(), 3);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut room = Room::new("lobby", 16);
        room.join("a");
        room.join("b");
        let shape = rect(0.1);
        let id = shape.id();
        add(&mut room, "a", shape.clone());

        let from_a = shape.clone().with_style(ShapeStyle::new("#FF6B6B", 2.0));
        let from_b = shape.with_style(ShapeStyle::new("#54A0FF", 2.0));
        for (peer, update) in [("a", from_a), ("b", from_b)] {
            room.handle(
                peer,
                ClientMessage::ShapeMutation {
                    mutation: ShapeMutation::Update { shape: update },
                },
            );
        }

        let stored = room.whiteboard().shapes.get(id).unwrap();
        assert_eq!(stored.style().color, "#54A0FF");
    }

    #[test]
    fn test_relays_to_subscribers_in_order() {
        let mut room = Room::new("lobby", 16);
        let mut a = room.join("a").rx;
        room.join("b");
        room.handle("b", ClientMessage::CursorMove { x: 0.5, y: 0.5 });

        // Subscribers see their own frames; the socket loop filters them.
        let (from, _) = a.try_recv().unwrap();
        assert_eq!(from, "a");
        let (from, msg) = a.try_recv().unwrap();
        assert_eq!(from, "b");
        assert!(matches!(msg, ServerMessage::PeerJoined { .. }));
        let (from, msg) = a.try_recv().unwrap();
        assert_eq!(from, "b");
        assert_eq!(
            msg,
            ServerMessage::CursorMove {
                peer_id: "b".into(),
                x: 0.5,
                y: 0.5
            }
        );
        assert_eq!(room.peers().get("b").unwrap().cursor, Point::new(0.5, 0.5));
    }

    #[test]
    fn test_presence_frames_update_roster() {
        let mut room = Room::new("lobby", 16);
        let mut a = room.join("a").rx;
        room.join("b");
        let stroke = rect(0.2);

        room.handle("b", ClientMessage::ToolChange { tool: ToolKind::Rectangle });
        room.handle(
            "b",
            ClientMessage::DrawingPreview {
                is_drawing: true,
                drawing: Some(stroke.clone()),
            },
        );
        let peer = room.peers().get("b").unwrap();
        assert_eq!(peer.tool, Some(ToolKind::Rectangle));
        assert!(peer.is_drawing);
        assert_eq!(peer.drawing.as_ref(), Some(&stroke));
        assert_eq!(room.peers().drawings().count(), 1);

        room.handle(
            "b",
            ClientMessage::DrawingPreview {
                is_drawing: false,
                drawing: None,
            },
        );
        let peer = room.peers().get("b").unwrap();
        assert!(!peer.is_drawing);
        assert!(peer.drawing.is_none());
        assert_eq!(room.peers().drawings().count(), 0);

        // a's own join, b's join, then the three presence frames in order.
        let relayed: Vec<_> = std::iter::from_fn(|| a.try_recv().ok()).skip(2).collect();
        assert_eq!(relayed.len(), 3);
        assert_eq!(
            relayed[0].1,
            ServerMessage::ToolChange {
                peer_id: "b".into(),
                tool: ToolKind::Rectangle
            }
        );
        assert!(matches!(
            &relayed[2].1,
            ServerMessage::DrawingPreview { is_drawing: false, drawing: None, .. }
        ));
    }

    #[test]
    fn test_leave_keeps_shapes() {
        let mut room = Room::new("lobby", 16);
        room.join("a");
        add(&mut room, "a", rect(0.1));
        assert!(room.leave("a"));
        assert!(!room.leave("a"));
        assert!(room.is_empty());
        assert_eq!(room.whiteboard().shapes.len(), 1);
        assert!(room.idle_longer_than(Duration::ZERO, Instant::now()));
    }

    #[test]
    fn test_history_sync_replaces_log() {
        let mut room = Room::new("lobby", 16);
        room.join("a");
        room.handle(
            "a",
            ClientMessage::HistorySync {
                log: vec![vec![], vec![rect(0.1)]],
                cursor: 1,
            },
        );
        assert_eq!(room.whiteboard().history.len(), 2);
        assert_eq!(room.whiteboard().history.cursor(), 1);
    }
}
