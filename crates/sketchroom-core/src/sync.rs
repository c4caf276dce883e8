//! Wire protocol between clients and the relay.
//!
//! Every frame is a JSON text message tagged by `type`.

use crate::history::HistorySnapshot;
use crate::presence::{PeerId, PresenceRecord};
use crate::shapes::Shape;
use crate::store::ShapeMutation;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages sent to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// A durable change to the shape list
    ShapeMutation { mutation: ShapeMutation },
    /// The shape being drawn right now, or that drawing stopped
    DrawingPreview {
        is_drawing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        drawing: Option<Shape>,
    },
    /// Normalized cursor position
    CursorMove { x: f64, y: f64 },
    ToolChange { tool: ToolKind },
    /// Wholesale replacement of the shared history log
    HistorySync {
        log: Vec<Vec<Shape>>,
        cursor: usize,
    },
}

/// Messages received from the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Room contents, sent once to a peer that just joined
    InitialState {
        room: String,
        shapes: Vec<Shape>,
        log: Vec<Vec<Shape>>,
        cursor: usize,
    },
    /// Everyone else in the room, sent once to a peer that just joined
    RosterUpdate { peers: Vec<PresenceRecord> },
    PeerJoined { peer: PresenceRecord },
    PeerLeft { peer_id: PeerId },
    ShapeMutation { from: PeerId, mutation: ShapeMutation },
    DrawingPreview {
        peer_id: PeerId,
        is_drawing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        drawing: Option<Shape>,
    },
    CursorMove { peer_id: PeerId, x: f64, y: f64 },
    ToolChange { peer_id: PeerId, tool: ToolKind },
    HistorySync {
        from: PeerId,
        log: Vec<Vec<Shape>>,
        cursor: usize,
    },
    /// The last frame could not be understood
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl ClientMessage {
    pub fn history_sync(snapshot: HistorySnapshot) -> Self {
        ClientMessage::HistorySync {
            log: snapshot.log,
            cursor: snapshot.cursor,
        }
    }

    /// The message as the relay forwards it to the rest of the room.
    pub fn into_relayed(self, from: &str) -> ServerMessage {
        let from = from.to_string();
        match self {
            ClientMessage::ShapeMutation { mutation } => {
                ServerMessage::ShapeMutation { from, mutation }
            }
            ClientMessage::DrawingPreview {
                is_drawing,
                drawing,
            } => ServerMessage::DrawingPreview {
                peer_id: from,
                is_drawing,
                drawing,
            },
            ClientMessage::CursorMove { x, y } => ServerMessage::CursorMove { peer_id: from, x, y },
            ClientMessage::ToolChange { tool } => ServerMessage::ToolChange { peer_id: from, tool },
            ClientMessage::HistorySync { log, cursor } => {
                ServerMessage::HistorySync { from, log, cursor }
            }
        }
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use kurbo::Point;

    #[test]
    fn test_client_message_serialize() {
        let msg = ClientMessage::CursorMove { x: 0.25, y: 0.5 };
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"cursor-move""#));
        assert!(json.contains("0.25"));
    }

    #[test]
    fn test_mutation_frame_shape() {
        let shape = Shape::Rectangle(Rectangle::new(Point::ZERO, Point::new(0.5, 0.5)));
        let msg = ClientMessage::ShapeMutation {
            mutation: ShapeMutation::Add { shape },
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "shape-mutation");
        assert_eq!(value["mutation"]["kind"], "add");
        assert_eq!(value["mutation"]["shape"]["type"], "rectangle");
    }

    #[test]
    fn test_server_message_deserialize() {
        let json = r#"{"type":"peer-left","peer_id":"abc"}"#;
        match ServerMessage::from_json(json).unwrap() {
            ServerMessage::PeerLeft { peer_id } => assert_eq!(peer_id, "abc"),
            other => panic!("Wrong message type: {other:?}"),
        }
    }

    #[test]
    fn test_preview_without_drawing() {
        let json = r#"{"type":"drawing-preview","is_drawing":false}"#;
        let msg = ClientMessage::from_json(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::DrawingPreview {
                is_drawing: false,
                drawing: None
            }
        );
    }

    #[test]
    fn test_into_relayed_tags_sender() {
        let relayed = ClientMessage::ToolChange {
            tool: ToolKind::Pencil,
        }
        .into_relayed("peer-1");
        assert_eq!(
            relayed,
            ServerMessage::ToolChange {
                peer_id: "peer-1".into(),
                tool: ToolKind::Pencil
            }
        );
    }

    #[test]
    fn test_malformed_frame() {
        assert!(matches!(
            ClientMessage::from_json(r#"{"type":"launch-missiles"}"#),
            Err(ProtocolError::Json(_))
        ));
        assert!(ClientMessage::from_json("not json").is_err());
    }
}
