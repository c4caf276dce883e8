//! Client-side collaboration session.
//!
//! [`SyncSession`] owns the local replica of the whiteboard: shapes, history,
//! peer presence and the active tool. Local operations mutate the replica
//! first and then emit events through an [`EventSink`]; remote events from
//! the relay are applied through [`SyncSession::handle_server_message`].
//! Sends are fire-and-forget and there is no acknowledgement.

use crate::geometry::{handle_points, resize_handle, CanvasSize, ResizeHandle};
use crate::history::{History, HistorySnapshot};
use crate::presence::{PeerId, PresencePatch, PresenceRecord, PresenceTracker};
use crate::shapes::{Shape, ShapeId, Text};
use crate::store::{ShapeMutation, ShapeStore};
use crate::suggest::{suggestions_for, Suggestion};
use crate::sync::{ClientMessage, ConnectionState, ProtocolResult, ServerMessage};
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Point, Rect};
use std::sync::mpsc::Sender;

/// One-way outbound channel to the relay.
pub trait EventSink {
    fn send_event(&mut self, msg: ClientMessage);
}

impl EventSink for Vec<ClientMessage> {
    fn send_event(&mut self, msg: ClientMessage) {
        self.push(msg);
    }
}

impl EventSink for Sender<ClientMessage> {
    fn send_event(&mut self, msg: ClientMessage) {
        if self.send(msg).is_err() {
            log::debug!("Outgoing channel closed, dropping message");
        }
    }
}

/// What changed after applying a message from the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Joined { room: String, shape_count: usize },
    RosterChanged { peer_count: usize },
    PeerJoined { peer_id: PeerId },
    PeerLeft { peer_id: PeerId },
    ShapesChanged { from: PeerId },
    PresenceChanged { peer_id: PeerId },
    HistoryReplaced { from: PeerId },
    Error { message: String },
}

/// Style edits for the selected shape. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    /// Only applies to text.
    pub font_size: Option<f64>,
}

/// Everything the presentation layer needs to paint one frame.
#[derive(Debug)]
pub struct RenderFrame<'a> {
    pub size: CanvasSize,
    pub shapes: &'a [Shape],
    pub selected: Option<&'a Shape>,
    /// Pixel bounds of the selection.
    pub selection_bounds: Option<Rect>,
    /// Resize handles around the selection. Empty for shapes that can't resize.
    pub handles: Vec<(ResizeHandle, Point)>,
    /// Local shape being drawn.
    pub preview: Option<&'a Shape>,
    /// Shapes other peers are drawing.
    pub remote_drawings: Vec<(&'a PeerId, &'a Shape)>,
    pub peers: &'a [PresenceRecord],
    pub tool: ToolKind,
    pub connection: ConnectionState,
}

pub struct SyncSession<S: EventSink> {
    sink: S,
    size: CanvasSize,
    store: ShapeStore,
    history: History,
    tools: ToolManager,
    peers: PresenceTracker,
    connection: ConnectionState,
    room: Option<String>,
}

impl<S: EventSink> SyncSession<S> {
    pub fn new(sink: S, size: CanvasSize) -> Self {
        Self {
            sink,
            size,
            store: ShapeStore::new(),
            history: History::new(),
            tools: ToolManager::new(),
            peers: PresenceTracker::new(),
            connection: ConnectionState::Connecting,
            room: None,
        }
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn peers(&self) -> &PresenceTracker {
        &self.peers
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Update the connection flag from the transport. Closing drops the
    /// roster, since presence is only meaningful while connected.
    pub fn set_connection_state(&mut self, state: ConnectionState) {
        if state == ConnectionState::Closed {
            self.peers.clear();
        }
        self.connection = state;
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.size
    }

    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.size = size;
    }

    // --- Pointer input (pixel space) ---

    pub fn pointer_down(&mut self, point: Point) {
        let size = self.size;
        let normalized = size.to_normalized(point);
        match self.tools.current_tool {
            ToolKind::Select => {
                let handle = self
                    .store
                    .selected()
                    .and_then(|shape| resize_handle(point, shape, size));
                if let Some(handle) = handle {
                    if self.store.begin_resize(handle, point, size) {
                        return;
                    }
                }
                let hit = self.store.shape_at(point, size).map(Shape::id);
                self.store.select(hit);
                if hit.is_some() {
                    self.store.begin_drag(point, size);
                }
            }
            _ => {
                if let Some(preview) = self.tools.begin(normalized).cloned() {
                    self.emit(ClientMessage::DrawingPreview {
                        is_drawing: true,
                        drawing: Some(preview),
                    });
                }
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        let size = self.size;
        let normalized = size.to_normalized(point);
        self.emit(ClientMessage::CursorMove {
            x: normalized.x,
            y: normalized.y,
        });

        if let Some(state) = self.store.manipulation() {
            let changed = if state.is_resize() {
                self.store.resize_to(point, size)
            } else {
                self.store.drag_to(point, size)
            };
            if let Some(shape) = changed {
                self.emit(ClientMessage::ShapeMutation {
                    mutation: ShapeMutation::Update { shape },
                });
            }
        } else if let Some(preview) = self.tools.extend(normalized).cloned() {
            self.emit(ClientMessage::DrawingPreview {
                is_drawing: true,
                drawing: Some(preview),
            });
        }
    }

    pub fn pointer_up(&mut self, _point: Point) {
        if self.store.end_manipulation() {
            self.commit_history();
            return;
        }
        let Some(shape) = self.tools.finish() else {
            return;
        };
        let id = shape.id();
        self.add_shape(shape);
        self.emit(ClientMessage::DrawingPreview {
            is_drawing: false,
            drawing: None,
        });
        self.set_tool(ToolKind::Select);
        self.store.select(Some(id));
    }

    /// Add a text label at a pixel position. Blank content is ignored.
    pub fn commit_text(&mut self, position: Point, content: &str) -> Option<ShapeId> {
        let normalized = self.size.to_normalized(position);
        let shape = self.tools.make_text(normalized, content)?;
        self.tools.cancel();
        let id = shape.id();
        self.add_shape(shape);
        self.set_tool(ToolKind::Select);
        self.store.select(Some(id));
        Some(id)
    }

    // --- Tool and style ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
        if tool != ToolKind::Select {
            self.store.select(None);
        }
        self.emit(ClientMessage::ToolChange { tool });
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.tools.current_style.color = color.into();
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.tools.current_style.stroke_width = width;
    }

    /// Restyle the selected shape. Returns false with nothing selected.
    pub fn update_selected_style(&mut self, patch: StylePatch) -> bool {
        let Some(shape) = self.store.selected_mut() else {
            return false;
        };
        let style = shape.style_mut();
        if let Some(color) = patch.color {
            style.color = color;
        }
        if let Some(width) = patch.stroke_width {
            style.stroke_width = width;
        }
        if let (Some(font_size), Shape::Text(Text { font_size: fs, .. })) =
            (patch.font_size, &mut *shape)
        {
            *fs = font_size;
        }
        let shape = shape.clone();
        self.emit(ClientMessage::ShapeMutation {
            mutation: ShapeMutation::Update { shape },
        });
        self.commit_history();
        true
    }

    // --- Commands ---

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.selected_id() else {
            return false;
        };
        self.store.remove(id);
        self.emit(ClientMessage::ShapeMutation {
            mutation: ShapeMutation::Delete { shape_id: id },
        });
        self.commit_history();
        true
    }

    pub fn clear_canvas(&mut self) {
        self.store.clear();
        self.emit(ClientMessage::ShapeMutation {
            mutation: ShapeMutation::Clear,
        });
        self.commit_history();
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.store) {
            return false;
        }
        self.broadcast_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.store) {
            return false;
        }
        self.broadcast_restore();
        true
    }

    /// Suggestions for the selected shape.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.store
            .selected()
            .map(suggestions_for)
            .unwrap_or_default()
    }

    /// Add the shape a suggestion proposes next to the selected shape.
    pub fn apply_suggestion(&mut self, suggestion: Suggestion) -> Option<ShapeId> {
        let shape = suggestion.build(self.store.selected()?);
        let id = shape.id();
        self.add_shape(shape);
        Some(id)
    }

    // --- Remote events ---

    pub fn handle_json(&mut self, text: &str) -> ProtocolResult<Option<SyncEvent>> {
        let msg = ServerMessage::from_json(text)?;
        Ok(self.handle_server_message(msg))
    }

    pub fn handle_server_message(&mut self, msg: ServerMessage) -> Option<SyncEvent> {
        match msg {
            ServerMessage::InitialState {
                room,
                shapes,
                log,
                cursor,
            } => {
                log::info!("Joined room {} with {} shapes", room, shapes.len());
                self.store.replace_all(shapes);
                self.history.replace(HistorySnapshot { log, cursor });
                self.connection = ConnectionState::Open;
                self.room = Some(room.clone());
                Some(SyncEvent::Joined {
                    room,
                    shape_count: self.store.len(),
                })
            }
            ServerMessage::RosterUpdate { peers } => {
                self.peers.replace_roster(peers);
                Some(SyncEvent::RosterChanged {
                    peer_count: self.peers.len(),
                })
            }
            ServerMessage::PeerJoined { peer } => {
                let peer_id = peer.id.clone();
                self.peers.insert(peer);
                Some(SyncEvent::PeerJoined { peer_id })
            }
            ServerMessage::PeerLeft { peer_id } => {
                self.peers.remove(&peer_id);
                Some(SyncEvent::PeerLeft { peer_id })
            }
            ServerMessage::ShapeMutation { from, mutation } => {
                if self.store.apply(&mutation) {
                    Some(SyncEvent::ShapesChanged { from })
                } else {
                    log::debug!("Ignoring mutation from {} for a missing shape", from);
                    None
                }
            }
            ServerMessage::DrawingPreview {
                peer_id,
                is_drawing,
                drawing,
            } => {
                self.peers
                    .upsert(&peer_id, PresencePatch::drawing(is_drawing, drawing));
                Some(SyncEvent::PresenceChanged { peer_id })
            }
            ServerMessage::CursorMove { peer_id, x, y } => {
                self.peers
                    .upsert(&peer_id, PresencePatch::cursor(Point::new(x, y)));
                Some(SyncEvent::PresenceChanged { peer_id })
            }
            ServerMessage::ToolChange { peer_id, tool } => {
                self.peers.upsert(&peer_id, PresencePatch::tool(tool));
                Some(SyncEvent::PresenceChanged { peer_id })
            }
            ServerMessage::HistorySync { from, log, cursor } => {
                self.history.replace(HistorySnapshot { log, cursor });
                Some(SyncEvent::HistoryReplaced { from })
            }
            ServerMessage::Error { message } => {
                log::warn!("Relay reported an error: {}", message);
                Some(SyncEvent::Error { message })
            }
        }
    }

    /// Read-only view for painting.
    pub fn frame(&self) -> RenderFrame<'_> {
        let selected = self.store.selected();
        let selection_bounds = selected.map(|s| s.bounds(self.size));
        let handles = match (selected, selection_bounds) {
            (Some(shape), Some(bounds)) if shape.is_resizable() => handle_points(bounds).to_vec(),
            _ => Vec::new(),
        };
        RenderFrame {
            size: self.size,
            shapes: self.store.shapes(),
            selected,
            selection_bounds,
            handles,
            preview: self.tools.preview(),
            remote_drawings: self.peers.drawings().collect(),
            peers: self.peers.roster(),
            tool: self.tools.current_tool,
            connection: self.connection,
        }
    }

    // --- Internal ---

    fn add_shape(&mut self, shape: Shape) {
        self.store.add(shape.clone());
        self.emit(ClientMessage::ShapeMutation {
            mutation: ShapeMutation::Add { shape },
        });
        self.commit_history();
    }

    fn commit_history(&mut self) {
        self.history.save(self.store.shapes());
        self.emit(ClientMessage::history_sync(self.history.snapshot()));
    }

    fn broadcast_restore(&mut self) {
        self.emit(ClientMessage::ShapeMutation {
            mutation: ShapeMutation::ReplaceAll {
                shapes: self.store.to_vec(),
            },
        });
        self.emit(ClientMessage::history_sync(self.history.snapshot()));
    }

    fn emit(&mut self, msg: ClientMessage) {
        if self.connection == ConnectionState::Open {
            self.sink.send_event(msg);
        } else {
            log::debug!("Not connected, dropping outgoing message");
        }
    }
}
