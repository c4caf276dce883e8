//! SketchRoom Core Library
//!
//! Platform-agnostic drawing-state engine for the SketchRoom collaborative
//! whiteboard: shapes, geometry, the shape store, undo history, peer
//! presence, the wire protocol and the client sync session.

pub mod collaboration;
pub mod geometry;
pub mod history;
pub mod presence;
pub mod selection;
pub mod shapes;
pub mod store;
pub mod suggest;
pub mod sync;
pub mod tools;
#[cfg(not(target_arch = "wasm32"))]
pub mod transport;

pub use collaboration::{EventSink, RenderFrame, StylePatch, SyncEvent, SyncSession};
pub use geometry::{CanvasSize, ResizeHandle};
pub use history::{History, HistorySnapshot};
pub use presence::{PeerId, PresencePatch, PresenceRecord, PresenceTracker};
pub use selection::ManipulationState;
pub use shapes::{Shape, ShapeId, ShapeStyle, ShapeTrait};
pub use store::{ShapeMutation, ShapeStore};
pub use suggest::Suggestion;
pub use sync::{ClientMessage, ConnectionState, ProtocolError, ServerMessage};
pub use tools::{ToolKind, ToolManager, ToolState};
#[cfg(not(target_arch = "wasm32"))]
pub use transport::{NativeWebSocket, TransportError, TransportEvent};
