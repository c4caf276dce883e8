//! SketchRoom WebSocket Relay Server
//!
//! Peers connect to `/ws?room=<id>&token=<jwt>`. The relay keeps each room's
//! shapes and undo log, greets joiners with an `initial-state` and the
//! current roster, then fans every frame out to the other peers in the room.

pub mod auth;
pub mod config;
pub mod room;
pub mod state;
pub mod ws;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use state::AppState;

pub fn app(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> &'static str {
    "SketchRoom Relay Server - Connect via WebSocket at /ws?room=<id>"
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let (rooms, peers) = state.stats();
    Json(json!({ "status": "OK", "rooms": rooms, "peers": peers }))
}
