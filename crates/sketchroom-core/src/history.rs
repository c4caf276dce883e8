//! Snapshot-based undo/redo.
//!
//! Each committed change pushes a full copy of the shape list. The log is
//! shared between peers through `history-sync`, which replaces it wholesale.

use crate::shapes::{Shape, ShapeId};
use crate::store::ShapeStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serializable form of the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub log: Vec<Vec<Shape>>,
    pub cursor: usize,
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self {
            log: vec![Vec::new()],
            cursor: 0,
        }
    }
}

/// Undo/redo log with a cursor into it.
///
/// The log always holds at least one entry, and `cursor` always indexes it.
#[derive(Debug, Clone)]
pub struct History {
    log: Vec<Vec<Shape>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// A log holding the empty canvas.
    pub fn new() -> Self {
        Self {
            log: vec![Vec::new()],
            cursor: 0,
        }
    }

    /// Record the current shapes, discarding any redo entries.
    pub fn save(&mut self, shapes: &[Shape]) {
        self.log.truncate(self.cursor + 1);
        self.log.push(shapes.to_vec());
        self.cursor = self.log.len() - 1;
    }

    /// Step back one entry and restore it into `store`.
    pub fn undo(&mut self, store: &mut ShapeStore) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        store.restore(self.log[self.cursor].clone());
        true
    }

    /// Step forward one entry and restore it into `store`.
    pub fn redo(&mut self, store: &mut ShapeStore) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        store.restore(self.log[self.cursor].clone());
        true
    }

    /// Replace the whole log, as received from a peer.
    pub fn replace(&mut self, snapshot: HistorySnapshot) {
        if snapshot.log.is_empty() {
            log::debug!("received empty history log, resetting");
            *self = Self::new();
            return;
        }
        self.cursor = snapshot.cursor.min(snapshot.log.len() - 1);
        self.log = snapshot.log.into_iter().map(dedupe).collect();
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            log: self.log.clone(),
            cursor: self.cursor,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.log.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Shapes at the cursor.
    pub fn current(&self) -> &[Shape] {
        &self.log[self.cursor]
    }
}

/// Collapse repeated ids the way `ShapeStore::add` does: a later shape
/// replaces the earlier one in place.
fn dedupe(shapes: Vec<Shape>) -> Vec<Shape> {
    let mut index: HashMap<ShapeId, usize> = HashMap::with_capacity(shapes.len());
    let mut out: Vec<Shape> = Vec::with_capacity(shapes.len());
    for shape in shapes {
        match index.get(&shape.id()) {
            Some(&i) => out[i] = shape,
            None => {
                index.insert(shape.id(), out.len());
                out.push(shape);
            }
        }
    }
    out
}
