//! Per-peer ephemeral state: cursor, tool, in-progress drawing.

use crate::shapes::Shape;
use crate::tools::ToolKind;
use kurbo::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Connection id assigned by the relay.
pub type PeerId = String;

/// Display colours handed out to peers.
pub const PEER_PALETTE: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF", "#5F27CD",
];

/// Pick a palette colour at random.
pub fn random_peer_color() -> String {
    let i = rand::rng().random_range(0..PEER_PALETTE.len());
    PEER_PALETTE[i].to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub id: PeerId,
    pub color: String,
    /// Last known cursor, normalized.
    pub cursor: Point,
    #[serde(default)]
    pub tool: Option<ToolKind>,
    #[serde(default)]
    pub is_drawing: bool,
    /// Shape the peer is drawing right now.
    #[serde(default)]
    pub drawing: Option<Shape>,
}

impl PresenceRecord {
    pub fn new(id: impl Into<PeerId>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            cursor: Point::ZERO,
            tool: None,
            is_drawing: false,
            drawing: None,
        }
    }

    fn merge(&mut self, patch: PresencePatch) {
        if let Some(cursor) = patch.cursor {
            self.cursor = cursor;
        }
        if let Some(tool) = patch.tool {
            self.tool = Some(tool);
        }
        if let Some(preview) = patch.drawing {
            self.is_drawing = preview.is_drawing;
            self.drawing = if preview.is_drawing { preview.shape } else { None };
        }
    }
}

/// Drawing state carried by a `drawing-preview` event.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPreview {
    pub is_drawing: bool,
    pub shape: Option<Shape>,
}

/// Fields to merge into a presence record. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresencePatch {
    pub cursor: Option<Point>,
    pub tool: Option<ToolKind>,
    pub drawing: Option<DrawingPreview>,
}

impl PresencePatch {
    pub fn cursor(point: Point) -> Self {
        Self {
            cursor: Some(point),
            ..Self::default()
        }
    }

    pub fn tool(tool: ToolKind) -> Self {
        Self {
            tool: Some(tool),
            ..Self::default()
        }
    }

    pub fn drawing(is_drawing: bool, shape: Option<Shape>) -> Self {
        Self {
            drawing: Some(DrawingPreview { is_drawing, shape }),
            ..Self::default()
        }
    }
}

/// Presence records in join order.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    records: Vec<PresenceRecord>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `patch` into the peer's record, creating it with a random
    /// palette colour if the peer is unknown.
    pub fn upsert(&mut self, id: &str, patch: PresencePatch) -> &PresenceRecord {
        let i = match self.records.iter().position(|r| r.id == id) {
            Some(i) => i,
            None => {
                self.records.push(PresenceRecord::new(id, random_peer_color()));
                self.records.len() - 1
            }
        };
        self.records[i].merge(patch);
        &self.records[i]
    }

    /// Insert a full record, replacing any record with the same id.
    pub fn insert(&mut self, record: PresenceRecord) {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<PresenceRecord> {
        let i = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(i))
    }

    pub fn get(&self, id: &str) -> Option<&PresenceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn roster(&self) -> &[PresenceRecord] {
        &self.records
    }

    pub fn replace_roster(&mut self, records: Vec<PresenceRecord>) {
        self.records.clear();
        for record in records {
            self.insert(record);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// In-progress shapes of every peer that is drawing.
    pub fn drawings(&self) -> impl Iterator<Item = (&PeerId, &Shape)> {
        self.records
            .iter()
            .filter_map(|r| r.drawing.as_ref().map(|s| (&r.id, s)))
    }

    pub fn cursors(&self) -> impl Iterator<Item = (&PeerId, Point, &str)> {
        self.records
            .iter()
            .map(|r| (&r.id, r.cursor, r.color.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Pencil;

    #[test]
    fn test_upsert_creates_with_palette_color() {
        let mut peers = PresenceTracker::new();
        let record = peers.upsert("a", PresencePatch::cursor(Point::new(0.2, 0.3)));
        assert!(PEER_PALETTE.contains(&record.color.as_str()));
        assert_eq!(record.cursor, Point::new(0.2, 0.3));
    }

    #[test]
    fn test_upsert_merges() {
        let mut peers = PresenceTracker::new();
        peers.upsert("a", PresencePatch::cursor(Point::new(0.2, 0.3)));
        let color = peers.get("a").unwrap().color.clone();
        peers.upsert("a", PresencePatch::tool(ToolKind::Line));
        let record = peers.get("a").unwrap();
        assert_eq!(record.cursor, Point::new(0.2, 0.3));
        assert_eq!(record.tool, Some(ToolKind::Line));
        assert_eq!(record.color, color);
        assert_eq!(peers.len(), 1);
    }

    #[test]
    fn test_drawing_preview_lifecycle() {
        let mut peers = PresenceTracker::new();
        let stroke = Shape::Pencil(Pencil::from_points(vec![Point::new(0.1, 0.1)]));
        peers.upsert("a", PresencePatch::drawing(true, Some(stroke)));
        assert_eq!(peers.drawings().count(), 1);
        assert!(peers.get("a").unwrap().is_drawing);

        peers.upsert("a", PresencePatch::drawing(false, None));
        assert_eq!(peers.drawings().count(), 0);
        assert!(!peers.get("a").unwrap().is_drawing);
    }

    #[test]
    fn test_roster_keeps_join_order() {
        let mut peers = PresenceTracker::new();
        peers.insert(PresenceRecord::new("b", "#FF6B6B"));
        peers.insert(PresenceRecord::new("a", "#4ECDC4"));
        peers.insert(PresenceRecord::new("c", "#45B7D1"));
        peers.remove("a");
        let ids: Vec<_> = peers.roster().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn test_remove_unknown() {
        let mut peers = PresenceTracker::new();
        assert!(peers.remove("ghost").is_none());
    }
}
