//! Text label.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{rect_contains, CanvasSize};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Font size assigned per pixel of stroke width when text is committed.
pub const FONT_SIZE_PER_STROKE: f64 = 0.005;

/// Smallest font size a resize may produce.
pub const MIN_FONT_SIZE: f64 = 0.01;

/// A single-line text label anchored at its baseline-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Baseline-left anchor.
    pub position: Point,
    pub content: String,
    /// Font size as a fraction of canvas width.
    pub font_size: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(position: Point, content: String, font_size: f64) -> Self {
        Self {
            id: new_shape_id(),
            position,
            content,
            font_size,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    /// Estimated box: each glyph is taken as half the font size wide.
    /// There is no font metrics source in the core.
    fn bounds(&self, size: CanvasSize) -> Rect {
        let font_px = self.font_size * size.width;
        let width = self.content.chars().count() as f64 * font_px / 2.0;
        let left = self.position.x * size.width;
        let bottom = self.position.y * size.height;
        Rect::new(left, bottom - font_px, left + width, bottom)
    }

    fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        rect_contains(self.bounds(size), point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
