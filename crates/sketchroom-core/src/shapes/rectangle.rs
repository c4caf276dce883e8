//! Rectangle shape.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{rect_contains, CanvasSize};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle spanned by two corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Corner where drawing started.
    pub start: Point,
    /// Opposite corner.
    pub end: Point,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Rectangle {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: new_shape_id(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        Rect::from_points(size.to_pixels(self.start), size.to_pixels(self.end))
    }

    fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        rect_contains(self.bounds(size), point)
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
