//! Straight line segment.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{point_to_segment_distance, CanvasSize, HIT_TOLERANCE};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: new_shape_id(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    /// Length in normalized units.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        Rect::from_points(size.to_pixels(self.start), size.to_pixels(self.end))
    }

    // Tolerance is in normalized units, so it scales with the canvas.
    fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        let p = size.to_normalized(point);
        point_to_segment_distance(p, self.start, self.end) <= HIT_TOLERANCE
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
