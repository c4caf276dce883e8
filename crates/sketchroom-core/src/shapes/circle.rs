//! Circle shape.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::CanvasSize;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A circle given by its centre and a point on its rim.
///
/// The radius is measured in pixels, so a circle stays round on a
/// non-square canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Centre.
    pub start: Point,
    /// Rim point.
    pub end: Point,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Circle {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: new_shape_id(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    pub fn center(&self, size: CanvasSize) -> Point {
        size.to_pixels(self.start)
    }

    pub fn radius(&self, size: CanvasSize) -> f64 {
        size.to_pixels(self.start).distance(size.to_pixels(self.end))
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        let r = self.radius(size);
        Rect::from_center_size(self.center(size), (2.0 * r, 2.0 * r))
    }

    fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        point.distance(self.center(size)) <= self.radius(size)
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
