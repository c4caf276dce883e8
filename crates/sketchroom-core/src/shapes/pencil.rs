//! Freehand pencil stroke.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{point_to_polyline_distance, CanvasSize, HIT_TOLERANCE};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke. Points are appended while the pointer is down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pencil {
    pub(crate) id: ShapeId,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Pencil {
    pub fn new() -> Self {
        Self::from_points(Vec::new())
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            id: new_shape_id(),
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

impl Default for Pencil {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTrait for Pencil {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        let mut points = self.points.iter().map(|p| size.to_pixels(*p));
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |acc, p| {
            acc.union_pt(p)
        })
    }

    fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        let p = size.to_normalized(point);
        point_to_polyline_distance(p, &self.points) <= HIT_TOLERANCE
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }
}
