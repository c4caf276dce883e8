//! Point-anchored glyphs placed by suggestions: named icons and database
//! symbols. Glyphs have no extent and are never hit.

use super::{new_shape_id, ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::CanvasSize;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A named icon, e.g. `lock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub icon: String,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Icon {
    pub fn new(position: Point, icon: impl Into<String>) -> Self {
        Self {
            id: new_shape_id(),
            position,
            icon: icon.into(),
            style: ShapeStyle::default(),
        }
    }
}

/// A database cylinder symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub(crate) id: ShapeId,
    pub position: Point,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Database {
    pub fn new(position: Point) -> Self {
        Self {
            id: new_shape_id(),
            position,
            style: ShapeStyle::default(),
        }
    }
}

fn point_rect(position: Point, size: CanvasSize) -> Rect {
    let p = size.to_pixels(position);
    Rect::from_points(p, p)
}

impl ShapeTrait for Icon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        point_rect(self.position, size)
    }

    fn hit_test(&self, _point: Point, _size: CanvasSize) -> bool {
        false
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

impl ShapeTrait for Database {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self, size: CanvasSize) -> Rect {
        point_rect(self.position, size)
    }

    fn hit_test(&self, _point: Point, _size: CanvasSize) -> bool {
        false
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
