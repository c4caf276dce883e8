//! Shape definitions for the whiteboard.
//!
//! Geometric fields are stored as fractions of the canvas width and height,
//! so the same document renders at any canvas size. Pixel-space results are
//! produced on demand for a given [`CanvasSize`].

mod circle;
mod glyph;
mod line;
mod pencil;
mod rectangle;
mod text;

pub use circle::Circle;
pub use glyph::{Database, Icon};
pub use line::Line;
pub use pencil::Pencil;
pub use rectangle::Rectangle;
pub use text::{Text, FONT_SIZE_PER_STROKE, MIN_FONT_SIZE};

use crate::geometry::CanvasSize;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
///
/// Generated on the client as a UUID v7 (timestamp plus random bits).
pub type ShapeId = Uuid;

/// Generate a fresh shape id.
pub fn new_shape_id() -> ShapeId {
    Uuid::now_v7()
}

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// CSS colour string, e.g. `#1976d2`.
    #[serde(default = "default_color")]
    pub color: String,
    /// Stroke width in pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_stroke_width() -> f64 {
    2.0
}

impl ShapeStyle {
    pub fn new(color: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            color: color.into(),
            stroke_width,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: default_color(),
            stroke_width: default_stroke_width(),
        }
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Axis-aligned bounding box in pixel space.
    fn bounds(&self, size: CanvasSize) -> Rect;

    /// Check if a pixel-space point hits this shape.
    fn hit_test(&self, point: Point, size: CanvasSize) -> bool;

    /// Move the shape by a normalized delta.
    fn translate(&mut self, delta: Vec2);

    fn style(&self) -> &ShapeStyle;

    fn style_mut(&mut self) -> &mut ShapeStyle;
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Pencil(Pencil),
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    Text(Text),
    Icon(Icon),
    Database(Database),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Pencil(s) => s.id(),
            Shape::Rectangle(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Line(s) => s.id(),
            Shape::Text(s) => s.id(),
            Shape::Icon(s) => s.id(),
            Shape::Database(s) => s.id(),
        }
    }

    pub fn bounds(&self, size: CanvasSize) -> Rect {
        match self {
            Shape::Pencil(s) => s.bounds(size),
            Shape::Rectangle(s) => s.bounds(size),
            Shape::Circle(s) => s.bounds(size),
            Shape::Line(s) => s.bounds(size),
            Shape::Text(s) => s.bounds(size),
            Shape::Icon(s) => s.bounds(size),
            Shape::Database(s) => s.bounds(size),
        }
    }

    pub fn hit_test(&self, point: Point, size: CanvasSize) -> bool {
        match self {
            Shape::Pencil(s) => s.hit_test(point, size),
            Shape::Rectangle(s) => s.hit_test(point, size),
            Shape::Circle(s) => s.hit_test(point, size),
            Shape::Line(s) => s.hit_test(point, size),
            Shape::Text(s) => s.hit_test(point, size),
            Shape::Icon(s) => s.hit_test(point, size),
            Shape::Database(s) => s.hit_test(point, size),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Pencil(s) => s.translate(delta),
            Shape::Rectangle(s) => s.translate(delta),
            Shape::Circle(s) => s.translate(delta),
            Shape::Line(s) => s.translate(delta),
            Shape::Text(s) => s.translate(delta),
            Shape::Icon(s) => s.translate(delta),
            Shape::Database(s) => s.translate(delta),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Pencil(s) => s.style(),
            Shape::Rectangle(s) => s.style(),
            Shape::Circle(s) => s.style(),
            Shape::Line(s) => s.style(),
            Shape::Text(s) => s.style(),
            Shape::Icon(s) => s.style(),
            Shape::Database(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Pencil(s) => s.style_mut(),
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Line(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
            Shape::Icon(s) => s.style_mut(),
            Shape::Database(s) => s.style_mut(),
        }
    }

    /// Replace the style, builder-style.
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        *self.style_mut() = style;
        self
    }

    /// The normalized point the shape is anchored at: the start point for
    /// two-point shapes, the first point of a stroke, or the position.
    pub fn anchor(&self) -> Point {
        match self {
            Shape::Pencil(s) => s.points.first().copied().unwrap_or(Point::ZERO),
            Shape::Rectangle(s) => s.start,
            Shape::Circle(s) => s.start,
            Shape::Line(s) => s.start,
            Shape::Text(s) => s.position,
            Shape::Icon(s) => s.position,
            Shape::Database(s) => s.position,
        }
    }

    /// Whether dragging a resize handle changes this shape.
    pub fn is_resizable(&self) -> bool {
        matches!(
            self,
            Shape::Rectangle(_) | Shape::Circle(_) | Shape::Line(_) | Shape::Text(_)
        )
    }

    /// Lowercase kind name, as used in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Pencil(_) => "pencil",
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Line(_) => "line",
            Shape::Text(_) => "text",
            Shape::Icon(_) => "icon",
            Shape::Database(_) => "database",
        }
    }
}
