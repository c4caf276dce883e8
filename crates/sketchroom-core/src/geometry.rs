//! Geometry engine: bounds, hit-testing and resize-handle detection.
//!
//! Shapes store normalized coordinates; everything here converts them to
//! pixel space for a given canvas size. All functions are pure.

use crate::shapes::{Shape, ShapeTrait};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Hit tolerance for lines and pencil strokes, in normalized units.
pub const HIT_TOLERANCE: f64 = 0.01;

/// Hit radius around each resize handle, in pixels.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a normalized point to pixel space.
    pub fn to_pixels(&self, point: Point) -> Point {
        Point::new(point.x * self.width, point.y * self.height)
    }

    /// Convert a pixel point to normalized space.
    ///
    /// A zero dimension maps to 0 instead of producing NaN/inf.
    pub fn to_normalized(&self, point: Point) -> Point {
        Point::new(ratio(point.x, self.width), ratio(point.y, self.height))
    }

    /// Convert a pixel delta to a normalized delta.
    pub fn delta_to_normalized(&self, delta: Vec2) -> Vec2 {
        Vec2::new(ratio(delta.x, self.width), ratio(delta.y, self.height))
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

fn ratio(value: f64, extent: f64) -> f64 {
    if extent.abs() < f64::EPSILON {
        0.0
    } else {
        value / extent
    }
}

/// Which edge or corner of a shape's bounds a resize drag grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub fn has_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn has_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    pub fn has_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn has_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }
}

/// Distance from a point to the segment a→b.
///
/// The projection parameter is clamped to [0, 1]; a zero-length segment
/// yields the distance to `a`.
pub fn point_to_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON * f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
///
/// A single-point polyline measures against that point; an empty one is
/// infinitely far away.
pub fn point_to_polyline_distance(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_distance(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Inclusive containment: points on the border count as inside.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Axis-aligned bounding box of `shape` in pixel space.
pub fn bounds(shape: &Shape, size: CanvasSize) -> Rect {
    shape.bounds(size)
}

/// Whether the pixel-space `point` hits `shape`.
pub fn hit_test(point: Point, shape: &Shape, size: CanvasSize) -> bool {
    shape.hit_test(point, size)
}

/// The resize handle under `point`, if any.
///
/// Corners are checked before edges, and edge handles only cover the span
/// between the corner zones, so a point near a corner always binds to it.
pub fn resize_handle(point: Point, shape: &Shape, size: CanvasSize) -> Option<ResizeHandle> {
    let b = shape.bounds(size);
    let near = |a: f64, b: f64| (a - b).abs() < HANDLE_RADIUS;
    let inside_x = point.x > b.x0 + HANDLE_RADIUS && point.x < b.x1 - HANDLE_RADIUS;
    let inside_y = point.y > b.y0 + HANDLE_RADIUS && point.y < b.y1 - HANDLE_RADIUS;

    if near(point.x, b.x0) && near(point.y, b.y0) {
        Some(ResizeHandle::Nw)
    } else if near(point.x, b.x1) && near(point.y, b.y0) {
        Some(ResizeHandle::Ne)
    } else if near(point.x, b.x0) && near(point.y, b.y1) {
        Some(ResizeHandle::Sw)
    } else if near(point.x, b.x1) && near(point.y, b.y1) {
        Some(ResizeHandle::Se)
    } else if near(point.x, b.x0) && inside_y {
        Some(ResizeHandle::W)
    } else if near(point.x, b.x1) && inside_y {
        Some(ResizeHandle::E)
    } else if near(point.y, b.y0) && inside_x {
        Some(ResizeHandle::N)
    } else if near(point.y, b.y1) && inside_x {
        Some(ResizeHandle::S)
    } else {
        None
    }
}

/// Pixel positions of the eight handles drawn around a selection.
pub fn handle_points(bounds: Rect) -> [(ResizeHandle, Point); 8] {
    let cx = (bounds.x0 + bounds.x1) / 2.0;
    let cy = (bounds.y0 + bounds.y1) / 2.0;
    [
        (ResizeHandle::Nw, Point::new(bounds.x0, bounds.y0)),
        (ResizeHandle::Ne, Point::new(bounds.x1, bounds.y0)),
        (ResizeHandle::Sw, Point::new(bounds.x0, bounds.y1)),
        (ResizeHandle::Se, Point::new(bounds.x1, bounds.y1)),
        (ResizeHandle::W, Point::new(bounds.x0, cy)),
        (ResizeHandle::E, Point::new(bounds.x1, cy)),
        (ResizeHandle::N, Point::new(cx, bounds.y0)),
        (ResizeHandle::S, Point::new(cx, bounds.y1)),
    ]
}
