//! Drag and resize manipulation of the selected shape.

use crate::geometry::{CanvasSize, ResizeHandle};
use crate::shapes::{Shape, ShapeId, MIN_FONT_SIZE};
use kurbo::{Point, Rect, Vec2};

/// Smallest radius, in pixels, a circle resize may produce.
pub const MIN_CIRCLE_RADIUS: f64 = 10.0;

/// State for an in-progress drag or resize of a single shape.
///
/// Pointer positions are in pixel space.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    /// The shape being manipulated.
    pub shape_id: ShapeId,
    /// The handle being dragged (None = moving the whole shape).
    pub handle: Option<ResizeHandle>,
    /// Pointer position when the manipulation began.
    pub start_point: Point,
    /// Most recent pointer sample.
    pub last_point: Point,
    /// Pixel bounds of the shape when the manipulation began.
    pub start_bounds: Rect,
    /// Shape as it was when the manipulation began.
    pub original_shape: Shape,
}

impl ManipulationState {
    pub fn new(
        original_shape: Shape,
        handle: Option<ResizeHandle>,
        start_point: Point,
        size: CanvasSize,
    ) -> Self {
        Self {
            shape_id: original_shape.id(),
            handle,
            start_point,
            last_point: start_point,
            start_bounds: original_shape.bounds(size),
            original_shape,
        }
    }

    pub fn is_resize(&self) -> bool {
        self.handle.is_some()
    }

    /// Total pointer delta since the manipulation began.
    pub fn delta(&self) -> Vec2 {
        self.last_point - self.start_point
    }

    /// Record a new pointer sample and return the delta from the previous one.
    pub fn advance(&mut self, point: Point) -> Vec2 {
        let step = point - self.last_point;
        self.last_point = point;
        step
    }
}

/// Resize `original` by dragging `handle` by the pixel `delta`.
///
/// `start_bounds` are the original's pixel bounds at drag start and `pointer`
/// is the current pixel pointer position. Returns `None` for shapes that
/// cannot be resized.
pub fn apply_resize(
    original: &Shape,
    handle: ResizeHandle,
    start_bounds: Rect,
    delta: Vec2,
    pointer: Point,
    size: CanvasSize,
) -> Option<Shape> {
    let mut shape = original.clone();
    match &mut shape {
        Shape::Rectangle(rect) => {
            // Corners are normalized first so `start` is always top-left.
            rect.start = size.to_normalized(Point::new(start_bounds.x0, start_bounds.y0));
            rect.end = size.to_normalized(Point::new(start_bounds.x1, start_bounds.y1));
            resize_edges(&mut rect.start, &mut rect.end, handle, start_bounds, delta, size);
        }
        Shape::Line(line) => {
            resize_edges(&mut line.start, &mut line.end, handle, start_bounds, delta, size);
        }
        Shape::Circle(circle) => {
            let center = circle.center(size);
            let r = pointer.distance(center).max(MIN_CIRCLE_RADIUS);
            circle.end = size.to_normalized(center + Vec2::new(r, r));
        }
        Shape::Text(text) => {
            let width = start_bounds.width();
            let scale = if width > f64::EPSILON {
                delta.x.abs() / width + 1.0
            } else {
                1.0
            };
            text.font_size = (text.font_size * scale.max(0.5)).max(MIN_FONT_SIZE);
        }
        Shape::Pencil(_) | Shape::Icon(_) | Shape::Database(_) => return None,
    }
    Some(shape)
}

fn resize_edges(
    start: &mut Point,
    end: &mut Point,
    handle: ResizeHandle,
    b: Rect,
    delta: Vec2,
    size: CanvasSize,
) {
    let norm = |value: f64, extent: f64| {
        if extent.abs() < f64::EPSILON {
            0.0
        } else {
            value / extent
        }
    };
    if handle.has_north() {
        start.y = norm(b.y0 + delta.y, size.height);
    }
    if handle.has_south() {
        end.y = norm(b.y1 + delta.y, size.height);
    }
    if handle.has_west() {
        start.x = norm(b.x0 + delta.x, size.width);
    }
    if handle.has_east() {
        end.x = norm(b.x1 + delta.x, size.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Pencil, Rectangle, Text};

    fn size() -> CanvasSize {
        CanvasSize::new(1000.0, 1000.0)
    }

    fn resize(shape: &Shape, handle: ResizeHandle, from: Point, to: Point) -> Option<Shape> {
        let state = ManipulationState::new(shape.clone(), Some(handle), from, size());
        apply_resize(
            &state.original_shape,
            handle,
            state.start_bounds,
            to - from,
            to,
            size(),
        )
    }

    #[test]
    fn test_resize_se_moves_end_only() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(0.2, 0.2), Point::new(0.6, 0.6)));
        let resized = resize(
            &rect,
            ResizeHandle::Se,
            Point::new(600.0, 600.0),
            Point::new(700.0, 700.0),
        )
        .unwrap();
        let Shape::Rectangle(r) = resized else {
            panic!("expected rectangle");
        };
        assert!((r.end.x - 0.7).abs() < 1e-9);
        assert!((r.end.y - 0.7).abs() < 1e-9);
        assert!((r.start.x - 0.2).abs() < 1e-9);
        assert!((r.start.y - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_resize_n_moves_top_only() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(0.2, 0.2), Point::new(0.6, 0.6)));
        let resized = resize(
            &rect,
            ResizeHandle::N,
            Point::new(400.0, 200.0),
            Point::new(450.0, 100.0),
        )
        .unwrap();
        let Shape::Rectangle(r) = resized else {
            panic!("expected rectangle");
        };
        assert!((r.start.y - 0.1).abs() < 1e-9);
        assert!((r.start.x - 0.2).abs() < 1e-9);
        assert!((r.end.x - 0.6).abs() < 1e-9);
        assert!((r.end.y - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_id() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(0.2, 0.2), Point::new(0.6, 0.6)));
        let resized = resize(&rect, ResizeHandle::W, Point::new(200.0, 400.0), Point::new(100.0, 400.0))
            .unwrap();
        assert_eq!(resized.id(), rect.id());
    }

    #[test]
    fn test_resize_circle_has_min_radius() {
        let circle = Shape::Circle(Circle::new(Point::new(0.5, 0.5), Point::new(0.6, 0.5)));
        let resized = resize(
            &circle,
            ResizeHandle::E,
            Point::new(600.0, 500.0),
            Point::new(502.0, 500.0),
        )
        .unwrap();
        let Shape::Circle(c) = resized else {
            panic!("expected circle");
        };
        assert!((c.end.x - 0.51).abs() < 1e-9);
        assert!((c.end.y - 0.51).abs() < 1e-9);
    }

    #[test]
    fn test_resize_circle_follows_pointer() {
        let circle = Shape::Circle(Circle::new(Point::new(0.5, 0.5), Point::new(0.6, 0.5)));
        let resized = resize(
            &circle,
            ResizeHandle::E,
            Point::new(600.0, 500.0),
            Point::new(700.0, 500.0),
        )
        .unwrap();
        let Shape::Circle(c) = resized else {
            panic!("expected circle");
        };
        assert!((c.end.x - 0.7).abs() < 1e-9);
        assert!((c.end.y - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_resize_text_scales_font() {
        // 4 glyphs at 0.02 -> 40px wide
        let text = Shape::Text(Text::new(Point::new(0.1, 0.5), "abcd".into(), 0.02));
        let resized = resize(
            &text,
            ResizeHandle::E,
            Point::new(140.0, 490.0),
            Point::new(180.0, 490.0),
        )
        .unwrap();
        let Shape::Text(t) = resized else {
            panic!("expected text");
        };
        assert!((t.font_size - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_pencil_not_resizable() {
        let pencil = Shape::Pencil(Pencil::from_points(vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)]));
        assert!(resize(&pencil, ResizeHandle::Se, Point::new(200.0, 200.0), Point::new(300.0, 300.0)).is_none());
    }

    #[test]
    fn test_advance_tracks_previous_sample() {
        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, Point::new(0.1, 0.1)));
        let mut state = ManipulationState::new(rect, None, Point::new(10.0, 10.0), size());
        assert_eq!(state.advance(Point::new(15.0, 10.0)), Vec2::new(5.0, 0.0));
        assert_eq!(state.advance(Point::new(15.0, 20.0)), Vec2::new(0.0, 10.0));
        assert_eq!(state.delta(), Vec2::new(5.0, 10.0));
        assert!(!state.is_resize());
    }
}
