//! Tool system for the whiteboard.
//!
//! The tool manager owns the local in-progress shape while the pointer is
//! down. Points handed to it are normalized.

use crate::shapes::{Circle, Line, Pencil, Rectangle, Shape, ShapeStyle, Text, FONT_SIZE_PER_STROKE};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pencil,
    Rectangle,
    Circle,
    Line,
    Text,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Pointer is down and a shape is being drawn.
    Drawing { preview: Shape },
    /// Waiting for text to be entered at a position.
    Typing { position: Point },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Style applied to new shapes.
    pub current_style: ShapeStyle,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any interaction in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Begin an interaction at `point`.
    ///
    /// Drawing tools start a preview shape, which is returned. The text tool
    /// switches to [`ToolState::Typing`].
    pub fn begin(&mut self, point: Point) -> Option<&Shape> {
        let preview = match self.current_tool {
            ToolKind::Select => return None,
            ToolKind::Text => {
                self.state = ToolState::Typing { position: point };
                return None;
            }
            ToolKind::Pencil => Shape::Pencil(Pencil::from_points(vec![point])),
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::new(point, point)),
            ToolKind::Circle => Shape::Circle(Circle::new(point, point)),
            ToolKind::Line => Shape::Line(Line::new(point, point)),
        };
        self.state = ToolState::Drawing {
            preview: preview.with_style(self.current_style.clone()),
        };
        self.preview()
    }

    /// Grow the preview: pencils append, other shapes move their end point.
    pub fn extend(&mut self, point: Point) -> Option<&Shape> {
        let ToolState::Drawing { preview } = &mut self.state else {
            return None;
        };
        match preview {
            Shape::Pencil(p) => p.push(point),
            Shape::Rectangle(r) => r.end = point,
            Shape::Circle(c) => c.end = point,
            Shape::Line(l) => l.end = point,
            Shape::Text(_) | Shape::Icon(_) | Shape::Database(_) => {}
        }
        Some(preview)
    }

    /// Finish drawing and hand back the completed shape.
    pub fn finish(&mut self) -> Option<Shape> {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing { preview } => Some(preview),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    pub fn preview(&self) -> Option<&Shape> {
        match &self.state {
            ToolState::Drawing { preview } => Some(preview),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, ToolState::Drawing { .. })
    }

    pub fn typing_position(&self) -> Option<Point> {
        match self.state {
            ToolState::Typing { position } => Some(position),
            _ => None,
        }
    }

    /// Build a text shape in the current style. Blank content yields `None`.
    pub fn make_text(&self, position: Point, content: &str) -> Option<Shape> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let font_size = self.current_style.stroke_width * FONT_SIZE_PER_STROKE;
        let text = Text::new(position, content.to_string(), font_size);
        Some(Shape::Text(text).with_style(self.current_style.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_is_select() {
        let mut tools = ToolManager::new();
        assert_eq!(tools.current_tool, ToolKind::Select);
        assert!(tools.begin(Point::new(0.5, 0.5)).is_none());
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_pencil_appends_points() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Pencil);
        tools.begin(Point::new(0.1, 0.1));
        tools.extend(Point::new(0.2, 0.2));
        tools.extend(Point::new(0.3, 0.3));
        let Some(Shape::Pencil(p)) = tools.finish() else {
            panic!("expected pencil");
        };
        assert_eq!(p.points.len(), 3);
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_rectangle_end_follows_pointer() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Rectangle);
        tools.current_style = ShapeStyle::new("#45B7D1", 3.0);
        tools.begin(Point::new(0.1, 0.1));
        tools.extend(Point::new(0.2, 0.2));
        tools.extend(Point::new(0.4, 0.3));
        let Some(Shape::Rectangle(r)) = tools.finish() else {
            panic!("expected rectangle");
        };
        assert_eq!(r.start, Point::new(0.1, 0.1));
        assert_eq!(r.end, Point::new(0.4, 0.3));
        assert_eq!(r.style.color, "#45B7D1");
    }

    #[test]
    fn test_text_tool_types() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Text);
        tools.begin(Point::new(0.3, 0.4));
        assert_eq!(tools.typing_position(), Some(Point::new(0.3, 0.4)));
        assert!(tools.finish().is_none());
        assert_eq!(tools.typing_position(), Some(Point::new(0.3, 0.4)));
    }

    #[test]
    fn test_make_text_font_from_stroke() {
        let mut tools = ToolManager::new();
        tools.current_style.stroke_width = 4.0;
        let Some(Shape::Text(t)) = tools.make_text(Point::new(0.1, 0.1), "login") else {
            panic!("expected text");
        };
        assert!((t.font_size - 0.02).abs() < 1e-12);
        assert!(tools.make_text(Point::ZERO, "   ").is_none());
    }

    #[test]
    fn test_tool_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ToolKind::Circle).unwrap(), "\"circle\"");
    }
}
