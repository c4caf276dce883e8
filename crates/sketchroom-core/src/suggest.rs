//! Rule-based suggestions for the selected shape.

use crate::shapes::{Database, Icon, Shape, ShapeStyle};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Suggestion {
    AddMfaStep,
    AddReplication,
}

impl Suggestion {
    pub fn label(self) -> &'static str {
        match self {
            Suggestion::AddMfaStep => "Add MFA step",
            Suggestion::AddReplication => "Add replication",
        }
    }

    /// The shape this suggestion adds next to `target`.
    pub fn build(self, target: &Shape) -> Shape {
        let anchor = target.anchor();
        match self {
            Suggestion::AddMfaStep => Shape::Icon(Icon::new(offset(anchor, 0.05), "lock"))
                .with_style(ShapeStyle::new("#000000", 2.0)),
            Suggestion::AddReplication => Shape::Database(Database::new(offset(anchor, 0.1)))
                .with_style(ShapeStyle::new("#1976d2", 3.0)),
        }
    }
}

fn offset(anchor: Point, dx: f64) -> Point {
    anchor + Vec2::new(dx, 0.0)
}

/// Suggestions that apply to `shape`, in display order.
pub fn suggestions_for(shape: &Shape) -> Vec<Suggestion> {
    let mut out = Vec::new();
    match shape {
        Shape::Text(text) => {
            let content = text.content.to_lowercase();
            if content.contains("auth") || content.contains("login") {
                out.push(Suggestion::AddMfaStep);
            }
            if content.contains("db") || content.contains("database") {
                out.push(Suggestion::AddReplication);
            }
        }
        Shape::Icon(icon) if icon.icon == "lock" => out.push(Suggestion::AddMfaStep),
        _ => {}
    }
    out
}
