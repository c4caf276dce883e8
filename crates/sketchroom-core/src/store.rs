//! The ordered shape list plus local selection and manipulation state.

use crate::geometry::{CanvasSize, ResizeHandle};
use crate::selection::{apply_resize, ManipulationState};
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A durable change to the shape list. This is what travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShapeMutation {
    Add { shape: Shape },
    Update { shape: Shape },
    Delete { shape_id: ShapeId },
    Clear,
    ReplaceAll { shapes: Vec<Shape> },
}

/// Ordered shapes, back to front. Selection and drag state never leave this
/// process.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
    selected: Option<ShapeId>,
    manipulation: Option<ManipulationState>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape. A shape whose id already exists replaces it in place.
    pub fn add(&mut self, shape: Shape) {
        match self.index_of(shape.id()) {
            Some(i) => self.shapes[i] = shape,
            None => self.shapes.push(shape),
        }
    }

    /// Replace the shape with the same id. Returns false if there is none.
    pub fn update(&mut self, shape: Shape) -> bool {
        match self.index_of(shape.id()) {
            Some(i) => {
                self.shapes[i] = shape;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let i = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
            self.manipulation = None;
        }
        Some(self.shapes.remove(i))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selected = None;
        self.manipulation = None;
    }

    /// Replace every shape. Later duplicates of an id win.
    pub fn replace_all(&mut self, shapes: Vec<Shape>) {
        self.shapes.clear();
        for shape in shapes {
            self.add(shape);
        }
        if let Some(id) = self.selected {
            if self.index_of(id).is_none() {
                self.selected = None;
                self.manipulation = None;
            }
        }
    }

    /// Replace the contents from a history snapshot and drop the selection.
    pub fn restore(&mut self, shapes: Vec<Shape>) {
        self.replace_all(shapes);
        self.selected = None;
        self.manipulation = None;
    }

    /// Apply a mutation. Returns false when it referred to a missing shape.
    pub fn apply(&mut self, mutation: &ShapeMutation) -> bool {
        match mutation {
            ShapeMutation::Add { shape } => {
                self.add(shape.clone());
                true
            }
            ShapeMutation::Update { shape } => self.update(shape.clone()),
            ShapeMutation::Delete { shape_id } => self.remove(*shape_id).is_some(),
            ShapeMutation::Clear => {
                self.clear();
                true
            }
            ShapeMutation::ReplaceAll { shapes } => {
                self.replace_all(shapes.clone());
                true
            }
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn to_vec(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Topmost shape under a pixel-space point.
    pub fn shape_at(&self, point: Point, size: CanvasSize) -> Option<&Shape> {
        self.shapes.iter().rev().find(|s| s.hit_test(point, size))
    }

    /// Select a shape, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<ShapeId>) {
        self.selected = id.filter(|id| self.index_of(*id).is_some());
        self.manipulation = None;
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Shape> {
        let id = self.selected?;
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    pub fn manipulation(&self) -> Option<&ManipulationState> {
        self.manipulation.as_ref()
    }

    /// Start moving the selected shape. Returns false with nothing selected.
    pub fn begin_drag(&mut self, pointer: Point, size: CanvasSize) -> bool {
        let Some(shape) = self.selected().cloned() else {
            return false;
        };
        self.manipulation = Some(ManipulationState::new(shape, None, pointer, size));
        true
    }

    /// Move the dragged shape by the delta from the previous pointer sample.
    pub fn drag_to(&mut self, pointer: Point, size: CanvasSize) -> Option<Shape> {
        let state = self.manipulation.as_mut().filter(|m| !m.is_resize())?;
        let id = state.shape_id;
        let delta = size.delta_to_normalized(state.advance(pointer));
        let shape = self.shapes.iter_mut().find(|s| s.id() == id)?;
        shape.translate(delta);
        Some(shape.clone())
    }

    /// Start resizing the selected shape by `handle`.
    pub fn begin_resize(&mut self, handle: ResizeHandle, pointer: Point, size: CanvasSize) -> bool {
        let Some(shape) = self.selected().cloned() else {
            return false;
        };
        if !shape.is_resizable() {
            return false;
        }
        self.manipulation = Some(ManipulationState::new(shape, Some(handle), pointer, size));
        true
    }

    /// Resize relative to the shape and bounds captured at resize start.
    pub fn resize_to(&mut self, pointer: Point, size: CanvasSize) -> Option<Shape> {
        let state = self.manipulation.as_mut()?;
        let handle = state.handle?;
        state.advance(pointer);
        let resized = apply_resize(
            &state.original_shape,
            handle,
            state.start_bounds,
            state.delta(),
            pointer,
            size,
        )?;
        self.update(resized.clone()).then_some(resized)
    }

    /// Finish any drag or resize. True if one was active.
    pub fn end_manipulation(&mut self) -> bool {
        self.manipulation.take().is_some()
    }

    fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }
}
