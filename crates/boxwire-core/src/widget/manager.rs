//! Widget manager for tracking UI state of shapes and connections.

use super::state::WidgetState;
use crate::connection::ConnectionId;
use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Manages selection, hover and editing focus.
///
/// This separates UI concerns from the pure document data. Shapes and
/// connections are selected independently of each other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetManager {
    /// Currently selected shapes.
    selected: HashSet<ShapeId>,
    /// Currently selected connections.
    selected_connections: HashSet<ConnectionId>,
    /// Shape whose label is being edited.
    editing: Option<ShapeId>,
    /// Shape currently under the pointer.
    hovered: Option<ShapeId>,
}

impl WidgetManager {
    /// Create a new widget manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of a shape.
    pub fn state(&self, id: ShapeId) -> WidgetState {
        if self.editing == Some(id) {
            WidgetState::Editing
        } else if self.selected.contains(&id) {
            WidgetState::Selected
        } else if self.hovered == Some(id) {
            WidgetState::Hovered
        } else {
            WidgetState::Normal
        }
    }

    /// Check if a shape is selected.
    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selected.contains(&id)
    }

    /// Get all selected shape IDs.
    pub fn selected(&self) -> &HashSet<ShapeId> {
        &self.selected
    }

    /// The selected shape when exactly one is selected.
    pub fn single_selected(&self) -> Option<ShapeId> {
        if self.selected.len() == 1 {
            self.selected.iter().next().copied()
        } else {
            None
        }
    }

    /// Select a single shape (clears other shape selections).
    pub fn select(&mut self, id: ShapeId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    /// Add a shape to the selection.
    pub fn add_to_selection(&mut self, id: ShapeId) {
        self.selected.insert(id);
    }

    /// Flip a shape's membership. Returns whether it is now selected.
    pub fn toggle(&mut self, id: ShapeId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Clear the shape selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_connection_selected(&self, id: ConnectionId) -> bool {
        self.selected_connections.contains(&id)
    }

    /// Get all selected connection IDs.
    pub fn selected_connections(&self) -> &HashSet<ConnectionId> {
        &self.selected_connections
    }

    /// The selected connection when exactly one is selected.
    pub fn single_selected_connection(&self) -> Option<ConnectionId> {
        if self.selected_connections.len() == 1 {
            self.selected_connections.iter().next().copied()
        } else {
            None
        }
    }

    /// Select a single connection (clears other connection selections).
    pub fn select_connection(&mut self, id: ConnectionId) {
        self.selected_connections.clear();
        self.selected_connections.insert(id);
    }

    pub fn add_connection_to_selection(&mut self, id: ConnectionId) {
        self.selected_connections.insert(id);
    }

    /// Flip a connection's membership. Returns whether it is now selected.
    pub fn toggle_connection(&mut self, id: ConnectionId) -> bool {
        if self.selected_connections.remove(&id) {
            false
        } else {
            self.selected_connections.insert(id);
            true
        }
    }

    pub fn clear_connection_selection(&mut self) {
        self.selected_connections.clear();
    }

    /// Clear both selection sets.
    pub fn clear_all(&mut self) {
        self.selected.clear();
        self.selected_connections.clear();
    }

    /// Whether anything at all is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty() || !self.selected_connections.is_empty()
    }

    /// Enter label editing for a shape. The shape joins the selection.
    pub fn enter_editing(&mut self, id: ShapeId) {
        self.selected.insert(id);
        self.editing = Some(id);
    }

    /// Leave editing mode, returning the shape that was being edited.
    pub fn exit_editing(&mut self) -> Option<ShapeId> {
        self.editing.take()
    }

    /// Get the shape being edited (if any).
    pub fn editing(&self) -> Option<ShapeId> {
        self.editing
    }

    /// Check if currently in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Check if a specific shape is being edited.
    pub fn is_editing_shape(&self, id: ShapeId) -> bool {
        self.editing == Some(id)
    }

    /// Get the hovered shape ID (if any).
    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    /// Set the hovered shape.
    pub fn set_hovered(&mut self, id: Option<ShapeId>) {
        self.hovered = id;
    }

    /// Remove state for a deleted shape.
    pub fn remove(&mut self, id: ShapeId) {
        self.selected.remove(&id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    /// Remove state for a deleted connection.
    pub fn remove_connection(&mut self, id: ConnectionId) {
        self.selected_connections.remove(&id);
    }

    /// Drop everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
