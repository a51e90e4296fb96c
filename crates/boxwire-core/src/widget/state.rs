//! Widget state definitions.

use serde::{Deserialize, Serialize};

/// The UI state of a shape, as the renderer should draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WidgetState {
    /// Normal display state - no interaction.
    #[default]
    Normal,
    /// Pointer is hovering over the shape.
    Hovered,
    /// Shape is selected (shows handles, can be moved/resized).
    Selected,
    /// Shape label is being edited.
    Editing,
}

impl WidgetState {
    /// Check if the shape is selected (either just selected or editing).
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::Editing)
    }

    /// Check if the shape is in editing mode.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }
}
