//! Widget system for managing interactive shape states.
//!
//! This module keeps UI state apart from the document:
//! - Selection sets for shapes and connections
//! - Label editing focus and hover
//! - Resize handles for the selected shape
//!
//! Shapes remain pure data. Widgets wrap shapes with UI state.

mod handles;
mod manager;
mod state;

pub use handles::{Handle, HandleKind, handle_at, handles_for_rect};
pub use manager::WidgetManager;
pub use state::WidgetState;
