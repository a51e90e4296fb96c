//! Tool system for the diagram editor.

use crate::config::EditorConfig;
use crate::shapes::{Ellipse, Rectangle, SerializableColor, Shape, ShapeKind, TextLabel};
use crate::snap::snap_point;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Click to select, drag to move, drag handles to resize, click edges to
    /// connect, drag empty canvas to pan.
    #[default]
    Select,
    /// Draw a freeform selection polygon.
    Lasso,
    /// Click to create a text label.
    Text,
}

/// Manages the current tool, the armed placement and the ambient color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Shape kind the next primary click will place, if any.
    armed: Option<ShapeKind>,
    /// Color applied to new shapes and connectors.
    pub current_color: SerializableColor,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            armed: None,
            current_color: SerializableColor::accent(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any armed placement is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.armed = None;
    }

    /// Arm a one-shot placement of `kind`.
    pub fn arm(&mut self, kind: ShapeKind) {
        self.armed = Some(kind);
    }

    pub fn armed(&self) -> Option<ShapeKind> {
        self.armed
    }

    /// Consume the armed placement.
    pub fn take_armed(&mut self) -> Option<ShapeKind> {
        self.armed.take()
    }

    /// Build a shape of `kind` centered on `center`.
    ///
    /// Boxes and ellipses have their top-left corner grid-snapped when
    /// placement snapping is enabled. Text labels start at `center` as given.
    pub fn create_shape(&self, kind: ShapeKind, center: Point, config: &EditorConfig) -> Shape {
        let color = self.current_color;
        match kind {
            ShapeKind::Box => {
                let half = Vec2::new(config.default_box_width / 2.0, config.default_box_height / 2.0);
                let origin = snap_point(center - half, config.snap_placement, config.grid_pitch);
                Shape::Rectangle(
                    Rectangle::new(origin, config.default_box_width, config.default_box_height)
                        .with_color(color),
                )
            }
            ShapeKind::Ellipse => {
                let radius = config.default_ellipse_radius;
                let origin = snap_point(
                    center - Vec2::new(radius, radius),
                    config.snap_placement,
                    config.grid_pitch,
                );
                let center = origin + Vec2::new(radius, radius);
                Shape::Ellipse(Ellipse::circle(center, radius).with_color(color))
            }
            ShapeKind::Text => Shape::Text(
                TextLabel::new(center, TextLabel::PLACEHOLDER.to_string())
                    .with_font_size(config.default_font_size)
                    .with_color(color),
            ),
        }
    }
}
