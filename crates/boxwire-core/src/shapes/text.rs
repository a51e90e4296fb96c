//! Text label shape.

use super::{Edge, SerializableColor, ShapeId, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extra hit margin around the text bounds.
const HIT_MARGIN: f64 = 2.0;

/// Average glyph width as a fraction of the font size, used until the
/// renderer reports a measurement.
const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// A free-standing text label. Labels have no edges and cannot be connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub(crate) id: ShapeId,
    /// Position (top-left corner of the text bounding box).
    pub position: Point,
    content: String,
    /// Font size in pixels. Also the height of the bounds.
    pub font_size: f64,
    /// Text color.
    pub color: SerializableColor,
    /// Width reported by the renderer, with the font size it was measured at.
    #[serde(skip)]
    measured: Option<(f64, f64)>,
}

impl TextLabel {
    /// Content of a label that was committed empty.
    pub const PLACEHOLDER: &'static str = "Text";

    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Create a new text label.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            color: SerializableColor::default(),
            measured: None,
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Set the text content. Any previous measurement is dropped.
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.measured = None;
    }

    /// Record the rendered width of the current content at the current font
    /// size. Non-finite or negative widths are ignored.
    pub fn set_measured_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 && self.font_size > 0.0 {
            self.measured = Some((width, self.font_size));
        }
    }

    /// Text width if it were rendered at `font_size`.
    pub fn width_at(&self, font_size: f64) -> f64 {
        match self.measured {
            Some((width, measured_at)) => width * font_size / measured_at,
            None => self.content.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR,
        }
    }

    pub fn width(&self) -> f64 {
        self.width_at(self.font_size)
    }
}

impl ShapeTrait for TextLabel {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width(),
            self.position.y + self.font_size,
        )
    }

    fn contains(&self, point: Point) -> bool {
        let bounds = self.bounds().inflate(HIT_MARGIN, HIT_MARGIN);
        point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
    }

    fn edge_point(&self, _edge: Edge) -> Option<Point> {
        None
    }

    fn nearest_edge(&self, _point: Point, _tolerance: f64) -> Option<Edge> {
        None
    }

    fn edge_zone(&self, _point: Point, _padding: f64) -> Option<Edge> {
        None
    }

    fn move_to(&mut self, position: Point) {
        self.position = position;
    }
}
