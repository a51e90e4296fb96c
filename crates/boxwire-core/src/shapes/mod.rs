//! Shape definitions and per-kind hit-testing.

mod ellipse;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;
pub use text::TextLabel;

use crate::widget::{Handle, handles_for_rect};
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Default ambient color for new shapes and connectors.
    pub fn accent() -> Self {
        Self::new(0x66, 0x7e, 0xea, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::accent()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Identifier shared by the boxes of one split group.
pub type GroupId = Uuid;

/// One of the four named attachment points of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// The edge facing this one across a shared side.
    pub fn opposite(self) -> Self {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }

    /// Edge owning the 90 degree sector that contains `(dx, dy)`.
    ///
    /// Sectors are centered on the axes with y pointing down: 45..135 is
    /// bottom, 135..225 left, 225..315 top and everything else right.
    pub(crate) fn from_sector(dx: f64, dy: f64) -> Self {
        let degrees = (dy.atan2(dx).to_degrees() + 360.0) % 360.0;
        if (45.0..135.0).contains(&degrees) {
            Edge::Bottom
        } else if (135.0..225.0).contains(&degrees) {
            Edge::Left
        } else if (225.0..315.0).contains(&degrees) {
            Edge::Top
        } else {
            Edge::Right
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of shape the placement collaborator can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Box,
    Ellipse,
    Text,
}

/// Distance from a point to a line segment (a to b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

pub(crate) fn is_finite_point(point: Point) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

/// Capabilities shared by every shape kind.
///
/// The edge queries here are geometric only. Seam and occupancy exclusions
/// are applied once, by [`Shape::edge_at`] and
/// [`Shape::best_edge_for_connection`].
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) lies on the shape body.
    fn contains(&self, point: Point) -> bool;

    /// Attachment point of the named edge, if the kind has edges.
    fn edge_point(&self, edge: Edge) -> Option<Point>;

    /// Edge whose outline lies within `tolerance` of the point.
    fn nearest_edge(&self, point: Point, tolerance: f64) -> Option<Edge>;

    /// Edge zone containing the point, within `padding` around the shape.
    fn edge_zone(&self, point: Point, padding: f64) -> Option<Edge>;

    /// Move the shape so its bounds start at `position`.
    fn move_to(&mut self, position: Point);
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(TextLabel),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Text(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_trait().id()
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Box,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn contains(&self, point: Point) -> bool {
        is_finite_point(point) && self.as_trait().contains(point)
    }

    pub fn edge_point(&self, edge: Edge) -> Option<Point> {
        self.as_trait().edge_point(edge)
    }

    /// Whether this kind can anchor connections at all.
    pub fn has_edges(&self) -> bool {
        !matches!(self, Shape::Text(_))
    }

    /// Whether `edge` was created by a split.
    pub fn is_seam(&self, edge: Edge) -> bool {
        match self {
            Shape::Rectangle(r) => r.seams.contains(&edge),
            _ => false,
        }
    }

    /// Edge near the point, or `None` if that edge is a seam or listed in
    /// `occupied`.
    pub fn edge_at(&self, point: Point, tolerance: f64, occupied: &[Edge]) -> Option<Edge> {
        if !is_finite_point(point) || !tolerance.is_finite() {
            return None;
        }
        let edge = self.as_trait().nearest_edge(point, tolerance)?;
        self.available(edge, occupied)
    }

    /// Edge zone used while a connection is being anchored.
    pub fn best_edge_for_connection(
        &self,
        point: Point,
        padding: f64,
        occupied: &[Edge],
    ) -> Option<Edge> {
        if !is_finite_point(point) || !padding.is_finite() {
            return None;
        }
        let edge = self.as_trait().edge_zone(point, padding)?;
        self.available(edge, occupied)
    }

    fn available(&self, edge: Edge, occupied: &[Edge]) -> Option<Edge> {
        if self.is_seam(edge) || occupied.contains(&edge) {
            None
        } else {
            Some(edge)
        }
    }

    /// Resize handles laid out on the padded bounds.
    pub fn resize_handles(&self, padding: f64) -> Vec<Handle> {
        let corners_only = matches!(self, Shape::Text(_));
        handles_for_rect(self.bounds(), padding, corners_only)
    }

    /// Top-left corner of the bounds.
    pub fn position(&self) -> Point {
        self.bounds().origin()
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            Shape::Rectangle(s) => s.move_to(position),
            Shape::Ellipse(s) => s.move_to(position),
            Shape::Text(s) => s.move_to(position),
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            Shape::Rectangle(s) => s.color,
            Shape::Ellipse(s) => s.color,
            Shape::Text(s) => s.color,
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        match self {
            Shape::Rectangle(s) => s.color = color,
            Shape::Ellipse(s) => s.color = color,
            Shape::Text(s) => s.color = color,
        }
    }

    /// Label text shown on the shape.
    pub fn label(&self) -> Option<&str> {
        match self {
            Shape::Rectangle(s) => s.label.as_deref(),
            Shape::Ellipse(s) => s.label.as_deref(),
            Shape::Text(s) => Some(s.content()),
        }
    }

    /// Store a committed label. Surrounding whitespace is dropped; an empty
    /// text label falls back to its placeholder.
    pub fn set_label(&mut self, text: &str) {
        let text = text.trim();
        let label = (!text.is_empty()).then(|| text.to_string());
        match self {
            Shape::Rectangle(s) => s.label = label,
            Shape::Ellipse(s) => s.label = label,
            Shape::Text(s) => {
                s.set_content(label.unwrap_or_else(|| TextLabel::PLACEHOLDER.to_string()))
            }
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Shape::Rectangle(r) => r.group_id,
            _ => None,
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Shape::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_rectangle_mut(&mut self) -> Option<&mut Rectangle> {
        match self {
            Shape::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLabel> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Replace the extent of a box or ellipse with `rect`.
    ///
    /// Text labels derive their size from the font and ignore this.
    pub fn set_bounds(&mut self, rect: Rect) {
        match self {
            Shape::Rectangle(r) => {
                r.position = rect.origin();
                r.width = rect.width();
                r.height = rect.height();
            }
            Shape::Ellipse(e) => {
                e.center = rect.center();
                e.radius_x = rect.width() / 2.0;
                e.radius_y = rect.height() / 2.0;
            }
            Shape::Text(_) => {}
        }
    }
}
