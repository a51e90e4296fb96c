//! Ellipse shape.

use super::{Edge, SerializableColor, ShapeId, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Center point.
    pub center: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Fill color.
    pub color: SerializableColor,
    /// Optional label drawn inside the ellipse.
    #[serde(default)]
    pub label: Option<String>,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x,
            radius_y,
            color: SerializableColor::default(),
            label: None,
        }
    }

    /// Create a circle.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(center, radius, radius)
    }

    /// Create an ellipse from a bounding rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.center(), rect.width() / 2.0, rect.height() / 2.0)
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    fn is_degenerate(&self) -> bool {
        !(self.radius_x > 0.0 && self.radius_y > 0.0)
    }

    /// Squared normalized distance from the center, scaled by `grow` extra
    /// units on both radii. 1.0 is on the outline.
    fn normalized_dist_sq(&self, point: Point, grow: f64) -> f64 {
        let dx = (point.x - self.center.x) / (self.radius_x + grow);
        let dy = (point.y - self.center.y) / (self.radius_y + grow);
        dx * dx + dy * dy
    }

    /// Distance from the center to the outline along the ray through `point`.
    fn outline_radius_towards(&self, point: Point) -> f64 {
        let angle = (point.y - self.center.y).atan2(point.x - self.center.x);
        let (sin, cos) = angle.sin_cos();
        let inv = (cos / self.radius_x).powi(2) + (sin / self.radius_y).powi(2);
        1.0 / inv.sqrt()
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    fn contains(&self, point: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        self.normalized_dist_sq(point, 0.0) <= 1.0
    }

    fn edge_point(&self, edge: Edge) -> Option<Point> {
        let c = self.center;
        Some(match edge {
            Edge::Top => Point::new(c.x, c.y - self.radius_y),
            Edge::Bottom => Point::new(c.x, c.y + self.radius_y),
            Edge::Left => Point::new(c.x - self.radius_x, c.y),
            Edge::Right => Point::new(c.x + self.radius_x, c.y),
        })
    }

    fn nearest_edge(&self, point: Point, tolerance: f64) -> Option<Edge> {
        if self.is_degenerate() {
            return None;
        }
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let distance = dx.hypot(dy);
        if (distance - self.outline_radius_towards(point)).abs() >= tolerance {
            return None;
        }
        Some(Edge::from_sector(dx, dy))
    }

    fn edge_zone(&self, point: Point, padding: f64) -> Option<Edge> {
        if self.is_degenerate() || self.normalized_dist_sq(point, padding) > 1.0 {
            return None;
        }
        Some(Edge::from_sector(
            point.x - self.center.x,
            point.y - self.center.y,
        ))
    }

    fn move_to(&mut self, position: Point) {
        self.center = Point::new(position.x + self.radius_x, position.y + self.radius_y);
    }
}
