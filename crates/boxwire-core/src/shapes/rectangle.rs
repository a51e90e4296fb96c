//! Box shape.

use super::{Edge, GroupId, SerializableColor, ShapeId, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned box. Boxes are the only kind that can be split and grouped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the box.
    pub width: f64,
    /// Height of the box.
    pub height: f64,
    /// Fill color.
    pub color: SerializableColor,
    /// Optional label drawn inside the box.
    #[serde(default)]
    pub label: Option<String>,
    /// Group shared with the other halves of a split.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Edges created by a split. These never accept user connections.
    #[serde(default)]
    pub seams: Vec<Edge>,
}

impl Rectangle {
    /// Create a new box.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            color: SerializableColor::default(),
            label: None,
            group_id: None,
            seams: Vec::new(),
        }
    }

    /// Create a box from a rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    /// Get the box as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    pub(crate) fn add_seam(&mut self, edge: Edge) {
        if !self.seams.contains(&edge) {
            self.seams.push(edge);
        }
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn contains(&self, point: Point) -> bool {
        within_inclusive(self.as_rect(), point)
    }

    fn edge_point(&self, edge: Edge) -> Option<Point> {
        let rect = self.as_rect();
        let center = rect.center();
        Some(match edge {
            Edge::Top => Point::new(center.x, rect.y0),
            Edge::Bottom => Point::new(center.x, rect.y1),
            Edge::Left => Point::new(rect.x0, center.y),
            Edge::Right => Point::new(rect.x1, center.y),
        })
    }

    fn nearest_edge(&self, point: Point, tolerance: f64) -> Option<Edge> {
        let rect = self.as_rect();
        let center = rect.center();
        let dx = (point.x - center.x).abs();
        let dy = (point.y - center.y).abs();
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;

        let candidates = [
            (Edge::Left, (point.x - rect.x0).abs(), dy < half_h),
            (Edge::Right, (point.x - rect.x1).abs(), dy < half_h),
            (Edge::Top, (point.y - rect.y0).abs(), dx < half_w),
            (Edge::Bottom, (point.y - rect.y1).abs(), dx < half_w),
        ];
        candidates
            .into_iter()
            .filter(|&(_, dist, along)| along && dist < tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(edge, _, _)| edge)
    }

    fn edge_zone(&self, point: Point, padding: f64) -> Option<Edge> {
        if !within_inclusive(self.as_rect().inflate(padding, padding), point) {
            return None;
        }
        let center = self.as_rect().center();
        let dx = point.x - center.x;
        let dy = point.y - center.y;
        Some(match (dx <= 0.0, dy <= 0.0) {
            (true, true) => Edge::Top,
            (false, true) => Edge::Right,
            (true, false) => Edge::Left,
            (false, false) => Edge::Bottom,
        })
    }

    fn move_to(&mut self, position: Point) {
        self.position = position;
    }
}

/// kurbo's `Rect::contains` is half-open; box hits include the far border.
pub(crate) fn within_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}
