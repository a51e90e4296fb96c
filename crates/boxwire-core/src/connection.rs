//! Edge-to-edge connectors.

use crate::shapes::{Edge, SerializableColor, ShapeId, is_finite_point, point_to_segment_dist};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for connections.
pub type ConnectionId = Uuid;

/// Which ends of a connector carry an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Arrow at the `to` end.
    #[default]
    Forward,
    /// Arrow at the `from` end.
    Backward,
    /// Arrows at both ends.
    Both,
    /// Plain line.
    None,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Both => "both",
            Direction::None => "none",
        }
    }

    pub fn arrow_at_start(self) -> bool {
        matches!(self, Direction::Backward | Direction::Both)
    }

    pub fn arrow_at_end(self) -> bool {
        matches!(self, Direction::Forward | Direction::Both)
    }
}

/// A named edge of a specific shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeAnchor {
    pub shape_id: ShapeId,
    pub edge: Edge,
}

impl EdgeAnchor {
    pub fn new(shape_id: ShapeId, edge: Edge) -> Self {
        Self { shape_id, edge }
    }
}

/// A directional connector between two shape edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub from: EdgeAnchor,
    pub to: EdgeAnchor,
    pub direction: Direction,
    pub color: SerializableColor,
}

impl Connection {
    pub fn new(
        from: EdgeAnchor,
        to: EdgeAnchor,
        direction: Direction,
        color: SerializableColor,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            direction,
            color,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether either end is attached to `shape_id`.
    pub fn references(&self, shape_id: ShapeId) -> bool {
        self.from.shape_id == shape_id || self.to.shape_id == shape_id
    }

    /// Whether either end sits on the given edge.
    pub fn uses(&self, anchor: EdgeAnchor) -> bool {
        self.from == anchor || self.to == anchor
    }

    /// Edges of `shape_id` this connection occupies.
    pub fn edges_on(&self, shape_id: ShapeId) -> impl Iterator<Item = Edge> + '_ {
        [self.from, self.to]
            .into_iter()
            .filter(move |anchor| anchor.shape_id == shape_id)
            .map(|anchor| anchor.edge)
    }
}

/// Whether `point` lies within `tolerance` of the segment `from`-`to`.
///
/// Points strictly within `exclusion_radius` of either endpoint never count,
/// so clicks there reach the edge beneath instead.
pub fn is_near(from: Point, to: Point, point: Point, tolerance: f64, exclusion_radius: f64) -> bool {
    if !is_finite_point(point) || !is_finite_point(from) || !is_finite_point(to) {
        return false;
    }
    if (point - from).hypot() < exclusion_radius || (point - to).hypot() < exclusion_radius {
        return false;
    }
    point_to_segment_dist(point, from, to) <= tolerance
}

/// Midpoint of the segment between two edge points.
pub fn midpoint(from: Point, to: Point) -> Point {
    from.midpoint(to)
}
