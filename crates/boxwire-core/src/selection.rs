//! Lasso containment and manipulation math.

use crate::shapes::{ShapeId, TextLabel, is_finite_point};
use crate::snap::snap_point;
use crate::widget::HandleKind;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Even-odd ray casting test.
///
/// Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 || !is_finite_point(point) {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A completed lasso polygon kept on screen after selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LassoFrame {
    /// Vertices in world coordinates.
    pub points: Vec<Point>,
}

impl LassoFrame {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.points)
    }

    /// Frame shifted by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.points.iter().map(|&p| p + delta).collect())
    }
}

/// Move the bound edges named by `handle` by `delta`, never shrinking below
/// `min_size`. When the floor is hit, the opposite edge stays where it was.
pub fn resize_rect(rect: Rect, handle: HandleKind, delta: Vec2, min_size: f64) -> Rect {
    let (mut x, mut width) = (rect.x0, rect.width());
    let (mut y, mut height) = (rect.y0, rect.height());

    if handle.moves_left() {
        width = rect.width() - delta.x;
        if width < min_size {
            width = min_size;
            x = rect.x1 - min_size;
        } else {
            x = rect.x0 + delta.x;
        }
    } else if handle.moves_right() {
        width = (rect.width() + delta.x).max(min_size);
    }

    if handle.moves_top() {
        height = rect.height() - delta.y;
        if height < min_size {
            height = min_size;
            y = rect.y1 - min_size;
        } else {
            y = rect.y0 + delta.y;
        }
    } else if handle.moves_bottom() {
        height = (rect.height() + delta.y).max(min_size);
    }

    Rect::new(x, y, x + width, y + height)
}

/// Map `member` from `old_group` into `new_group`, scaling its offset from
/// the group origin and its extent per axis.
pub fn scale_into(member: Rect, old_group: Rect, new_group: Rect) -> Rect {
    let ratio = |new: f64, old: f64| if old > 0.0 { new / old } else { 1.0 };
    let sx = ratio(new_group.width(), old_group.width());
    let sy = ratio(new_group.height(), old_group.height());
    let x = new_group.x0 + (member.x0 - old_group.x0) * sx;
    let y = new_group.y0 + (member.y0 - old_group.y0) * sy;
    Rect::new(x, y, x + member.width() * sx, y + member.height() * sy)
}

/// Resize a text label from a corner handle.
///
/// Vertical motion drives the font size (`s*` handles grow with +dy, `n*`
/// with -dy); the corner opposite the handle stays fixed.
pub fn resize_text(
    original: &TextLabel,
    handle: HandleKind,
    delta: Vec2,
    min_font_size: f64,
) -> (Point, f64) {
    let bounds = Rect::new(
        original.position.x,
        original.position.y,
        original.position.x + original.width(),
        original.position.y + original.font_size,
    );
    let grow = if handle.moves_top() { -delta.y } else { delta.y };
    let font_size = (original.font_size + grow).max(min_font_size);
    let width = original.width_at(font_size);

    let x = if handle.moves_left() { bounds.x1 - width } else { bounds.x0 };
    let y = if handle.moves_top() { bounds.y1 - font_size } else { bounds.y0 };
    (Point::new(x, y), font_size)
}

/// Start positions captured when a drag begins.
///
/// Each leader is a selected shape; grouped boxes contribute one leader per
/// group and the other members follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMoveState {
    /// Pointer position where the drag started (world).
    pub start_point: Point,
    /// Shape position (bounds origin) at drag start.
    pub origins: HashMap<ShapeId, Point>,
    /// Leaders in z-order with the shapes that move rigidly with them.
    pub leaders: Vec<(ShapeId, Vec<ShapeId>)>,
    /// Lasso frame at drag start, when dragging from inside one.
    pub frame: Option<LassoFrame>,
}

impl MultiMoveState {
    pub fn new(start_point: Point) -> Self {
        Self {
            start_point,
            origins: HashMap::new(),
            leaders: Vec::new(),
            frame: None,
        }
    }

    /// Drag delta for the given pointer position.
    pub fn delta(&self, current: Point) -> Vec2 {
        current - self.start_point
    }

    /// New positions for every moved shape.
    ///
    /// Leaders land on `origin + delta`, snapped when `snap` is set; their
    /// followers take the leader's effective displacement unchanged.
    pub fn positions(&self, current: Point, snap: bool, grid_size: f64) -> Vec<(ShapeId, Point)> {
        let delta = self.delta(current);
        let mut out = Vec::new();
        for (leader, followers) in &self.leaders {
            let Some(&origin) = self.origins.get(leader) else {
                continue;
            };
            let target = snap_point(origin + delta, snap, grid_size);
            let moved = target - origin;
            out.push((*leader, target));
            for follower in followers {
                if let Some(&start) = self.origins.get(follower) {
                    out.push((*follower, start + moved));
                }
            }
        }
        out
    }
}

/// State of a resize drag on one shape (or the group it belongs to).
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulationState {
    /// The shape whose handle was grabbed.
    pub shape_id: ShapeId,
    /// The handle being dragged.
    pub handle: HandleKind,
    /// Starting point of the drag (world).
    pub start_point: Point,
    /// Bounds the handles were laid out on: the shape's, or its group's.
    pub start_bounds: Rect,
    /// Bounds of every shape being resized at drag start.
    pub members: Vec<(ShapeId, Rect)>,
    /// Original label, for text resizes.
    pub original_text: Option<TextLabel>,
}

impl ManipulationState {
    /// Get the drag delta.
    pub fn delta(&self, current: Point) -> Vec2 {
        current - self.start_point
    }

    /// Target bounds of every member for the pointer at `current`.
    pub fn member_bounds(&self, current: Point, min_size: f64) -> Vec<(ShapeId, Rect)> {
        let new_bounds = resize_rect(self.start_bounds, self.handle, self.delta(current), min_size);
        self.members
            .iter()
            .map(|&(id, rect)| (id, scale_into(rect, self.start_bounds, new_bounds)))
            .collect()
    }
}
