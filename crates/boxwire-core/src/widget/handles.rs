//! Resize handle definitions.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A resize handle on a selected shape or group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    /// Which bound edges the handle moves.
    pub kind: HandleKind,
    /// Position in world coordinates.
    pub position: Point,
}

/// Compass position of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    // Corner handles
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    // Side handles
    Top,
    Bottom,
    Left,
    Right,
}

impl HandleKind {
    pub const CORNERS: [HandleKind; 4] = [
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
        HandleKind::BottomRight,
    ];

    pub const SIDES: [HandleKind; 4] = [
        HandleKind::Top,
        HandleKind::Bottom,
        HandleKind::Left,
        HandleKind::Right,
    ];

    /// Compass name (`n`, `se`, ...), which also doubles as a cursor hint.
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::TopLeft => "nw",
            HandleKind::TopRight => "ne",
            HandleKind::BottomLeft => "sw",
            HandleKind::BottomRight => "se",
            HandleKind::Top => "n",
            HandleKind::Bottom => "s",
            HandleKind::Left => "w",
            HandleKind::Right => "e",
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::BottomLeft | HandleKind::Left)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, HandleKind::TopRight | HandleKind::BottomRight | HandleKind::Right)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, HandleKind::TopLeft | HandleKind::TopRight | HandleKind::Top)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, HandleKind::BottomLeft | HandleKind::BottomRight | HandleKind::Bottom)
    }

    pub fn is_corner(self) -> bool {
        Self::CORNERS.contains(&self)
    }

    /// Anchor position of this handle on `rect`.
    pub fn position_on(self, rect: Rect) -> Point {
        let center = rect.center();
        let x = if self.moves_left() {
            rect.x0
        } else if self.moves_right() {
            rect.x1
        } else {
            center.x
        };
        let y = if self.moves_top() {
            rect.y0
        } else if self.moves_bottom() {
            rect.y1
        } else {
            center.y
        };
        Point::new(x, y)
    }
}

impl Handle {
    /// Create a new handle.
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self { kind, position }
    }

    /// Whether `point` lies within `radius` of the handle.
    pub fn hit(&self, point: Point, radius: f64) -> bool {
        (point - self.position).hypot() <= radius
    }
}

/// Lay out handles on `rect` inflated by `padding`.
pub fn handles_for_rect(rect: Rect, padding: f64, corners_only: bool) -> Vec<Handle> {
    let padded = rect.inflate(padding, padding);
    let kinds = HandleKind::CORNERS
        .into_iter()
        .chain(HandleKind::SIDES.into_iter().filter(|_| !corners_only));
    kinds
        .map(|kind| Handle::new(kind, kind.position_on(padded)))
        .collect()
}

/// First handle within `radius` of `point`.
pub fn handle_at(handles: &[Handle], point: Point, radius: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|handle| handle.hit(point, radius))
        .map(|handle| handle.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_layout_on_padded_bounds() {
        let rect = Rect::new(0.0, 0.0, 80.0, 40.0);
        let handles = handles_for_rect(rect, 8.0, false);
        assert_eq!(handles.len(), 8);

        let find = |kind| handles.iter().find(|h| h.kind == kind).map(|h| h.position);
        assert_eq!(find(HandleKind::TopLeft), Some(Point::new(-8.0, -8.0)));
        assert_eq!(find(HandleKind::BottomRight), Some(Point::new(88.0, 48.0)));
        assert_eq!(find(HandleKind::Top), Some(Point::new(40.0, -8.0)));
        assert_eq!(find(HandleKind::Right), Some(Point::new(88.0, 20.0)));
    }

    #[test]
    fn test_corners_only() {
        let handles = handles_for_rect(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, true);
        assert_eq!(handles.len(), 4);
        assert!(handles.iter().all(|h| h.kind.is_corner()));
    }

    #[test]
    fn test_handle_hit() {
        let handles = handles_for_rect(Rect::new(0.0, 0.0, 80.0, 80.0), 8.0, false);
        assert_eq!(handle_at(&handles, Point::new(90.0, 90.0), 6.0), Some(HandleKind::BottomRight));
        assert_eq!(handle_at(&handles, Point::new(-4.0, 40.0), 6.0), Some(HandleKind::Left));
        assert_eq!(handle_at(&handles, Point::new(40.0, 40.0), 6.0), None);
    }

    #[test]
    fn test_handle_names_and_axes() {
        assert_eq!(HandleKind::BottomLeft.name(), "sw");
        assert!(HandleKind::Left.moves_left());
        assert!(!HandleKind::Left.moves_top());
        assert!(HandleKind::TopRight.moves_top() && HandleKind::TopRight.moves_right());
    }
}
