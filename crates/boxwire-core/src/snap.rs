//! Grid snapping.

use kurbo::Point;

/// Default grid pitch for snapping.
pub const GRID_SIZE: f64 = 96.0;

/// Round a coordinate to the nearest multiple of `grid_size`.
///
/// A non-positive or non-finite pitch leaves the value unchanged.
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap(point.x, grid_size), snap(point.y, grid_size))
}

/// Snap a point when `enabled`, otherwise return it as is.
pub fn snap_point(point: Point, enabled: bool, grid_size: f64) -> Point {
    if enabled {
        snap_to_grid(point, grid_size)
    } else {
        point
    }
}
