//! Box splitting.
//!
//! Dropping a box onto an existing box cuts the target in two along the axis
//! the drop point leans towards. The half nearer the drop point becomes a new
//! box; the far half keeps the target's id, color and label. Both halves join
//! one group and are linked across the cut by a `both` connector.

use crate::canvas::CanvasDocument;
use crate::connection::{Connection, ConnectionId, Direction, EdgeAnchor};
use crate::shapes::{Edge, Rectangle, SerializableColor, Shape, ShapeId};
use kurbo::{Point, Rect};
use log::debug;
use uuid::Uuid;

/// Orientation of the cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cut along a vertical line into left and right halves.
    Vertical,
    /// Cut along a horizontal line into top and bottom halves.
    Horizontal,
}

impl SplitAxis {
    /// Inner edge of the left or top half.
    pub fn leading_seam(self) -> Edge {
        match self {
            SplitAxis::Vertical => Edge::Right,
            SplitAxis::Horizontal => Edge::Bottom,
        }
    }

    /// Inner edge of the right or bottom half.
    pub fn trailing_seam(self) -> Edge {
        self.leading_seam().opposite()
    }
}

/// Geometry of a split, before anything is mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPlan {
    pub axis: SplitAxis,
    /// Left or top half.
    pub leading: Rect,
    /// Right or bottom half.
    pub trailing: Rect,
    /// Whether the drop point is nearer the leading half.
    pub new_is_leading: bool,
}

impl SplitPlan {
    /// Bounds of the half that becomes the new box.
    pub fn new_half(&self) -> Rect {
        if self.new_is_leading { self.leading } else { self.trailing }
    }

    /// Bounds of the half that keeps the original identity.
    pub fn kept_half(&self) -> Rect {
        if self.new_is_leading { self.trailing } else { self.leading }
    }

    /// Inner edge of the new half.
    pub fn new_seam(&self) -> Edge {
        if self.new_is_leading {
            self.axis.leading_seam()
        } else {
            self.axis.trailing_seam()
        }
    }

    /// Inner edge of the kept half.
    pub fn kept_seam(&self) -> Edge {
        self.new_seam().opposite()
    }
}

/// Work out how `bounds` splits for a drop at `drop`.
///
/// `|dy| > |dx|` from the center cuts horizontally, anything else
/// vertically. Returns `None` for non-finite input or an empty target.
pub fn plan_split(bounds: Rect, drop: Point) -> Option<SplitPlan> {
    if !(drop.x.is_finite() && drop.y.is_finite()) || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }
    let center = bounds.center();
    let dx = drop.x - center.x;
    let dy = drop.y - center.y;

    let plan = if dy.abs() > dx.abs() {
        let mid = bounds.y0 + bounds.height() / 2.0;
        SplitPlan {
            axis: SplitAxis::Horizontal,
            leading: Rect::new(bounds.x0, bounds.y0, bounds.x1, mid),
            trailing: Rect::new(bounds.x0, mid, bounds.x1, bounds.y1),
            new_is_leading: dy < 0.0,
        }
    } else {
        let mid = bounds.x0 + bounds.width() / 2.0;
        SplitPlan {
            axis: SplitAxis::Vertical,
            leading: Rect::new(bounds.x0, bounds.y0, mid, bounds.y1),
            trailing: Rect::new(mid, bounds.y0, bounds.x1, bounds.y1),
            new_is_leading: dx < 0.0,
        }
    };
    Some(plan)
}

/// Outcome of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitResult {
    /// The target box, now the far half.
    pub kept: ShapeId,
    /// The new box, the half nearer the drop point.
    pub created: ShapeId,
    /// Connector across the seam.
    pub seam_connection: ConnectionId,
}

impl CanvasDocument {
    /// Split the box `target` for a drop at `drop`.
    ///
    /// Both halves inherit the target's seams and add their inner edge.
    /// The new half gets `color` and no label. Connections on the target
    /// edge that now faces the new half move to the new box's same-named
    /// edge. Returns `None`, changing nothing, when `target` is not a box.
    pub fn split_box(
        &mut self,
        target: ShapeId,
        drop: Point,
        color: SerializableColor,
    ) -> Option<SplitResult> {
        let original = self.get_shape(target)?.as_rectangle()?.clone();
        let plan = plan_split(original.as_rect(), drop)?;
        let group_id = original.group_id.unwrap_or_else(Uuid::new_v4);
        let moved_edge = plan.kept_seam();

        let mut created = Rectangle::from_rect(plan.new_half()).with_color(color);
        created.group_id = Some(group_id);
        created.seams = original.seams.clone();
        created.add_seam(plan.new_seam());
        let created_id = created.id;

        if let Some(kept) = self.get_shape_mut(target).and_then(Shape::as_rectangle_mut) {
            let kept_rect = plan.kept_half();
            kept.position = kept_rect.origin();
            kept.width = kept_rect.width();
            kept.height = kept_rect.height();
            kept.group_id = Some(group_id);
            kept.add_seam(plan.kept_seam());
        }
        self.add_shape(Shape::Rectangle(created));

        // The kept half's inner side used to be the target's outer side.
        let from_old = EdgeAnchor::new(target, moved_edge);
        for conn in &mut self.connections {
            for anchor in [&mut conn.from, &mut conn.to] {
                if *anchor == from_old {
                    anchor.shape_id = created_id;
                }
            }
        }

        let (leading, trailing) = if plan.new_is_leading {
            (created_id, target)
        } else {
            (target, created_id)
        };
        let seam = Connection::new(
            EdgeAnchor::new(leading, plan.axis.leading_seam()),
            EdgeAnchor::new(trailing, plan.axis.trailing_seam()),
            Direction::Both,
            color,
        );
        let seam_connection = seam.id;
        self.connections.push(seam);

        debug!(
            "Split box {target} {:?}: new half {created_id}, group {group_id}",
            plan.axis
        );
        Some(SplitResult {
            kept: target,
            created: created_id,
            seam_connection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_vertical_split() {
        let plan = plan_split(Rect::new(0.0, 0.0, 80.0, 80.0), Point::new(70.0, 40.0)).unwrap();
        assert_eq!(plan.axis, SplitAxis::Vertical);
        assert_eq!(plan.leading, Rect::new(0.0, 0.0, 40.0, 80.0));
        assert_eq!(plan.trailing, Rect::new(40.0, 0.0, 80.0, 80.0));
        assert!(!plan.new_is_leading);
        assert_eq!(plan.new_seam(), Edge::Left);
        assert_eq!(plan.kept_seam(), Edge::Right);
    }

    #[test]
    fn test_plan_horizontal_split() {
        let plan = plan_split(Rect::new(10.0, 10.0, 110.0, 70.0), Point::new(55.0, 15.0)).unwrap();
        assert_eq!(plan.axis, SplitAxis::Horizontal);
        assert_eq!(plan.leading, Rect::new(10.0, 10.0, 110.0, 40.0));
        assert_eq!(plan.trailing, Rect::new(10.0, 40.0, 110.0, 70.0));
        assert!(plan.new_is_leading);
        assert_eq!(plan.new_seam(), Edge::Bottom);
    }

    #[test]
    fn test_plan_halves_partition_bounds() {
        let bounds = Rect::new(-30.0, 12.0, 97.0, 63.0);
        for drop in [Point::new(0.0, 0.0), Point::new(90.0, 40.0), Point::new(30.0, 60.0)] {
            let plan = plan_split(bounds, drop).unwrap();
            assert_eq!(plan.leading.union(plan.trailing), bounds);
            assert!(plan.leading.intersect(plan.trailing).area().abs() < 1e-9);
            let seam_length = match plan.axis {
                SplitAxis::Vertical => plan.leading.height(),
                SplitAxis::Horizontal => plan.leading.width(),
            };
            let undivided = match plan.axis {
                SplitAxis::Vertical => bounds.height(),
                SplitAxis::Horizontal => bounds.width(),
            };
            assert!((seam_length - undivided).abs() < 1e-9);
        }
    }

    #[test]
    fn test_plan_rejects_bad_input() {
        assert!(plan_split(Rect::new(0.0, 0.0, 0.0, 80.0), Point::new(0.0, 0.0)).is_none());
        assert!(plan_split(Rect::new(0.0, 0.0, 80.0, 80.0), Point::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn test_split_box_in_document() {
        let mut doc = CanvasDocument::new();
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 80.0, 80.0);
        rect.label = Some("API".to_string());
        rect.color = SerializableColor::black();
        let target = rect.id;
        doc.add_shape(Shape::Rectangle(rect));

        let result = doc
            .split_box(target, Point::new(70.0, 40.0), SerializableColor::accent())
            .unwrap();
        let kept = doc.get_shape(result.kept).unwrap();
        let created = doc.get_shape(result.created).unwrap();

        assert_eq!(kept.bounds(), Rect::new(0.0, 0.0, 40.0, 80.0));
        assert_eq!(created.bounds(), Rect::new(40.0, 0.0, 80.0, 80.0));
        assert_eq!(kept.label(), Some("API"));
        assert_eq!(kept.color(), SerializableColor::black());
        assert_eq!(created.label(), None);
        assert_eq!(created.color(), SerializableColor::accent());
        assert!(kept.group_id().is_some());
        assert_eq!(kept.group_id(), created.group_id());
        assert!(kept.is_seam(Edge::Right));
        assert!(created.is_seam(Edge::Left));

        let seam = doc.connection(result.seam_connection).unwrap();
        assert_eq!(seam.from, EdgeAnchor::new(result.kept, Edge::Right));
        assert_eq!(seam.to, EdgeAnchor::new(result.created, Edge::Left));
        assert_eq!(seam.direction, Direction::Both);
    }

    #[test]
    fn test_split_rehomes_connections_on_the_cut_side() {
        let mut doc = CanvasDocument::new();
        let target = Rectangle::new(Point::new(0.0, 0.0), 80.0, 80.0);
        let other = Rectangle::new(Point::new(200.0, 0.0), 80.0, 80.0);
        let (target_id, other_id) = (target.id, other.id);
        doc.add_shape(Shape::Rectangle(target));
        doc.add_shape(Shape::Rectangle(other));
        let right = doc
            .create_connection(target_id, Edge::Right, other_id, Edge::Left, Direction::Forward, SerializableColor::accent())
            .unwrap();
        let top = doc
            .create_connection(target_id, Edge::Top, other_id, Edge::Top, Direction::None, SerializableColor::accent())
            .unwrap();

        let result = doc
            .split_box(target_id, Point::new(70.0, 40.0), SerializableColor::accent())
            .unwrap();
        assert_eq!(doc.connection(right).unwrap().from, EdgeAnchor::new(result.created, Edge::Right));
        assert_eq!(doc.connection(top).unwrap().from, EdgeAnchor::new(target_id, Edge::Top));
    }

    #[test]
    fn test_split_grouped_box_keeps_group() {
        let mut doc = CanvasDocument::new();
        let rect = Rectangle::new(Point::new(0.0, 0.0), 80.0, 80.0);
        let target = rect.id;
        doc.add_shape(Shape::Rectangle(rect));

        let first = doc
            .split_box(target, Point::new(70.0, 40.0), SerializableColor::accent())
            .unwrap();
        let group = doc.get_shape(target).and_then(Shape::group_id);
        // Split the right half again, top/bottom.
        let second = doc
            .split_box(first.created, Point::new(60.0, 75.0), SerializableColor::accent())
            .unwrap();

        assert_eq!(doc.get_shape(second.created).and_then(Shape::group_id), group);
        assert_eq!(doc.group_members(group.unwrap()).len(), 3);

        let kept = doc.get_shape(first.created).unwrap();
        let created = doc.get_shape(second.created).unwrap();
        assert_eq!(kept.bounds(), Rect::new(40.0, 0.0, 80.0, 40.0));
        assert_eq!(created.bounds(), Rect::new(40.0, 40.0, 80.0, 80.0));
        // Both halves still face the first cut on their left side.
        assert!(kept.is_seam(Edge::Left) && kept.is_seam(Edge::Bottom));
        assert!(created.is_seam(Edge::Left) && created.is_seam(Edge::Top));
        assert!(!created.is_seam(Edge::Bottom));
    }

    #[test]
    fn test_split_non_box_is_rejected() {
        let mut doc = CanvasDocument::new();
        let circle = crate::shapes::Ellipse::circle(Point::new(40.0, 40.0), 40.0);
        let id = circle.id;
        doc.add_shape(Shape::Ellipse(circle));
        assert!(doc.split_box(id, Point::new(70.0, 40.0), SerializableColor::accent()).is_none());
        assert_eq!(doc.len(), 1);
        assert!(doc.connections().is_empty());
    }
}
