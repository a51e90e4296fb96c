//! Pointer and keyboard handling for the canvas.
//!
//! At most one [`Gesture`] is active. Pointer positions arrive in screen
//! space and are converted through the camera before hit-testing.

use crate::canvas::Canvas;
use crate::connection::{ConnectionId, Direction, EdgeAnchor, midpoint};
use crate::input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::selection::{LassoFrame, ManipulationState, MultiMoveState, resize_text};
use crate::shapes::{ShapeId, ShapeKind, is_finite_point};
use crate::tools::ToolKind;
use crate::widget::{HandleKind, handle_at};
use kurbo::{Point, Vec2};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The active interaction mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Dragging empty canvas to move the camera.
    Panning {
        start_screen: Point,
        start_offset: Vec2,
    },
    /// Moving the selected shapes (and their groups).
    DraggingSelection(MultiMoveState),
    /// Dragging a resize handle.
    Resizing(ManipulationState),
    /// First connection anchor chosen; `pointer` is the preview endpoint.
    EdgeSelectingFirst { anchor: EdgeAnchor, pointer: Point },
    /// Both anchors chosen, waiting for [`Canvas::choose_direction`].
    AwaitingDirection { from: EdgeAnchor, to: EdgeAnchor },
    /// Drawing a lasso polygon. `toggle` is set when it began with a
    /// selection modifier held.
    LassoDrawing { points: Vec<Point>, toggle: bool },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::DraggingSelection(_) => "dragging",
            Gesture::Resizing(_) => "resizing",
            Gesture::EdgeSelectingFirst { .. } => "edge-selecting",
            Gesture::AwaitingDirection { .. } => "awaiting-direction",
            Gesture::LassoDrawing { .. } => "lasso",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// First anchor of a connection in progress.
    pub fn pending_anchor(&self) -> Option<EdgeAnchor> {
        match self {
            Gesture::EdgeSelectingFirst { anchor, .. } => Some(*anchor),
            Gesture::AwaitingDirection { from, .. } => Some(*from),
            _ => None,
        }
    }

    /// Whether the gesture holds on to `shape_id`.
    pub(crate) fn references(&self, shape_id: ShapeId) -> bool {
        match self {
            Gesture::DraggingSelection(state) => state.origins.contains_key(&shape_id),
            Gesture::Resizing(state) => state.members.iter().any(|(id, _)| *id == shape_id),
            Gesture::EdgeSelectingFirst { anchor, .. } => anchor.shape_id == shape_id,
            Gesture::AwaitingDirection { from, to } => {
                from.shape_id == shape_id || to.shape_id == shape_id
            }
            Gesture::Idle | Gesture::Panning { .. } | Gesture::LassoDrawing { .. } => false,
        }
    }
}

/// What the pointer is currently over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hover {
    #[default]
    None,
    Shape(ShapeId),
    Edge(EdgeAnchor),
    Connection(ConnectionId),
}

impl Hover {
    pub(crate) fn references(&self, shape_id: ShapeId) -> bool {
        match self {
            Hover::Shape(id) => *id == shape_id,
            Hover::Edge(anchor) => anchor.shape_id == shape_id,
            Hover::None | Hover::Connection(_) => false,
        }
    }
}

impl Canvas {
    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::DoubleClick { position } => {
                self.double_click(position);
            }
            PointerEvent::Leave | PointerEvent::Cancel => self.pointer_leave(),
        }
    }

    /// Handle a key event. Returns whether the canvas consumed it.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let KeyEvent::Pressed(key) = event else {
            return false;
        };
        match key {
            key if key.is_delete() => self.delete_selected(),
            Key::Escape => {
                if self.widgets.is_editing() {
                    self.cancel_edit();
                    true
                } else if self.gesture.pending_anchor().is_some() {
                    debug!("Pending connection abandoned");
                    self.gesture = Gesture::Idle;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) {
        let world = self.camera.screen_to_world(screen);
        if !is_finite_point(world) {
            return;
        }
        match button {
            MouseButton::Right => {
                self.delete_at(world);
                return;
            }
            MouseButton::Middle => return,
            MouseButton::Left => {}
        }

        // A press while awaiting a direction keeps the first anchor and
        // re-targets the second.
        let pending = match std::mem::take(&mut self.gesture) {
            Gesture::EdgeSelectingFirst { anchor, .. } => Some(anchor),
            Gesture::AwaitingDirection { from, .. } => Some(from),
            _ => None,
        };

        if let Some(kind) = self.tool_manager.take_armed() {
            self.place_shape(kind, world);
            return;
        }

        match self.tool_manager.current_tool {
            ToolKind::Select => self.select_down(screen, world, modifiers, pending),
            ToolKind::Lasso => self.lasso_down(world, modifiers),
            ToolKind::Text => self.text_down(world),
        }
        if !self.gesture.is_idle() {
            debug!("Gesture: {}", self.gesture.name());
        }
    }

    fn select_down(
        &mut self,
        screen: Point,
        world: Point,
        modifiers: Modifiers,
        pending: Option<EdgeAnchor>,
    ) {
        let toggle = modifiers.toggles_selection();

        // Handles of the selected shape win over everything beneath them
        if pending.is_none() {
            if let Some((shape_id, handle)) = self.handle_hit(world) {
                self.begin_resize(shape_id, handle, world);
                return;
            }
        }

        if let Some(conn) = self.document.connection_at(
            world,
            self.config.connection_tolerance,
            self.config.endpoint_exclusion_radius,
        ) {
            if toggle {
                self.widgets.toggle_connection(conn);
            } else {
                self.widgets.select_connection(conn);
                self.widgets.clear_selection();
            }
            if let Some(anchor) = pending {
                self.gesture = Gesture::EdgeSelectingFirst {
                    anchor,
                    pointer: world,
                };
            }
            return;
        }

        match pending {
            Some(anchor) => {
                if let Some(target) = self.connection_target_at(world) {
                    self.widgets.clear_selection();
                    self.gesture = if target == anchor {
                        Gesture::EdgeSelectingFirst {
                            anchor,
                            pointer: world,
                        }
                    } else {
                        Gesture::AwaitingDirection {
                            from: anchor,
                            to: target,
                        }
                    };
                    return;
                }
            }
            None => {
                if let Some(anchor) = self.edge_hit_at(world) {
                    self.widgets.clear_selection();
                    self.gesture = Gesture::EdgeSelectingFirst {
                        anchor,
                        pointer: world,
                    };
                    return;
                }
            }
        }

        if let Some(id) = self.document.shape_at(world) {
            if toggle {
                self.widgets.toggle(id);
            } else {
                self.widgets.select(id);
                self.widgets.clear_connection_selection();
            }
            if self.widgets.is_selected(id) {
                self.begin_drag(world);
            }
            return;
        }

        // Empty canvas
        self.widgets.exit_editing();
        if !toggle {
            self.widgets.clear_all();
        }
        self.gesture = Gesture::Panning {
            start_screen: screen,
            start_offset: self.camera.offset,
        };
    }

    fn lasso_down(&mut self, world: Point, modifiers: Modifiers) {
        let in_frame = self
            .lasso_frame
            .as_ref()
            .is_some_and(|frame| frame.contains(world));
        if in_frame && self.widgets.has_selection() {
            self.begin_drag(world);
            return;
        }

        let toggle = modifiers.toggles_selection();
        self.lasso_frame = None;
        if !toggle {
            self.widgets.clear_all();
        }
        self.gesture = Gesture::LassoDrawing {
            points: vec![world],
            toggle,
        };
    }

    fn text_down(&mut self, world: Point) {
        let shape = self
            .tool_manager
            .create_shape(ShapeKind::Text, world, &self.config);
        let id = shape.id();
        self.document.add_shape(shape);
        self.widgets.clear_all();
        self.widgets.select(id);
        self.begin_edit(id);
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        if !is_finite_point(world) {
            return;
        }
        let mut track_hover = false;
        match &mut self.gesture {
            Gesture::Idle => track_hover = true,
            Gesture::Panning {
                start_screen,
                start_offset,
            } => {
                self.camera.offset = *start_offset + (screen - *start_screen);
            }
            Gesture::DraggingSelection(state) => {
                let positions = state.positions(world, self.config.snap_drag, self.config.grid_pitch);
                let frame = state
                    .frame
                    .as_ref()
                    .map(|frame| frame.translated(state.delta(world)));
                trace!("Dragging {} shape(s)", positions.len());
                for (id, position) in positions {
                    if let Some(shape) = self.document.get_shape_mut(id) {
                        shape.set_position(position);
                    }
                }
                if frame.is_some() {
                    self.lasso_frame = frame;
                }
            }
            Gesture::Resizing(state) => {
                if let Some(original) = &state.original_text {
                    let (position, font_size) = resize_text(
                        original,
                        state.handle,
                        state.delta(world),
                        self.config.min_font_size,
                    );
                    if let Some(text) = self
                        .document
                        .get_shape_mut(state.shape_id)
                        .and_then(|shape| shape.as_text_mut())
                    {
                        text.position = position;
                        text.font_size = font_size;
                    }
                } else {
                    for (id, bounds) in state.member_bounds(world, self.config.min_shape_size) {
                        if let Some(shape) = self.document.get_shape_mut(id) {
                            shape.set_bounds(bounds);
                        }
                    }
                }
                trace!("Resizing {} via {}", state.shape_id, state.handle.name());
            }
            Gesture::EdgeSelectingFirst { pointer, .. } => {
                *pointer = world;
                track_hover = true;
            }
            Gesture::AwaitingDirection { .. } => {}
            Gesture::LassoDrawing { points, .. } => points.push(world),
        }
        if track_hover {
            self.update_hover(world);
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::LassoDrawing { points, toggle } => self.finish_lasso(points, toggle),
            // Connection gestures outlive the click that started them.
            gesture @ (Gesture::EdgeSelectingFirst { .. } | Gesture::AwaitingDirection { .. }) => {
                self.gesture = gesture;
            }
            Gesture::Idle => {}
            finished => debug!("Gesture {} finished", finished.name()),
        }
    }

    /// Pointer left the surface or the platform cancelled the gesture.
    ///
    /// Returns to idle without undoing moves or resizes already applied.
    pub fn pointer_leave(&mut self) {
        let previous = std::mem::take(&mut self.gesture);
        if !previous.is_idle() {
            debug!("Gesture {} cancelled", previous.name());
        }
        self.hover = Hover::None;
        self.widgets.set_hovered(None);
    }

    /// Double-click begins editing the topmost shape's label.
    pub fn double_click(&mut self, screen: Point) -> Option<ShapeId> {
        let world = self.camera.screen_to_world(screen);
        let id = self.document.shape_at(world)?;
        self.gesture = Gesture::Idle;
        self.begin_edit(id)?;
        Some(id)
    }

    /// Finish a pending connection with `direction`, or, with nothing
    /// pending, change the direction of the single selected connection.
    pub fn choose_direction(&mut self, direction: Direction) -> bool {
        match self.gesture {
            Gesture::AwaitingDirection { from, to } => {
                self.gesture = Gesture::Idle;
                let result = self.document.create_connection(
                    from.shape_id,
                    from.edge,
                    to.shape_id,
                    to.edge,
                    direction,
                    self.tool_manager.current_color,
                );
                match result {
                    Ok(_) => true,
                    Err(err) => {
                        debug!("Connection refused: {err}");
                        false
                    }
                }
            }
            Gesture::EdgeSelectingFirst { .. } => false,
            _ => match self.widgets.single_selected_connection() {
                Some(conn) => self.document.set_direction(conn, direction),
                None => false,
            },
        }
    }

    /// Secondary click: delete the connection near the point, else the
    /// topmost shape under it.
    fn delete_at(&mut self, world: Point) -> bool {
        if let Some(conn) = self.document.connection_at(
            world,
            self.config.connection_tolerance,
            self.config.endpoint_exclusion_radius,
        ) {
            return self.delete_connection(conn).is_some();
        }
        match self.document.shape_at(world) {
            Some(id) => self.remove_shape(id).is_some(),
            None => false,
        }
    }

    fn finish_lasso(&mut self, points: Vec<Point>, toggle: bool) {
        if points.len() < 3 {
            debug!("Lasso discarded with {} point(s)", points.len());
            return;
        }
        let frame = LassoFrame::new(points);

        let shapes: Vec<ShapeId> = self
            .document
            .shapes_ordered()
            .filter(|shape| frame.contains(shape.bounds().center()))
            .map(|shape| shape.id())
            .collect();
        let connections: Vec<ConnectionId> = self
            .document
            .connections()
            .iter()
            .filter(|conn| {
                self.document
                    .connection_endpoints(conn)
                    .is_some_and(|(from, to)| frame.contains(midpoint(from, to)))
            })
            .map(|conn| conn.id())
            .collect();

        for &id in &shapes {
            if toggle {
                self.widgets.toggle(id);
            } else {
                self.widgets.add_to_selection(id);
            }
        }
        for &id in &connections {
            if toggle {
                self.widgets.toggle_connection(id);
            } else {
                self.widgets.add_connection_to_selection(id);
            }
        }
        debug!(
            "Lasso hit {} shape(s), {} connection(s)",
            shapes.len(),
            connections.len()
        );
        self.lasso_frame = Some(frame);
    }

    /// Record start positions of the selection and every group it touches.
    fn begin_drag(&mut self, world: Point) {
        let mut state = MultiMoveState::new(world);
        let mut groups = HashSet::new();
        for &id in &self.document.z_order {
            if !self.widgets.is_selected(id) {
                continue;
            }
            let Some(shape) = self.document.get_shape(id) else {
                continue;
            };
            state.origins.insert(id, shape.position());
            match shape.group_id() {
                Some(group_id) => {
                    if !groups.insert(group_id) {
                        continue;
                    }
                    let followers: Vec<ShapeId> = self
                        .document
                        .group_members(group_id)
                        .into_iter()
                        .filter(|&member| member != id)
                        .collect();
                    for &member in &followers {
                        if let Some(shape) = self.document.get_shape(member) {
                            state.origins.insert(member, shape.position());
                        }
                    }
                    state.leaders.push((id, followers));
                }
                None => state.leaders.push((id, Vec::new())),
            }
        }
        state.frame = self.lasso_frame.clone();
        self.gesture = Gesture::DraggingSelection(state);
    }

    fn begin_resize(&mut self, shape_id: ShapeId, handle: HandleKind, world: Point) {
        let Some((start_bounds, members)) = self.document.resize_scope(shape_id) else {
            return;
        };
        let members = members
            .into_iter()
            .filter_map(|id| self.document.get_shape(id).map(|shape| (id, shape.bounds())))
            .collect();
        let original_text = self
            .document
            .get_shape(shape_id)
            .and_then(|shape| shape.as_text())
            .cloned();
        self.gesture = Gesture::Resizing(ManipulationState {
            shape_id,
            handle,
            start_point: world,
            start_bounds,
            members,
            original_text,
        });
    }

    /// Handle of the single selected shape under the point.
    fn handle_hit(&self, world: Point) -> Option<(ShapeId, HandleKind)> {
        let shape_id = self.widgets.single_selected()?;
        let handle = handle_at(&self.selection_handles(), world, self.config.handle_hit_radius)?;
        Some((shape_id, handle))
    }

    /// Free edge of the topmost shape whose outline is under the point.
    fn edge_hit_at(&self, world: Point) -> Option<EdgeAnchor> {
        self.document
            .shapes_at_point(world)
            .into_iter()
            .find_map(|id| {
                self.document
                    .edge_at(id, world, self.config.edge_tolerance)
                    .map(|edge| EdgeAnchor::new(id, edge))
            })
    }

    /// Free edge zone of the topmost shape around the point, used for the
    /// second anchor.
    fn connection_target_at(&self, world: Point) -> Option<EdgeAnchor> {
        self.document.z_order.iter().rev().find_map(|&id| {
            self.document
                .best_edge_for_connection(id, world, self.config.connection_padding)
                .map(|edge| EdgeAnchor::new(id, edge))
        })
    }

    fn update_hover(&mut self, world: Point) {
        let edge = if self.gesture.pending_anchor().is_some() {
            self.connection_target_at(world)
        } else {
            self.edge_hit_at(world)
        };
        let hover = edge
            .map(Hover::Edge)
            .or_else(|| {
                self.document
                    .connection_at(
                        world,
                        self.config.connection_tolerance,
                        self.config.endpoint_exclusion_radius,
                    )
                    .map(Hover::Connection)
            })
            .or_else(|| self.document.shape_at(world).map(Hover::Shape))
            .unwrap_or_default();

        let hovered_shape = match hover {
            Hover::Shape(id) => Some(id),
            Hover::Edge(anchor) => Some(anchor.shape_id),
            Hover::None | Hover::Connection(_) => None,
        };
        self.widgets.set_hovered(hovered_shape);
        self.hover = hover;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::shapes::{Edge, Ellipse, Rectangle, SerializableColor, Shape};
    use kurbo::Rect;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn unsnapped() -> Canvas {
        Canvas::with_config(EditorConfig {
            snap_drag: false,
            snap_placement: false,
            ..EditorConfig::default()
        })
    }

    fn add_box(canvas: &mut Canvas, x: f64, y: f64) -> ShapeId {
        let rect = Rectangle::new(Point::new(x, y), 80.0, 80.0);
        let id = rect.id;
        canvas.document.add_shape(Shape::Rectangle(rect));
        id
    }

    fn click(canvas: &mut Canvas, p: Point) {
        canvas.handle_pointer(PointerEvent::down(p));
        canvas.handle_pointer(PointerEvent::up(p));
    }

    fn shift_down(p: Point) -> PointerEvent {
        PointerEvent::Down {
            position: p,
            button: MouseButton::Left,
            modifiers: Modifiers::SHIFT,
        }
    }

    fn right_click(p: Point) -> PointerEvent {
        PointerEvent::Down {
            position: p,
            button: MouseButton::Right,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_pan_empty_canvas() {
        init();
        let mut canvas = Canvas::new();
        canvas.handle_pointer(PointerEvent::down(Point::new(10.0, 10.0)));
        assert_eq!(canvas.gesture().name(), "panning");
        canvas.handle_pointer(PointerEvent::moved(Point::new(40.0, 30.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(60.0, 10.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(60.0, 10.0)));

        assert_eq!(canvas.camera.offset, Vec2::new(50.0, 0.0));
        assert!(canvas.gesture().is_idle());
        // Hit-testing now happens in the shifted world.
        assert_eq!(canvas.camera.screen_to_world(Point::new(50.0, 0.0)), Point::ZERO);
    }

    #[test]
    fn test_click_body_selects_and_drags_with_snap() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 300.0, 0.0);

        canvas.widgets.select(b);
        canvas.handle_pointer(PointerEvent::down(Point::new(40.0, 40.0)));
        assert!(canvas.is_selected(a));
        assert!(!canvas.is_selected(b));
        assert_eq!(canvas.gesture().name(), "dragging");

        canvas.handle_pointer(PointerEvent::moved(Point::new(100.0, 50.0)));
        assert_eq!(canvas.document.get_shape(a).map(Shape::position), Some(Point::new(96.0, 0.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(100.0, 50.0)));
        assert!(canvas.gesture().is_idle());
    }

    #[test]
    fn test_drag_moves_whole_group() {
        init();
        let mut canvas = unsnapped();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let split = canvas
            .document
            .split_box(a, Point::new(70.0, 40.0), SerializableColor::accent())
            .unwrap();

        canvas.handle_pointer(PointerEvent::down(Point::new(20.0, 40.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(50.0, 60.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(50.0, 60.0)));

        assert_eq!(
            canvas.document.get_shape(a).map(Shape::bounds),
            Some(Rect::new(30.0, 20.0, 70.0, 100.0))
        );
        assert_eq!(
            canvas.document.get_shape(split.created).map(Shape::bounds),
            Some(Rect::new(70.0, 20.0, 110.0, 100.0))
        );
        assert!(!canvas.is_selected(split.created));
    }

    #[test]
    fn test_two_step_connection() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 200.0, 0.0);
        canvas.select(b);

        click(&mut canvas, Point::new(78.0, 40.0));
        assert_eq!(
            canvas.gesture().pending_anchor(),
            Some(EdgeAnchor::new(a, Edge::Right))
        );
        assert!(!canvas.widgets.has_selection());

        canvas.handle_pointer(PointerEvent::moved(Point::new(150.0, 45.0)));
        let overlay = canvas.overlay();
        assert_eq!(overlay.preview, Some((Point::new(80.0, 40.0), Point::new(150.0, 45.0))));

        click(&mut canvas, Point::new(202.0, 45.0));
        assert_eq!(
            *canvas.gesture(),
            Gesture::AwaitingDirection {
                from: EdgeAnchor::new(a, Edge::Right),
                to: EdgeAnchor::new(b, Edge::Left),
            }
        );

        assert!(canvas.choose_direction(Direction::Forward));
        assert!(canvas.gesture().is_idle());
        let conn = &canvas.document.connections()[0];
        assert_eq!(conn.from, EdgeAnchor::new(a, Edge::Right));
        assert_eq!(conn.to, EdgeAnchor::new(b, Edge::Left));
        assert_eq!(conn.direction, Direction::Forward);
    }

    #[test]
    fn test_press_while_awaiting_direction_retargets_second_anchor() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 200.0, 0.0);
        let c = add_box(&mut canvas, 0.0, 200.0);

        click(&mut canvas, Point::new(78.0, 40.0));
        click(&mut canvas, Point::new(202.0, 45.0));
        assert_eq!(canvas.gesture().name(), "awaiting-direction");

        // Top-left quadrant of the lower box picks its top edge.
        click(&mut canvas, Point::new(30.0, 205.0));
        assert_eq!(
            *canvas.gesture(),
            Gesture::AwaitingDirection {
                from: EdgeAnchor::new(a, Edge::Right),
                to: EdgeAnchor::new(c, Edge::Top),
            }
        );
        assert!(canvas.choose_direction(Direction::None));
        assert_eq!(canvas.document.connections().len(), 1);
        assert!(canvas.document.occupied_edges(b).is_empty());

        // A press on empty canvas abandons the connection entirely.
        click(&mut canvas, Point::new(2.0, 40.0));
        click(&mut canvas, Point::new(202.0, 45.0));
        click(&mut canvas, Point::new(500.0, 500.0));
        assert!(canvas.gesture().is_idle());
        assert!(!canvas.choose_direction(Direction::Forward));
        assert_eq!(canvas.document.connections().len(), 1);
    }

    #[test]
    fn test_leave_drops_pending_connection() {
        init();
        let mut canvas = Canvas::new();
        add_box(&mut canvas, 0.0, 0.0);
        add_box(&mut canvas, 200.0, 0.0);
        click(&mut canvas, Point::new(78.0, 40.0));
        click(&mut canvas, Point::new(202.0, 45.0));

        canvas.handle_pointer(PointerEvent::Leave);
        assert!(canvas.gesture().is_idle());
        assert!(!canvas.choose_direction(Direction::Forward));
        assert!(canvas.document.connections().is_empty());
    }

    #[test]
    fn test_same_edge_keeps_anchor() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);

        click(&mut canvas, Point::new(78.0, 40.0));
        click(&mut canvas, Point::new(79.0, 39.0));
        assert_eq!(
            *canvas.gesture(),
            Gesture::EdgeSelectingFirst {
                anchor: EdgeAnchor::new(a, Edge::Right),
                pointer: Point::new(79.0, 39.0),
            }
        );
        assert!(!canvas.choose_direction(Direction::Both));
        assert!(canvas.document.connections().is_empty());
    }

    #[test]
    fn test_escape_abandons_pending_connection() {
        init();
        let mut canvas = Canvas::new();
        add_box(&mut canvas, 0.0, 0.0);
        click(&mut canvas, Point::new(78.0, 40.0));

        assert!(canvas.handle_key(&KeyEvent::Pressed(Key::Escape)));
        assert!(canvas.gesture().is_idle());
        assert!(!canvas.handle_key(&KeyEvent::Pressed(Key::Escape)));
    }

    #[test]
    fn test_connection_click_and_direction_change() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 200.0, 0.0);
        let conn = canvas
            .document
            .create_connection(a, Edge::Right, b, Edge::Left, Direction::Forward, SerializableColor::accent())
            .unwrap();
        canvas.select(a);

        click(&mut canvas, Point::new(140.0, 42.0));
        assert!(canvas.widgets.is_connection_selected(conn));
        assert!(!canvas.is_selected(a));

        assert!(canvas.choose_direction(Direction::Backward));
        assert_eq!(canvas.document.connection(conn).map(|c| c.direction), Some(Direction::Backward));

        canvas.handle_pointer(shift_down(Point::new(140.0, 42.0)));
        assert!(!canvas.widgets.is_connection_selected(conn));
    }

    #[test]
    fn test_right_click_deletes_connection_before_shape() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 200.0, 0.0);
        canvas
            .document
            .create_connection(a, Edge::Right, b, Edge::Left, Direction::Forward, SerializableColor::accent())
            .unwrap();

        canvas.handle_pointer(right_click(Point::new(140.0, 40.0)));
        assert!(canvas.document.connections().is_empty());
        assert_eq!(canvas.document.len(), 2);

        canvas.handle_pointer(right_click(Point::new(240.0, 40.0)));
        assert!(canvas.document.get_shape(b).is_none());
        canvas.handle_pointer(right_click(Point::new(500.0, 500.0)));
        assert_eq!(canvas.document.len(), 1);
    }

    #[test]
    fn test_deleting_anchor_shape_drops_pending_connection() {
        init();
        let mut canvas = Canvas::new();
        add_box(&mut canvas, 0.0, 0.0);
        click(&mut canvas, Point::new(78.0, 40.0));
        assert!(canvas.gesture().pending_anchor().is_some());

        canvas.handle_pointer(right_click(Point::new(40.0, 40.0)));
        assert!(canvas.gesture().is_idle());
    }

    #[test]
    fn test_delete_key() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        add_box(&mut canvas, 200.0, 0.0);
        canvas.select(a);

        assert!(canvas.handle_key(&KeyEvent::Pressed(Key::Delete)));
        assert_eq!(canvas.document.len(), 1);
        assert!(!canvas.handle_key(&KeyEvent::Pressed(Key::Backspace)));
        assert!(!canvas.handle_key(&KeyEvent::Released(Key::Delete)));
    }

    #[test]
    fn test_lasso_selects_shapes_and_connections() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        let b = add_box(&mut canvas, 200.0, 0.0);
        let far = add_box(&mut canvas, 600.0, 0.0);
        let conn = canvas
            .document
            .create_connection(a, Edge::Right, b, Edge::Left, Direction::Forward, SerializableColor::accent())
            .unwrap();
        canvas.set_tool(ToolKind::Lasso);

        canvas.handle_pointer(PointerEvent::down(Point::new(-10.0, -10.0)));
        for p in [(300.0, -10.0), (300.0, 100.0), (-10.0, 100.0)] {
            canvas.handle_pointer(PointerEvent::moved(Point::new(p.0, p.1)));
        }
        assert_eq!(canvas.overlay().lasso_points.len(), 4);
        canvas.handle_pointer(PointerEvent::up(Point::new(-10.0, 100.0)));

        assert!(canvas.is_selected(a));
        assert!(canvas.is_selected(b));
        assert!(!canvas.is_selected(far));
        assert!(canvas.widgets.is_connection_selected(conn));
        assert!(canvas.lasso_frame().is_some());
    }

    #[test]
    fn test_lasso_frame_drag_moves_selection_and_frame() {
        init();
        let mut canvas = unsnapped();
        let a = add_box(&mut canvas, 0.0, 0.0);
        canvas.set_tool(ToolKind::Lasso);
        canvas.handle_pointer(PointerEvent::down(Point::new(-10.0, -10.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(100.0, -10.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(100.0, 100.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(-10.0, 100.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(-10.0, 100.0)));
        assert!(canvas.is_selected(a));

        canvas.handle_pointer(PointerEvent::down(Point::new(90.0, 90.0)));
        assert_eq!(canvas.gesture().name(), "dragging");
        canvas.handle_pointer(PointerEvent::moved(Point::new(110.0, 95.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(110.0, 95.0)));

        assert_eq!(canvas.document.get_shape(a).map(Shape::position), Some(Point::new(20.0, 5.0)));
        let frame = canvas.lasso_frame().unwrap();
        assert_eq!(frame.points[0], Point::new(10.0, -5.0));

        canvas.set_tool(ToolKind::Select);
        assert!(canvas.lasso_frame().is_none());
    }

    #[test]
    fn test_short_lasso_is_discarded() {
        init();
        let mut canvas = Canvas::new();
        add_box(&mut canvas, 0.0, 0.0);
        canvas.set_tool(ToolKind::Lasso);
        canvas.handle_pointer(PointerEvent::down(Point::new(-10.0, -10.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(100.0, 100.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(100.0, 100.0)));

        assert!(canvas.lasso_frame().is_none());
        assert!(!canvas.widgets.has_selection());
    }

    #[test]
    fn test_resize_single_box() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);
        canvas.select(a);

        canvas.handle_pointer(PointerEvent::down(Point::new(88.0, 88.0)));
        assert_eq!(canvas.gesture().name(), "resizing");
        canvas.handle_pointer(PointerEvent::moved(Point::new(128.0, 108.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(128.0, 108.0)));

        // Resizing never snaps.
        assert_eq!(
            canvas.document.get_shape(a).map(Shape::bounds),
            Some(Rect::new(0.0, 0.0, 120.0, 100.0))
        );
    }

    #[test]
    fn test_resize_ellipse_keeps_it_inscribed() {
        init();
        let mut canvas = Canvas::new();
        let ellipse = Ellipse::circle(Point::new(100.0, 100.0), 40.0);
        let id = ellipse.id;
        canvas.document.add_shape(Shape::Ellipse(ellipse));
        canvas.select(id);

        canvas.handle_pointer(PointerEvent::down(Point::new(148.0, 148.0)));
        assert_eq!(canvas.gesture().name(), "resizing");
        canvas.handle_pointer(PointerEvent::moved(Point::new(188.0, 168.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(188.0, 168.0)));

        let Some(Shape::Ellipse(resized)) = canvas.document.get_shape(id) else {
            panic!("ellipse missing");
        };
        assert_eq!(resized.center, Point::new(120.0, 110.0));
        assert!((resized.radius_x - 60.0).abs() < f64::EPSILON);
        assert!((resized.radius_y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_tool_creates_and_edits_label() {
        init();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.handle_pointer(PointerEvent::down(Point::new(30.0, 40.0)));

        let id = canvas.editing_shape().unwrap();
        assert_eq!(canvas.document.get_shape(id).and_then(Shape::label), Some("Text"));
        assert_eq!(canvas.document.get_shape(id).map(Shape::position), Some(Point::new(30.0, 40.0)));
        assert_eq!(canvas.widgets.selected().len(), 1);

        assert!(canvas.handle_key(&KeyEvent::Pressed(Key::Escape)));
        assert_eq!(canvas.editing_shape(), None);
    }

    #[test]
    fn test_armed_placement_is_one_shot() {
        init();
        let mut canvas = unsnapped();
        canvas.arm_placement(ShapeKind::Ellipse);
        canvas.handle_pointer(PointerEvent::down(Point::new(100.0, 100.0)));
        canvas.handle_pointer(PointerEvent::up(Point::new(100.0, 100.0)));
        assert_eq!(canvas.document.len(), 1);
        assert!(canvas.tool_manager.armed().is_none());

        // The next press is an ordinary select-tool press on the new ellipse.
        canvas.handle_pointer(PointerEvent::down(Point::new(100.0, 100.0)));
        assert_eq!(canvas.document.len(), 1);
        assert_eq!(canvas.gesture().name(), "dragging");
    }

    #[test]
    fn test_double_click_edits_topmost() {
        init();
        let mut canvas = Canvas::new();
        add_box(&mut canvas, 0.0, 0.0);
        let top = add_box(&mut canvas, 40.0, 40.0);

        canvas.handle_pointer(PointerEvent::DoubleClick {
            position: Point::new(60.0, 60.0),
        });
        assert_eq!(canvas.editing_shape(), Some(top));
        assert_eq!(canvas.double_click(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_leave_returns_to_idle_without_revert() {
        init();
        let mut canvas = unsnapped();
        let a = add_box(&mut canvas, 0.0, 0.0);
        canvas.handle_pointer(PointerEvent::down(Point::new(40.0, 40.0)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(50.0, 40.0)));
        canvas.handle_pointer(PointerEvent::Leave);

        assert!(canvas.gesture().is_idle());
        assert_eq!(canvas.document.get_shape(a).map(Shape::position), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_hover_tracks_edges_and_shapes() {
        init();
        let mut canvas = Canvas::new();
        let a = add_box(&mut canvas, 0.0, 0.0);

        canvas.handle_pointer(PointerEvent::moved(Point::new(40.0, 2.0)));
        assert_eq!(canvas.hover(), Hover::Edge(EdgeAnchor::new(a, Edge::Top)));
        canvas.handle_pointer(PointerEvent::moved(Point::new(40.0, 40.0)));
        assert_eq!(canvas.hover(), Hover::Shape(a));
        assert_eq!(canvas.widgets.hovered(), Some(a));
        canvas.handle_pointer(PointerEvent::moved(Point::new(400.0, 40.0)));
        assert_eq!(canvas.hover(), Hover::None);
    }
}
