//! Canvas document and session state.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::connection::{Connection, ConnectionId, Direction, EdgeAnchor, is_near};
use crate::error::{ConnectError, ConnectResult};
use crate::interaction::{Gesture, Hover};
use crate::selection::LassoFrame;
use crate::shapes::{Edge, GroupId, SerializableColor, Shape, ShapeId, ShapeKind};
use crate::tools::{ToolKind, ToolManager};
use crate::widget::{Handle, WidgetManager, WidgetState, handles_for_rect};
use kurbo::{Point, Rect};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The diagram: shapes, their stacking order and the connectors between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// All shapes in the document, keyed by ID.
    pub shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    pub z_order: Vec<ShapeId>,
    /// Connectors in creation order.
    pub(crate) connections: Vec<Connection>,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the document.
    pub fn add_shape(&mut self, shape: Shape) {
        let id = shape.id();
        self.z_order.push(id);
        self.shapes.insert(id, shape);
    }

    /// Remove a shape and every connection referencing it.
    ///
    /// A group left with a single member dissolves: that member's group id
    /// is cleared (its seams stay seams).
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.z_order.retain(|&shape_id| shape_id != id);

        let before = self.connections.len();
        self.connections.retain(|conn| !conn.references(id));
        let removed = before - self.connections.len();

        if let Some(group_id) = shape.group_id() {
            let remaining = self.group_members(group_id);
            if let [last] = remaining.as_slice() {
                if let Some(rect) = self.shapes.get_mut(last).and_then(Shape::as_rectangle_mut) {
                    rect.group_id = None;
                    debug!("Group {group_id} dissolved");
                }
            }
        }
        debug!("Removed shape {id} and {removed} connection(s)");
        Some(shape)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.z_order.clear();
        self.connections.clear();
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Shapes under a point (world coordinates), front to back.
    pub fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| self.shapes.get(id).is_some_and(|s| s.contains(point)))
            .copied()
            .collect()
    }

    /// Topmost shape under a point.
    pub fn shape_at(&self, point: Point) -> Option<ShapeId> {
        self.shapes_at_point(point).into_iter().next()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Connectors in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == id)
    }

    /// World-space endpoints of a connection. `None` if either shape is gone.
    pub fn connection_endpoints(&self, conn: &Connection) -> Option<(Point, Point)> {
        let from = self.anchor_point(conn.from)?;
        let to = self.anchor_point(conn.to)?;
        Some((from, to))
    }

    /// Attachment point of an edge anchor.
    pub fn anchor_point(&self, anchor: EdgeAnchor) -> Option<Point> {
        self.get_shape(anchor.shape_id)?.edge_point(anchor.edge)
    }

    /// First connection, in creation order, passing near `point`.
    pub fn connection_at(
        &self,
        point: Point,
        tolerance: f64,
        exclusion_radius: f64,
    ) -> Option<ConnectionId> {
        self.connections
            .iter()
            .find(|conn| {
                self.connection_endpoints(conn)
                    .is_some_and(|(from, to)| is_near(from, to, point, tolerance, exclusion_radius))
            })
            .map(|conn| conn.id)
    }

    /// Edges of a shape that already host a connection.
    pub fn occupied_edges(&self, shape_id: ShapeId) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .connections
            .iter()
            .flat_map(|conn| conn.edges_on(shape_id))
            .collect();
        edges.sort_by_key(|edge| Edge::ALL.iter().position(|e| e == edge));
        edges.dedup();
        edges
    }

    pub fn is_occupied(&self, anchor: EdgeAnchor) -> bool {
        self.connections.iter().any(|conn| conn.uses(anchor))
    }

    /// Edge of `shape_id` near the point, honouring seams and occupancy.
    pub fn edge_at(&self, shape_id: ShapeId, point: Point, tolerance: f64) -> Option<Edge> {
        let shape = self.get_shape(shape_id)?;
        shape.edge_at(point, tolerance, &self.occupied_edges(shape_id))
    }

    /// Edge zone of `shape_id` used while a connection is being anchored.
    pub fn best_edge_for_connection(
        &self,
        shape_id: ShapeId,
        point: Point,
        padding: f64,
    ) -> Option<Edge> {
        let shape = self.get_shape(shape_id)?;
        shape.best_edge_for_connection(point, padding, &self.occupied_edges(shape_id))
    }

    /// Create a connector between two edges.
    ///
    /// Refused, changing nothing, when either shape is missing or cannot
    /// host connections, when both ends are the same edge, or when either
    /// edge is a seam or already occupied.
    pub fn create_connection(
        &mut self,
        from_shape: ShapeId,
        from_edge: Edge,
        to_shape: ShapeId,
        to_edge: Edge,
        direction: Direction,
        color: SerializableColor,
    ) -> ConnectResult<ConnectionId> {
        let from = EdgeAnchor::new(from_shape, from_edge);
        let to = EdgeAnchor::new(to_shape, to_edge);
        for anchor in [from, to] {
            let shape = self
                .get_shape(anchor.shape_id)
                .ok_or(ConnectError::ShapeNotFound(anchor.shape_id))?;
            if !shape.has_edges() {
                return Err(ConnectError::NoEdges(anchor.shape_id));
            }
        }
        if from == to {
            return Err(ConnectError::SameEdge(from_edge));
        }
        for anchor in [from, to] {
            let shape = self
                .get_shape(anchor.shape_id)
                .ok_or(ConnectError::ShapeNotFound(anchor.shape_id))?;
            if shape.is_seam(anchor.edge) {
                return Err(ConnectError::SeamEdge {
                    shape: anchor.shape_id,
                    edge: anchor.edge,
                });
            }
            if self.is_occupied(anchor) {
                return Err(ConnectError::EdgeOccupied {
                    shape: anchor.shape_id,
                    edge: anchor.edge,
                });
            }
        }

        let conn = Connection::new(from, to, direction, color);
        let id = conn.id;
        self.connections.push(conn);
        debug!("Connected {from_shape}:{from_edge} -> {to_shape}:{to_edge} ({})", direction.name());
        Ok(id)
    }

    /// Change the arrowheads of a connection.
    pub fn set_direction(&mut self, id: ConnectionId, direction: Direction) -> bool {
        match self.connections.iter_mut().find(|conn| conn.id == id) {
            Some(conn) => {
                conn.direction = direction;
                true
            }
            None => false,
        }
    }

    pub fn set_connection_color(&mut self, id: ConnectionId, color: SerializableColor) -> bool {
        match self.connections.iter_mut().find(|conn| conn.id == id) {
            Some(conn) => {
                conn.color = color;
                true
            }
            None => false,
        }
    }

    /// Remove a connection. Shapes are untouched.
    pub fn delete_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|conn| conn.id == id)?;
        debug!("Removed connection {id}");
        Some(self.connections.remove(index))
    }

    /// IDs of connections referencing a shape.
    pub fn connections_of(&self, shape_id: ShapeId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|conn| conn.references(shape_id))
            .map(|conn| conn.id)
            .collect()
    }

    /// Members of a group in z-order.
    pub fn group_members(&self, group_id: GroupId) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| s.group_id() == Some(group_id))
            })
            .copied()
            .collect()
    }

    /// Union of the members' bounds.
    pub fn group_bounds(&self, group_id: GroupId) -> Option<Rect> {
        self.group_members(group_id)
            .into_iter()
            .filter_map(|id| self.get_shape(id).map(Shape::bounds))
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Shapes a resize of `shape_id` acts on, and the bounds their handles
    /// sit on: the whole group for a grouped box, the shape alone otherwise.
    pub fn resize_scope(&self, shape_id: ShapeId) -> Option<(Rect, Vec<ShapeId>)> {
        let shape = self.get_shape(shape_id)?;
        if let Some(group_id) = shape.group_id() {
            let members = self.group_members(group_id);
            let bounds = self.group_bounds(group_id)?;
            if members.len() > 1 {
                return Some((bounds, members));
            }
        }
        Some((shape.bounds(), vec![shape_id]))
    }
}

/// Transient drawing aids for the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Attachment point of the pending first anchor.
    pub pending_anchor: Option<Point>,
    /// Connector preview from the pending anchor to the pointer or the
    /// second anchor.
    pub preview: Option<(Point, Point)>,
    /// Polygon of the lasso being drawn.
    pub lasso_points: Vec<Point>,
    /// Persisted lasso frame.
    pub lasso_frame: Option<Vec<Point>>,
    /// Resize handles of the single selected shape or its group.
    pub handles: Vec<Handle>,
    /// What the pointer is over.
    pub hover: Hover,
}

/// Runtime editor session.
///
/// Owns the document, camera, tools, widget state, the active gesture and
/// configuration. Every input event is handled to completion by a `&mut`
/// method.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Camera for view transform.
    pub camera: Camera,
    /// Tool manager.
    pub tool_manager: ToolManager,
    /// Widget manager for UI state (selection, hover, editing).
    pub widgets: WidgetManager,
    pub(crate) config: EditorConfig,
    pub(crate) gesture: Gesture,
    pub(crate) lasso_frame: Option<LassoFrame>,
    pub(crate) hover: Hover,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document and default settings.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create a canvas with custom settings.
    pub fn with_config(config: EditorConfig) -> Self {
        let mut tool_manager = ToolManager::new();
        tool_manager.current_color = config.ambient();
        Self {
            document: CanvasDocument::new(),
            camera: Camera::new(),
            tool_manager,
            widgets: WidgetManager::new(),
            config,
            gesture: Gesture::Idle,
            lasso_frame: None,
            hover: Hover::None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The active gesture.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// The persisted lasso frame, if any.
    pub fn lasso_frame(&self) -> Option<&LassoFrame> {
        self.lasso_frame.as_ref()
    }

    pub fn hover(&self) -> Hover {
        self.hover
    }

    /// Select a shape (clears previous shape selection).
    pub fn select(&mut self, id: ShapeId) {
        self.widgets.select(id);
    }

    /// Add to selection.
    pub fn add_to_selection(&mut self, id: ShapeId) {
        self.widgets.add_to_selection(id);
    }

    /// Clear shape and connection selection.
    pub fn clear_selection(&mut self) {
        self.widgets.clear_all();
    }

    /// Check if a shape is selected.
    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.widgets.is_selected(id)
    }

    /// Get widget state for a shape.
    pub fn widget_state(&self, id: ShapeId) -> WidgetState {
        self.widgets.state(id)
    }

    /// Set the current tool.
    ///
    /// Drops the persisted lasso frame, any armed placement and any pending
    /// connection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
        self.lasso_frame = None;
        self.gesture = Gesture::Idle;
        debug!("Tool changed to {tool:?}");
    }

    /// Arm a one-shot placement for the next primary click.
    pub fn arm_placement(&mut self, kind: ShapeKind) {
        self.tool_manager.arm(kind);
    }

    /// Drop a shape from the toolbar at a screen position.
    ///
    /// Dropping a box onto a box splits it. Returns the new shape.
    pub fn drop_shape(&mut self, kind: ShapeKind, screen_point: Point) -> Option<ShapeId> {
        let point = self.camera.screen_to_world(screen_point);
        self.place_shape(kind, point)
    }

    /// Create a shape centered on `point`, or split the box under it.
    pub(crate) fn place_shape(&mut self, kind: ShapeKind, point: Point) -> Option<ShapeId> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return None;
        }
        if kind == ShapeKind::Box {
            let target = self
                .document
                .shapes_at_point(point)
                .into_iter()
                .find(|id| matches!(self.document.get_shape(*id), Some(Shape::Rectangle(_))));
            if let Some(target) = target {
                let color = self.tool_manager.current_color;
                return self
                    .document
                    .split_box(target, point, color)
                    .map(|result| result.created);
            }
        }
        let shape = self.tool_manager.create_shape(kind, point, &self.config);
        let id = shape.id();
        self.document.add_shape(shape);
        debug!("Placed {kind:?} {id} at {point:?}");
        Some(id)
    }

    /// Set the ambient color and recolor the current selection.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.tool_manager.current_color = color;
        for &id in self.widgets.selected() {
            if let Some(shape) = self.document.get_shape_mut(id) {
                shape.set_color(color);
            }
        }
        for &id in self.widgets.selected_connections() {
            self.document.set_connection_color(id, color);
        }
    }

    /// Remove a shape with its connections and every reference to it.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let connections = self.document.connections_of(id);
        let shape = self.document.remove_shape(id)?;
        self.widgets.remove(id);
        for conn in connections {
            self.widgets.remove_connection(conn);
        }
        if self.gesture.references(id) {
            self.gesture = Gesture::Idle;
        }
        if self.hover.references(id) {
            self.hover = Hover::None;
        }
        Some(shape)
    }

    /// Remove a connection and drop it from the selection.
    pub fn delete_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let conn = self.document.delete_connection(id)?;
        self.widgets.remove_connection(id);
        if self.hover == Hover::Connection(id) {
            self.hover = Hover::None;
        }
        Some(conn)
    }

    /// Delete every selected connection and shape. Ignored while a label is
    /// being edited. Returns whether anything was deleted.
    pub fn delete_selected(&mut self) -> bool {
        if self.widgets.is_editing() || !self.widgets.has_selection() {
            return false;
        }
        let connections: Vec<_> = self.widgets.selected_connections().iter().copied().collect();
        let shapes: Vec<_> = self.widgets.selected().iter().copied().collect();
        for id in connections {
            self.delete_connection(id);
        }
        for id in shapes {
            self.remove_shape(id);
        }
        self.widgets.clear_all();
        true
    }

    /// Start editing a shape's label. Returns the current text.
    pub fn begin_edit(&mut self, shape_id: ShapeId) -> Option<String> {
        let text = self.document.get_shape(shape_id)?.label().unwrap_or_default().to_string();
        self.widgets.enter_editing(shape_id);
        debug!("Editing label of {shape_id}");
        Some(text)
    }

    /// Store edited text on a shape and end its edit session.
    pub fn commit_edit(&mut self, shape_id: ShapeId, text: &str) -> bool {
        let Some(shape) = self.document.get_shape_mut(shape_id) else {
            return false;
        };
        shape.set_label(text);
        if self.widgets.is_editing_shape(shape_id) {
            self.widgets.exit_editing();
        }
        true
    }

    /// Abandon the current edit, keeping the previous text.
    pub fn cancel_edit(&mut self) {
        self.widgets.exit_editing();
    }

    /// Shape whose label is being edited.
    pub fn editing_shape(&self) -> Option<ShapeId> {
        self.widgets.editing()
    }

    /// Record the rendered width of a text label.
    pub fn set_measured_text_width(&mut self, shape_id: ShapeId, width: f64) -> bool {
        match self.document.get_shape_mut(shape_id).and_then(Shape::as_text_mut) {
            Some(text) => {
                text.set_measured_width(width);
                true
            }
            None => false,
        }
    }

    /// Resize handles for the single selected shape.
    pub fn selection_handles(&self) -> Vec<Handle> {
        let Some(id) = self.widgets.single_selected() else {
            return Vec::new();
        };
        let Some(shape) = self.document.get_shape(id) else {
            return Vec::new();
        };
        let padding = self.config.handle_padding;
        match self.document.resize_scope(id) {
            Some((bounds, members)) if members.len() > 1 => {
                handles_for_rect(bounds, padding, false)
            }
            _ => shape.resize_handles(padding),
        }
    }

    /// Snapshot of the transient drawing aids.
    pub fn overlay(&self) -> Overlay {
        let mut overlay = Overlay {
            lasso_frame: self.lasso_frame.as_ref().map(|frame| frame.points.clone()),
            handles: self.selection_handles(),
            hover: self.hover,
            ..Overlay::default()
        };
        match &self.gesture {
            Gesture::EdgeSelectingFirst { anchor, pointer } => {
                if let Some(start) = self.document.anchor_point(*anchor) {
                    overlay.pending_anchor = Some(start);
                    overlay.preview = Some((start, *pointer));
                }
            }
            Gesture::AwaitingDirection { from, to } => {
                if let (Some(start), Some(end)) = (
                    self.document.anchor_point(*from),
                    self.document.anchor_point(*to),
                ) {
                    overlay.pending_anchor = Some(start);
                    overlay.preview = Some((start, end));
                }
            }
            Gesture::LassoDrawing { points, .. } => overlay.lasso_points = points.clone(),
            _ => {}
        }
        overlay
    }

    /// Reset the session: empty document, origin camera, default tool.
    pub fn clear(&mut self) {
        self.document.clear();
        self.camera.reset();
        self.tool_manager = ToolManager::new();
        self.tool_manager.current_color = self.config.ambient();
        self.widgets.reset();
        self.gesture = Gesture::Idle;
        self.lasso_frame = None;
        self.hover = Hover::None;
    }
}
