//! Boxwire Core Library
//!
//! Geometry, hit-testing and the interaction state machine for a box-and-wire
//! diagram editor. Rendering, text editing widgets and persistence live with
//! the host.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod connection;
pub mod error;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod split;
pub mod tools;
pub mod widget;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasDocument, Overlay};
pub use config::EditorConfig;
pub use connection::{Connection, ConnectionId, Direction, EdgeAnchor};
pub use error::{ConfigError, ConnectError, ConnectResult};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Gesture, Hover};
pub use selection::{LassoFrame, ManipulationState, MultiMoveState, point_in_polygon};
pub use shapes::{Edge, SerializableColor, Shape, ShapeId, ShapeKind};
pub use snap::{GRID_SIZE, snap, snap_point, snap_to_grid};
pub use split::{SplitAxis, SplitResult, plan_split};
pub use tools::{ToolKind, ToolManager};
pub use widget::{Handle, HandleKind, WidgetManager, WidgetState};
