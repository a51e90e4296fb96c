//! Error types.

use crate::shapes::{Edge, ShapeId};
use thiserror::Error;

/// Why a connection request was refused. A refused request changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape {0} has no edges")]
    NoEdges(ShapeId),
    #[error("Cannot connect the {0} edge of a shape to itself")]
    SameEdge(Edge),
    #[error("The {edge} edge of {shape} was created by a split")]
    SeamEdge { shape: ShapeId, edge: Edge },
    #[error("The {edge} edge of {shape} already hosts a connection")]
    EdgeOccupied { shape: ShapeId, edge: Edge },
}

/// Result type for connection operations.
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Invalid editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
