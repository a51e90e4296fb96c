//! Editor configuration.

use crate::error::ConfigError;
use crate::shapes::SerializableColor;
use log::warn;
use serde::{Deserialize, Serialize};

/// Tunables for hit-testing, snapping and shape defaults.
///
/// Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spacing of the snap grid.
    pub grid_pitch: f64,
    /// Snap drag destinations to the grid.
    pub snap_drag: bool,
    /// Snap placed shapes to the grid.
    pub snap_placement: bool,
    /// Distance from an outline that still counts as an edge hit.
    pub edge_tolerance: f64,
    /// Distance from a connector that still counts as a hit.
    pub connection_tolerance: f64,
    /// Radius around connector endpoints where connector hits are ignored.
    pub endpoint_exclusion_radius: f64,
    /// Zone around a shape used to pick the second anchor of a connection.
    pub connection_padding: f64,
    /// Gap between a shape's bounds and its resize handles.
    pub handle_padding: f64,
    /// Pointer radius for grabbing a resize handle.
    pub handle_hit_radius: f64,
    /// Smallest width or height a resize can produce.
    pub min_shape_size: f64,
    /// Smallest font size a text resize can produce.
    pub min_font_size: f64,
    pub default_box_width: f64,
    pub default_box_height: f64,
    pub default_ellipse_radius: f64,
    pub default_font_size: f64,
    /// Color given to new shapes and connectors, as `#rrggbb`.
    pub ambient_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_pitch: 96.0,
            snap_drag: true,
            snap_placement: true,
            edge_tolerance: 10.0,
            connection_tolerance: 10.0,
            endpoint_exclusion_radius: 15.0,
            connection_padding: 20.0,
            handle_padding: 8.0,
            handle_hit_radius: 6.0,
            min_shape_size: 20.0,
            min_font_size: 10.0,
            default_box_width: 80.0,
            default_box_height: 80.0,
            default_ellipse_radius: 40.0,
            default_font_size: 20.0,
            ambient_color: "#667eea".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().inspect_err(|e| warn!("Rejected editor config: {e}"))?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every numeric field is finite and in range, and that the
    /// ambient color parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("grid_pitch", self.grid_pitch),
            ("min_shape_size", self.min_shape_size),
            ("min_font_size", self.min_font_size),
            ("default_box_width", self.default_box_width),
            ("default_box_height", self.default_box_height),
            ("default_ellipse_radius", self.default_ellipse_radius),
            ("default_font_size", self.default_font_size),
        ];
        let non_negative = [
            ("edge_tolerance", self.edge_tolerance),
            ("connection_tolerance", self.connection_tolerance),
            ("endpoint_exclusion_radius", self.endpoint_exclusion_radius),
            ("connection_padding", self.connection_padding),
            ("handle_padding", self.handle_padding),
            ("handle_hit_radius", self.handle_hit_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        if SerializableColor::from_hex(&self.ambient_color).is_none() {
            return Err(ConfigError::InvalidColor(self.ambient_color.clone()));
        }
        Ok(())
    }

    /// Parsed ambient color.
    pub fn ambient(&self) -> SerializableColor {
        SerializableColor::from_hex(&self.ambient_color).unwrap_or_default()
    }
}
