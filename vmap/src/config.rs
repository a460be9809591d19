//! Configuration of a map instance.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use vmap_types::geo::Crs;

use crate::control::MapControllerConfiguration;
use crate::error::VmapError;

/// Units of the scale line control.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleLineUnits {
    /// Meters and kilometers.
    #[default]
    Metric,
    /// Feet and miles.
    Imperial,
    /// Nautical miles.
    Nautical,
    /// US survey feet and miles.
    Us,
    /// Degrees.
    Degrees,
}

impl Display for ScaleLineUnits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScaleLineUnits::Metric => "metric",
            ScaleLineUnits::Imperial => "imperial",
            ScaleLineUnits::Nautical => "nautical",
            ScaleLineUnits::Us => "us",
            ScaleLineUnits::Degrees => "degrees",
        };
        f.write_str(name)
    }
}

/// Settings a map instance is created with.
///
/// Field names in JSON are in camelCase, e.g. `minZoom` or `altShiftDragRotate`. Missing fields
/// get the default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Initial center of the map in [`MapConfig::projection`].
    pub center: [f64; 2],
    /// Projection of the center and of the mouse position control.
    pub projection: Crs,
    /// Initial zoom level.
    pub zoom: f64,
    /// Minimum zoom level.
    pub min_zoom: f64,
    /// Maximum zoom level.
    pub max_zoom: f64,
    /// Area the map center is kept in, as `[min_x, min_y, max_x, max_y]` in
    /// [`MapConfig::projection`]. Not limited if not set.
    pub extent: Option<[f64; 4]>,

    /// Rotation by dragging, and the rotate control.
    pub alt_shift_drag_rotate: bool,
    /// Zoom in by double click.
    pub double_click_zoom: bool,
    /// Keyboard navigation.
    pub keyboard: bool,
    /// Zoom by the mouse wheel.
    pub mouse_wheel_zoom: bool,
    /// Zoom to a box dragged with shift. Not supported by the map controller, kept for
    /// compatibility of configuration documents.
    pub shift_drag_zoom: bool,
    /// Pan by dragging.
    pub drag_pan: bool,
    /// Rotation by pinch gestures. Not supported by the map controller, kept for compatibility
    /// of configuration documents.
    pub pinch_rotate: bool,
    /// Zoom by pinch gestures.
    pub pinch_zoom: bool,

    /// Full screen control.
    pub full_screen: bool,
    /// Overview map control.
    pub overview_map: bool,
    /// Zoom slider control.
    pub zoom_slider: bool,
    /// Scale line control.
    pub scale_line: bool,
    /// Units of the scale line.
    pub scale_line_units: ScaleLineUnits,
    /// Mouse position control.
    pub mouse_position: bool,
    /// Number of digits after the decimal point in the mouse position control.
    pub mouse_position_fraction_digits: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            projection: Crs::EPSG4326,
            zoom: 2.0,
            min_zoom: 0.0,
            max_zoom: 28.0,
            extent: None,
            alt_shift_drag_rotate: true,
            double_click_zoom: true,
            keyboard: true,
            mouse_wheel_zoom: true,
            shift_drag_zoom: true,
            drag_pan: true,
            pinch_rotate: true,
            pinch_zoom: true,
            full_screen: false,
            overview_map: false,
            zoom_slider: false,
            scale_line: false,
            scale_line_units: ScaleLineUnits::Metric,
            mouse_position: false,
            mouse_position_fraction_digits: 4,
        }
    }
}

impl MapConfig {
    /// Parses a JSON configuration document and checks it with [`MapConfig::validate`].
    pub fn from_json(text: &str) -> Result<Self, VmapError> {
        let config: MapConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the zoom levels are finite and the zoom range is not empty.
    pub fn validate(&self) -> Result<(), VmapError> {
        let zooms = [self.zoom, self.min_zoom, self.max_zoom];
        if zooms.iter().any(|z| !z.is_finite()) {
            return Err(VmapError::Config(format!(
                "zoom levels must be finite numbers, got {zooms:?}"
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(VmapError::Config(format!(
                "minZoom {} is greater than maxZoom {}",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.center.iter().any(|c| !c.is_finite()) {
            return Err(VmapError::Config(format!(
                "center must be finite, got {:?}",
                self.center
            )));
        }

        if let Some([x_min, y_min, x_max, y_max]) = self.extent {
            if [x_min, y_min, x_max, y_max].iter().any(|c| !c.is_finite())
                || x_min > x_max
                || y_min > y_max
            {
                return Err(VmapError::Config(format!(
                    "extent must be finite [minX, minY, maxX, maxY], got {:?}",
                    self.extent
                )));
            }
        }

        Ok(())
    }

    /// Navigation settings of the map controller.
    pub fn controller_configuration(&self) -> MapControllerConfiguration {
        MapControllerConfiguration::default()
            .with_drag_pan(self.drag_pan)
            .with_drag_rotate(self.alt_shift_drag_rotate)
            .with_mouse_wheel_zoom(self.mouse_wheel_zoom)
            .with_double_click_zoom(self.double_click_zoom)
            .with_pinch_zoom(self.pinch_zoom)
            .with_keyboard(self.keyboard)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_fields_get_defaults() {
        let config = MapConfig::from_json(
            r#"{
                "center": [8.4, 49.0],
                "zoom": 12,
                "doubleClickZoom": false,
                "scaleLine": true,
                "scaleLineUnits": "nautical",
                "projection": "EPSG:505456"
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.center, [8.4, 49.0]);
        assert_eq!(config.zoom, 12.0);
        assert_eq!(config.max_zoom, 28.0);
        assert_eq!(config.projection, Crs::EPSG505456);
        assert!(!config.double_click_zoom);
        assert!(config.keyboard);
        assert_eq!(config.scale_line_units, ScaleLineUnits::Nautical);
        assert_eq!(config.mouse_position_fraction_digits, 4);
        assert_eq!(config.extent, None);

        assert_eq!(MapConfig::from_json("{}").ok(), Some(MapConfig::default()));
    }

    #[test]
    fn invalid_documents() {
        assert_matches!(MapConfig::from_json("[1, 2]"), Err(VmapError::Json(_)));
        assert_matches!(
            MapConfig::from_json(r#"{"minZoom": 10, "maxZoom": 5}"#),
            Err(VmapError::Config(_))
        );
        assert_matches!(
            MapConfig::from_json(r#"{"scaleLineUnits": "parsecs"}"#),
            Err(VmapError::Json(_))
        );
        assert_matches!(
            MapConfig::from_json(r#"{"extent": [10, 0, -10, 5]}"#),
            Err(VmapError::Config(_))
        );
    }

    #[test]
    fn controller_follows_config() {
        let config = MapConfig {
            alt_shift_drag_rotate: false,
            mouse_wheel_zoom: false,
            ..Default::default()
        };
        let controller = config.controller_configuration();

        assert!(!controller.drag_rotate());
        assert!(!controller.mouse_wheel_zoom());
        assert!(controller.drag_pan());
        assert!(controller.double_click_zoom());
    }
}
