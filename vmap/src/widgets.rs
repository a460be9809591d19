//! Map controls (widgets) shown on top of the map.
//!
//! The widgets are not drawn by this crate. [`Controls`] describes which controls a map instance
//! has and computes the content of the ones that show map data: the mouse position and the scale
//! line.

use vmap_types::cartesian::Point2d;
use vmap_types::geo::{Crs, ProjectionRegistry};

use crate::config::{MapConfig, ScaleLineUnits};
use crate::view::MapView;

/// Radius of the Web Mercator sphere.
const EARTH_RADIUS: f64 = 6_378_137.0;
/// Length of one degree of longitude on the equator, in meters.
const METERS_PER_DEGREE: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS / 360.0;

/// A map control.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Zoom in and out buttons.
    Zoom,
    /// Button that resets the rotation.
    Rotate,
    /// Full screen toggle.
    FullScreen,
    /// Small map with the current extent.
    OverviewMap {
        /// Whether the overview is collapsed initially.
        collapsed: bool,
    },
    /// Zoom slider.
    ZoomSlider,
    /// Scale bar.
    ScaleLine(ScaleLine),
    /// Coordinates of the pointer.
    MousePosition(MousePosition),
}

/// Controls of a map instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    controls: Vec<Control>,
}

impl Controls {
    /// Controls enabled by the configuration. The zoom control is always present. The rotate
    /// control is present when rotation is enabled. Attribution is never shown.
    pub fn from_config(config: &MapConfig) -> Self {
        let mut controls = vec![Control::Zoom];
        if config.alt_shift_drag_rotate {
            controls.push(Control::Rotate);
        }
        if config.full_screen {
            controls.push(Control::FullScreen);
        }
        if config.overview_map {
            controls.push(Control::OverviewMap { collapsed: false });
        }
        if config.zoom_slider {
            controls.push(Control::ZoomSlider);
        }
        if config.scale_line {
            controls.push(Control::ScaleLine(ScaleLine::new(config.scale_line_units)));
        }
        if config.mouse_position {
            controls.push(Control::MousePosition(MousePosition::new(
                config.projection.clone(),
                config.mouse_position_fraction_digits,
            )));
        }

        log::debug!("Map controls: {controls:?}");
        Self { controls }
    }

    /// All the controls in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Control> + '_ {
        self.controls.iter()
    }

    /// Number of controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Returns true if there are no controls.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// The mouse position control, if enabled.
    pub fn mouse_position(&self) -> Option<&MousePosition> {
        self.controls.iter().find_map(|c| match c {
            Control::MousePosition(control) => Some(control),
            _ => None,
        })
    }

    /// The scale line control, if enabled.
    pub fn scale_line(&self) -> Option<&ScaleLine> {
        self.controls.iter().find_map(|c| match c {
            Control::ScaleLine(control) => Some(control),
            _ => None,
        })
    }
}

/// Shows the coordinates of the pointer in a given projection.
#[derive(Debug, Clone, PartialEq)]
pub struct MousePosition {
    projection: Crs,
    fraction_digits: usize,
}

impl MousePosition {
    /// Creates the control.
    pub fn new(projection: Crs, fraction_digits: usize) -> Self {
        Self {
            projection,
            fraction_digits,
        }
    }

    /// Projection of the shown coordinates.
    pub fn projection(&self) -> &Crs {
        &self.projection
    }

    /// Formats a map coordinate (in `EPSG:3857`) as `x, y` in the control projection.
    ///
    /// Returns `None` if the coordinate cannot be transformed.
    pub fn format(&self, coordinate: &Point2d) -> Option<String> {
        let registry = ProjectionRegistry::global().read();
        let point = match registry.transform(coordinate, &Crs::EPSG3857, &self.projection) {
            Ok(point) => point,
            Err(err) => {
                log::warn!("Cannot show mouse position {coordinate:?}: {err}");
                return None;
            }
        };

        let digits = self.fraction_digits;
        Some(format!("{:.*}, {:.*}", digits, point.x, digits, point.y))
    }
}

/// Scale bar with the length rounded to 1, 2 or 5 times a power of ten.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLine {
    units: ScaleLineUnits,
    min_width: f64,
}

/// Content of a scale line for a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLineText {
    /// Width of the bar in pixels.
    pub width: f64,
    /// Length the bar represents, e.g. `500 m`.
    pub text: String,
}

impl ScaleLine {
    /// Default minimum width of the bar in pixels.
    pub const MIN_WIDTH: f64 = 64.0;

    /// Creates the control.
    pub fn new(units: ScaleLineUnits) -> Self {
        Self {
            units,
            min_width: Self::MIN_WIDTH,
        }
    }

    /// Units of the scale.
    pub fn units(&self) -> ScaleLineUnits {
        self.units
    }

    /// Bar for the view, at least [`ScaleLine::MIN_WIDTH`] pixels wide. The scale is measured at
    /// the view center, as Web Mercator stretches distances away from the equator.
    pub fn render(&self, view: &MapView) -> ScaleLineText {
        let meters_per_pixel = view.resolution() / (view.center().y / EARTH_RADIUS).cosh();
        let nominal = self.min_width * meters_per_pixel;
        let (suffix, units_per_meter) = self.unit_for(nominal);
        let units_per_pixel = meters_per_pixel * units_per_meter;
        if !units_per_pixel.is_finite() || units_per_pixel <= 0.0 {
            return ScaleLineText {
                width: self.min_width,
                text: String::new(),
            };
        }

        let mut exponent = (self.min_width * units_per_pixel).log10().floor() as i32;
        loop {
            for digit in [1.0, 2.0, 5.0] {
                let count = digit * 10f64.powi(exponent);
                let width = (count / units_per_pixel).round();
                if width >= self.min_width {
                    return ScaleLineText {
                        width,
                        text: format!("{count} {suffix}"),
                    };
                }
            }
            exponent += 1;
        }
    }

    fn unit_for(&self, nominal_meters: f64) -> (&'static str, f64) {
        match self.units {
            ScaleLineUnits::Metric => {
                if nominal_meters < 0.001 {
                    ("μm", 1_000_000.0)
                } else if nominal_meters < 1.0 {
                    ("mm", 1000.0)
                } else if nominal_meters < 1000.0 {
                    ("m", 1.0)
                } else {
                    ("km", 0.001)
                }
            }
            ScaleLineUnits::Imperial => {
                if nominal_meters < 0.9144 {
                    ("in", 1.0 / 0.0254)
                } else if nominal_meters < 1609.344 {
                    ("ft", 1.0 / 0.3048)
                } else {
                    ("mi", 1.0 / 1609.344)
                }
            }
            ScaleLineUnits::Us => {
                if nominal_meters < 0.9144 {
                    ("in", 39.37)
                } else if nominal_meters < 1609.347 {
                    ("ft", 1.0 / 0.30480061)
                } else {
                    ("mi", 1.0 / 1609.347)
                }
            }
            ScaleLineUnits::Nautical => ("nm", 1.0 / 1852.0),
            ScaleLineUnits::Degrees => {
                let degrees = nominal_meters / METERS_PER_DEGREE;
                if degrees < 1.0 / 60.0 {
                    ("″", 3600.0 / METERS_PER_DEGREE)
                } else if degrees < 1.0 {
                    ("′", 60.0 / METERS_PER_DEGREE)
                } else {
                    ("°", 1.0 / METERS_PER_DEGREE)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vmap_types::cartesian::Size;

    use super::*;
    use crate::view::zoom_for_resolution;

    #[test]
    fn controls_follow_config() {
        let controls = Controls::from_config(&MapConfig::default());
        assert_eq!(
            controls.iter().cloned().collect::<Vec<_>>(),
            [Control::Zoom, Control::Rotate]
        );

        let config = MapConfig {
            alt_shift_drag_rotate: false,
            overview_map: true,
            scale_line: true,
            mouse_position: true,
            mouse_position_fraction_digits: 2,
            ..Default::default()
        };
        let controls = Controls::from_config(&config);
        assert_eq!(controls.len(), 4);
        assert_matches!(
            controls.iter().nth(1),
            Some(Control::OverviewMap { collapsed: false })
        );
        assert_eq!(
            controls.scale_line().map(|s| s.units()),
            Some(ScaleLineUnits::Metric)
        );
        assert_eq!(
            controls.mouse_position().map(|m| m.projection()),
            Some(&Crs::EPSG4326)
        );
    }

    #[test]
    fn mouse_position_text() {
        // One degree east and north of the null island.
        let control = MousePosition::new(Crs::EPSG4326, 2);
        assert_eq!(
            control.format(&Point2d::new(111_319.49, 111_325.14)).as_deref(),
            Some("1.00, 1.00")
        );

        let control = MousePosition::new(Crs::EPSG3857, 1);
        assert_eq!(
            control.format(&Point2d::new(1234.56, -7.0)).as_deref(),
            Some("1234.6, -7.0")
        );

        let unknown = MousePosition::new(Crs::new("EPSG:0"), 2);
        assert!(unknown.format(&Point2d::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn scale_line_steps() {
        let view = |resolution: f64| {
            MapView::new(Point2d::new(0.0, 0.0), zoom_for_resolution(resolution))
                .with_size(Size::new(500.0, 500.0))
        };
        let metric = ScaleLine::new(ScaleLineUnits::Metric);

        // 64 px are 64 m, the next step is 100 m.
        let scale = metric.render(&view(1.0));
        assert_eq!(scale.text, "100 m");
        assert_eq!(scale.width, 100.0);

        // 64 px are 640 m, the next step is 1000 m.
        assert_eq!(metric.render(&view(10.0)).text, "1000 m");
        // 64 px are 1.6 km, the next step is 2 km.
        assert_eq!(metric.render(&view(25.0)).text, "2 km");

        let nautical = ScaleLine::new(ScaleLineUnits::Nautical);
        assert_eq!(nautical.render(&view(100.0)).text, "5 nm");
    }
}
