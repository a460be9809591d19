use vmap_types::cartesian::Point2d;
use vmap_types::geometry::Geom;

const ACTIVE_OFFSET: [f64; 2] = [0.0, -50.0];
const STATIC_OFFSET: [f64; 2] = [0.0, -30.0];

/// Label showing the result of a measurement on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    /// Measured value with units, e.g. `12.5 km`.
    pub text: String,
    /// Anchor of the tooltip in map coordinates.
    pub position: Option<Point2d>,
    /// Offset of the tooltip from the anchor in pixels.
    pub offset: [f64; 2],
    /// Static tooltips show finished measurements and do not change anymore.
    pub is_static: bool,
}

impl Tooltip {
    fn active() -> Self {
        Self {
            text: String::new(),
            position: None,
            offset: ACTIVE_OFFSET,
            is_static: false,
        }
    }
}

/// Tooltips of the measure interactions.
#[derive(Debug, Clone)]
pub(super) struct Measure {
    tooltip: Tooltip,
    finished: Vec<Tooltip>,
}

impl Default for Measure {
    fn default() -> Self {
        Self {
            tooltip: Tooltip::active(),
            finished: vec![],
        }
    }
}

impl Measure {
    pub(super) fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub(super) fn finished(&self) -> &[Tooltip] {
        &self.finished
    }

    /// Updates the active tooltip with the measurement of the sketch geometry.
    pub(super) fn update(&mut self, sketch: &Geom, pointer: Point2d) {
        let (text, position) = match sketch {
            Geom::Polygon(_) => (format_area(sketch.area()), sketch.interior_point()),
            Geom::LineString(_) => (format_length(sketch.length()), sketch.last_coordinate()),
            _ => return,
        };

        self.tooltip.text = text;
        self.tooltip.position = Some(position.unwrap_or(pointer));
    }

    /// Makes the active tooltip static and starts a new one.
    pub(super) fn finish(&mut self) {
        let mut tooltip = std::mem::replace(&mut self.tooltip, Tooltip::active());
        tooltip.is_static = true;
        tooltip.offset = STATIC_OFFSET;

        log::debug!("Measurement finished: {}", tooltip.text);
        self.finished.push(tooltip);
    }

    /// Drops the measurement in progress, finished tooltips stay.
    pub(super) fn cancel(&mut self) {
        self.tooltip = Tooltip::active();
    }

    pub(super) fn clear(&mut self) {
        *self = Self::default();
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Area in square meters as text: `km²` for areas above 10000 m², `m²` otherwise.
pub fn format_area(area: f64) -> String {
    if area > 10000.0 {
        format!("{} km²", round2(area / 1_000_000.0))
    } else {
        format!("{} m²", round2(area))
    }
}

/// Length in meters as text: `km` for lengths above 100 m, `m` otherwise.
pub fn format_length(length: f64) -> String {
    let length = round2(length);
    if length > 100.0 {
        format!("{} km", round2(length / 1000.0))
    } else {
        format!("{} m", round2(length))
    }
}
