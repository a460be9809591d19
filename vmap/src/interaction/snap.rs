use vmap_types::cartesian::{CartesianPoint2d, Point2d};

use crate::layer::Feature;
use crate::view::MapView;

/// Default snap distance in pixels.
pub const SNAP_TOLERANCE_PX: f64 = 10.0;

/// Pulls points to the vertices of the given features.
#[derive(Debug, Clone, Copy)]
pub(super) struct Snap {
    enabled: bool,
    tolerance_px: f64,
}

impl Default for Snap {
    fn default() -> Self {
        Self {
            enabled: false,
            tolerance_px: SNAP_TOLERANCE_PX,
        }
    }
}

impl Snap {
    pub(super) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(super) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The nearest vertex of the features that is within the tolerance from the point on the
    /// screen. If there is none, or snapping is disabled, the point itself.
    pub(super) fn snap<'a>(
        &self,
        point: Point2d,
        view: &MapView,
        features: impl IntoIterator<Item = &'a Feature>,
    ) -> Point2d {
        if !self.enabled {
            return point;
        }

        let tolerance = self.tolerance_px * view.resolution();
        features
            .into_iter()
            .flat_map(|feature| feature.geometry().vertices())
            .map(|vertex| (vertex, vertex.distance(&point)))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(point, |(vertex, _)| *vertex)
    }
}
