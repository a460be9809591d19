use vmap_types::cartesian::{CartesianPoint2d, Point2d};

use crate::events::SelectedFeature;
use crate::interaction::select::feature_mut;
use crate::map::Map;

/// Editing drag in progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum EditDrag {
    /// A vertex of a selected feature follows the pointer.
    Vertex {
        selection_index: usize,
        vertex_index: usize,
    },
    /// All selected features follow the pointer.
    Translate,
}

/// The vertex of the selected features nearest to the point, within the tolerance in map units.
/// Returns the index of the selected feature and the index of the vertex in it.
pub(super) fn find_vertex(
    selected: &[SelectedFeature],
    point: &Point2d,
    tolerance: f64,
) -> Option<(usize, usize)> {
    selected
        .iter()
        .enumerate()
        .flat_map(|(selection_index, selected)| {
            selected
                .feature
                .geometry()
                .vertices()
                .enumerate()
                .map(move |(vertex_index, vertex)| {
                    (selection_index, vertex_index, vertex.distance(point))
                })
        })
        .filter(|(_, _, distance)| *distance <= tolerance)
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(selection_index, vertex_index, _)| (selection_index, vertex_index))
}

/// Index of the selected feature whose geometry is within the tolerance from the point.
pub(super) fn find_feature(
    selected: &[SelectedFeature],
    point: &Point2d,
    tolerance: f64,
) -> Option<usize> {
    selected
        .iter()
        .rposition(|selected| selected.feature.geometry().contains_point(point, tolerance))
}

/// Moves a vertex of the selected feature in the map layer, and refreshes the copy in the
/// selection.
pub(super) fn move_vertex(
    map: &mut Map,
    selected: &mut SelectedFeature,
    vertex_index: usize,
    to: Point2d,
) -> bool {
    let Some(feature) = feature_mut(map, selected) else {
        log::warn!("Selected feature is not in the map anymore");
        return false;
    };

    let Some(vertex) = feature.geometry_mut().vertices_mut().nth(vertex_index) else {
        return false;
    };
    *vertex = to;

    selected.feature = feature.clone();
    map.redraw();
    true
}

/// Moves all the selected features by the offset in map units.
pub(super) fn translate(map: &mut Map, selected: &mut [SelectedFeature], dx: f64, dy: f64) {
    for selected in selected {
        match feature_mut(map, selected) {
            Some(feature) => {
                feature.geometry_mut().translate(dx, dy);
                selected.feature = feature.clone();
            }
            None => log::warn!("Selected feature is not in the map anymore"),
        }
    }

    map.redraw();
}
