use std::sync::Arc;

use parking_lot::RwLock;
use vmap_types::cartesian::Point2d;

use crate::events::{allows, MapEvent, SelectFilter, SelectedFeature};
use crate::layer::{Feature, Layer, VectorLayer};
use crate::map::Map;

/// Features closer than this to the click position are hit.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// Selection of features by clicking the map.
pub(super) struct Select {
    filter: Arc<RwLock<Option<SelectFilter>>>,
    selected: Vec<SelectedFeature>,
}

impl Select {
    pub(super) fn new(filter: Arc<RwLock<Option<SelectFilter>>>) -> Self {
        Self {
            filter,
            selected: vec![],
        }
    }

    pub(super) fn selected(&self) -> &[SelectedFeature] {
        &self.selected
    }

    pub(super) fn selected_mut(&mut self) -> &mut [SelectedFeature] {
        &mut self.selected
    }

    /// Replaces the selection with the feature at the pixel. If the selection changes, a
    /// [`MapEvent::FeatureSelect`] is queued in the map.
    pub(super) fn click(&mut self, map: &mut Map, pixel: Point2d) {
        let hit = self.hit(map, pixel);
        let selected: Vec<SelectedFeature> = hit.into_iter().collect();

        if selected != self.selected {
            log::debug!("Selected {} features", selected.len());
            self.selected = selected;
            map.notify(MapEvent::FeatureSelect(self.selected.clone()));
        }
    }

    /// Clears the selection. Returns true if something was selected.
    pub(super) fn clear(&mut self, map: &mut Map) -> bool {
        if self.selected.is_empty() {
            return false;
        }

        self.selected.clear();
        map.notify(MapEvent::FeatureSelect(vec![]));
        true
    }

    /// Top-most feature at the pixel allowed by the select filter. Hidden layers are skipped.
    fn hit(&self, map: &Map, pixel: Point2d) -> Option<SelectedFeature> {
        let view = map.view();
        let point = view.screen_to_map(pixel);
        let tolerance = HIT_TOLERANCE_PX * view.resolution();
        let layers = map.layers();

        for layer_index in (0..layers.len()).rev() {
            if !layers.is_visible(layer_index) {
                continue;
            }

            let Some(layer) = layers[layer_index].as_any().downcast_ref::<VectorLayer>() else {
                continue;
            };
            let layer_id = layer.id().map(str::to_string);

            let found = layer
                .source()
                .features()
                .iter()
                .enumerate()
                .rev()
                .find(|(_, feature)| {
                    feature.geometry().contains_point(&point, tolerance)
                        && allows(&self.filter, feature, layer_id.as_deref())
                });

            if let Some((feature_index, feature)) = found {
                return Some(SelectedFeature {
                    layer_id,
                    layer_index,
                    feature_index,
                    feature: feature.clone(),
                });
            }
        }

        None
    }
}

/// The feature of a map layer the selection points at. The layer at the stored index must still
/// have the stored id, otherwise the layer is searched by id.
pub(super) fn feature_mut<'a>(
    map: &'a mut Map,
    selected: &SelectedFeature,
) -> Option<&'a mut Feature> {
    let layers = map.layers_mut();
    let index_matches = layers
        .get(selected.layer_index)
        .is_some_and(|layer| layer.id() == selected.layer_id.as_deref());

    let layer_index = if index_matches {
        selected.layer_index
    } else {
        layers.index_of_id(selected.layer_id.as_deref()?)?
    };

    layers
        .get_mut(layer_index)?
        .as_any_mut()
        .downcast_mut::<VectorLayer>()?
        .source_mut()
        .features_mut()
        .get_mut(selected.feature_index)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vmap_types::cartesian::Size;
    use vmap_types::geometry::Polygon;

    use super::*;
    use crate::layer::VectorSource;
    use crate::style::Style;
    use crate::view::{zoom_for_resolution, MapView};

    fn square(x: f64, y: f64, id: &str) -> Feature {
        Feature::new(Polygon::from(vec![
            Point2d::new(x, y),
            Point2d::new(x + 20.0, y),
            Point2d::new(x + 20.0, y + 20.0),
            Point2d::new(x, y + 20.0),
        ]))
        .with_id(id)
    }

    fn map() -> Map {
        let lower = VectorLayer::new(
            VectorSource::with_features(vec![square(0.0, 0.0, "low")]),
            Style::default(),
        )
        .with_id("lower");
        let upper = VectorLayer::new(
            VectorSource::with_features(vec![square(10.0, 10.0, "up")]),
            Style::default(),
        )
        .with_id("upper");

        // One pixel is one map unit, the map origin is at the pixel (50, 50).
        Map::new(
            MapView::new(Point2d::new(0.0, 0.0), zoom_for_resolution(1.0))
                .with_size(Size::new(100.0, 100.0)),
            vec![Box::new(lower), Box::new(upper)],
            None,
        )
    }

    fn pixel(x: f64, y: f64) -> Point2d {
        Point2d::new(50.0 + x, 50.0 - y)
    }

    #[test]
    fn top_most_feature_is_selected() {
        let mut map = map();
        let mut select = Select::new(Default::default());

        select.click(&mut map, pixel(15.0, 15.0));
        assert_eq!(select.selected().len(), 1);
        assert_eq!(select.selected()[0].layer_id.as_deref(), Some("upper"));
        assert_matches!(&map.take_events()[..], [MapEvent::FeatureSelect(f)] if f.len() == 1);

        select.click(&mut map, pixel(15.0, 15.0));
        assert!(map.take_events().is_empty());

        select.click(&mut map, pixel(5.0, 5.0));
        assert_eq!(select.selected()[0].feature.id(), Some("low"));

        select.click(&mut map, pixel(-40.0, -40.0));
        assert!(select.selected().is_empty());
        assert_eq!(map.take_events().len(), 2);
    }

    #[test]
    fn filter_and_hidden_layers() {
        let mut map = map();
        let filter: Arc<RwLock<Option<SelectFilter>>> = Default::default();
        *filter.write() = Some(Arc::new(|_: &Feature, layer: Option<&str>| {
            layer != Some("upper")
        }));
        let mut select = Select::new(filter);

        select.click(&mut map, pixel(15.0, 15.0));
        assert_eq!(select.selected()[0].layer_id.as_deref(), Some("lower"));

        map.layers_mut().hide(0);
        select.click(&mut map, pixel(15.0, 15.0));
        assert!(select.selected().is_empty());
    }

    #[test]
    fn selected_feature_is_found_after_reorder() {
        let mut map = map();
        let mut select = Select::new(Default::default());
        select.click(&mut map, pixel(15.0, 15.0));
        let selected = select.selected()[0].clone();

        map.layers_mut().swap(0, 1);
        let feature = feature_mut(&mut map, &selected).expect("feature is found");
        assert_eq!(feature.id(), Some("up"));
    }
}
