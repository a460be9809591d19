//! [`VMap`] ties a [`Map`] together with its input handling, navigation history, interactions,
//! controls, presets and the event bus.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use vmap_types::cartesian::{Point2d, Rect, Size};
use vmap_types::geo::{Crs, ProjectionRegistry};
use web_time::SystemTime;

use crate::background::{BackgroundLayer, Backgrounds, BACKGROUND_LAYER_ID};
use crate::config::MapConfig;
use crate::control::{EventProcessor, MapController, NotificationHandler, RawUserEvent};
use crate::error::VmapError;
use crate::events::{EventBus, EventKind, MapEvent};
use crate::interaction::{InteractionHandler, InteractionKind, Interactions};
use crate::layer::{Feature, Layer, VectorLayer, VectorSource};
use crate::map::{LayerCollection, Map};
use crate::messenger::Messenger;
use crate::style::{FeatureStyle, StylePresets};
use crate::view::MapView;
use crate::view_history::{ViewHistory, ViewState};
use crate::widgets::Controls;

/// Id of the layer that collects the points added with [`Layers::load_point`].
pub const TEMP_LAYER_ID: &str = "tempLayer";

/// Url of a vector layer source that must be loaded for the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Id of the layer the data is for.
    pub layer_id: Option<String>,
    /// Url to load GeoJSON from.
    pub url: String,
}

/// A map instance.
///
/// The host application feeds user input with [`VMap::handle_event`] and draws the layers and
/// the view of [`VMap::map`]. Everything else is done through the subobjects:
/// [`VMap::views`], [`VMap::layers`], [`VMap::interactions_mut`] and [`VMap::events_mut`].
///
/// ```
/// use vmap::config::MapConfig;
/// use vmap::background::Backgrounds;
/// use vmap::style::StylePresets;
/// use vmap::VMap;
///
/// let config = MapConfig::from_json(r#"{"center": [8.4, 49.0], "zoom": 12}"#).unwrap();
/// let mut vmap = VMap::new(config, Backgrounds::default(), StylePresets::default()).unwrap();
///
/// vmap.views().set_zoom(13.0);
/// vmap.views().rewind_view();
/// assert_eq!(vmap.views().get_zoom(), 12.0);
/// ```
pub struct VMap {
    map: Map,
    event_processor: EventProcessor,
    bus: EventBus,
    history: Arc<RwLock<ViewHistory>>,
    interactions: Arc<RwLock<Interactions>>,
    controls: Controls,
    styles: StylePresets,
    backgrounds: Backgrounds,
    config: MapConfig,
}

impl Debug for VMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VMap")
            .field("view", self.map.view())
            .field("layers", &self.map.layers().ids())
            .field("history", &*self.history.read())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VMap {
    /// Creates a map instance.
    ///
    /// The center of the configuration is transformed from [`MapConfig::projection`] into
    /// `EPSG:3857`, the active background of `backgrounds` is set as the bottom layer, and the
    /// initial view is recorded in the navigation history. Every following move-end event
    /// records the view too.
    pub fn new(
        config: MapConfig,
        backgrounds: Backgrounds,
        styles: StylePresets,
    ) -> Result<Self, VmapError> {
        config.validate()?;

        let [x, y] = config.center;
        let center = ProjectionRegistry::global().read().transform(
            &Point2d::new(x, y),
            &config.projection,
            &Crs::EPSG3857,
        )?;

        let mut map = Map::new(MapView::new(center, config.zoom), vec![], None);
        map.set_zoom_limits(config.min_zoom, config.max_zoom);
        if let Some([x_min, y_min, x_max, y_max]) = config.extent {
            let extent = ProjectionRegistry::global().read().transform_extent(
                &Rect::new(x_min, y_min, x_max, y_max),
                &config.projection,
                &Crs::EPSG3857,
            )?;
            map.set_extent(Some(extent));
        }
        map.set_view(map.constrain(*map.view()));
        map.layers_mut().insert(0, backgrounds.active.to_layer());

        let mut bus = EventBus::new();
        let history = Arc::new(RwLock::new(ViewHistory::new()));
        let interactions = Arc::new(RwLock::new(Interactions::new(
            bus.select_filter_handle(),
            styles.draw_style.clone(),
        )));

        let mut event_processor = EventProcessor::default();
        event_processor.add_handler(NotificationHandler);
        event_processor.add_handler(InteractionHandler(interactions.clone()));
        event_processor.add_handler(MapController::new(config.controller_configuration()));

        let captured = history.clone();
        bus.on(EventKind::MapMoveEnd, move |event| {
            if let MapEvent::MapMoveEnd(state) = event {
                captured.write().capture(*state);
            }
        });

        let controls = Controls::from_config(&config);

        // Events queued while the map was set up are not delivered.
        map.take_events();

        let mut vmap = Self {
            map,
            event_processor,
            bus,
            history,
            interactions,
            controls,
            styles,
            backgrounds,
            config,
        };
        vmap.views().initial_view();

        log::info!(
            "Map initialized at {:?}, zoom {}",
            vmap.map.view().center(),
            vmap.map.view().zoom()
        );
        Ok(vmap)
    }

    /// The underlying map with its layers and view.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Configuration the map was created with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Sets the size of the map area in pixels.
    pub fn update_size(&mut self, size: Size) {
        log::debug!("Map size: {size:?}");
        self.map.set_size(size);
    }

    /// Sets the messenger that is asked to redraw the map when anything on it changes.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.map.set_messenger(messenger);
    }

    /// Handles user input and fires the events it produced.
    pub fn handle_event(&mut self, event: RawUserEvent) {
        self.handle_event_at(event, SystemTime::now());
    }

    /// Handles user input as if it happened at the given time, see [`VMap::handle_event`].
    pub fn handle_event_at(&mut self, event: RawUserEvent, now: SystemTime) {
        self.event_processor.handle_at(event, &mut self.map, now);
        self.dispatch_events();
    }

    /// Navigation of the map view.
    pub fn views(&mut self) -> Views<'_> {
        Views { vmap: self }
    }

    /// Layers of the map.
    pub fn layers(&mut self) -> Layers<'_> {
        Layers { vmap: self }
    }

    /// Controls of the map.
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Style presets.
    pub fn styles(&self) -> &StylePresets {
        &self.styles
    }

    /// Background presets and the active background.
    pub fn backgrounds(&self) -> &Backgrounds {
        &self.backgrounds
    }

    /// Event bus of the map.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Event bus of the map, to register listeners and the select filter.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// State of the interactions.
    pub fn interactions(&self) -> RwLockReadGuard<'_, Interactions> {
        self.interactions.read()
    }

    /// Mutable state of the interactions.
    pub fn interactions_mut(&self) -> RwLockWriteGuard<'_, Interactions> {
        self.interactions.write()
    }

    /// Activates an interaction, see [`Interactions::set_active`].
    pub fn set_active_interaction(&mut self, kind: Option<InteractionKind>, snapped: bool) {
        self.interactions.write().set_active(kind, snapped);
        self.map.redraw();
    }

    /// Deselects all features. Fires a feature select event if anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let cleared = self.interactions.write().clear_selection(&mut self.map);
        self.dispatch_events();
        cleared
    }

    /// Urls of the vector layers that must be loaded to show the current view. A url is
    /// returned once per loaded area.
    pub fn load_requests(&mut self) -> Vec<LoadRequest> {
        let extent = self.map.view().get_bbox();
        let resolution = self.map.view().resolution();

        let mut requests = vec![];
        for layer in self.map.layers_mut().iter_mut() {
            let layer_id = layer.id().map(str::to_string);
            let Some(vector) = layer.as_any_mut().downcast_mut::<VectorLayer>() else {
                continue;
            };

            match vector.source_mut().request_url(&extent, resolution) {
                Some(Ok(url)) => requests.push(LoadRequest { layer_id, url }),
                Some(Err(err)) => log::warn!("Cannot build url for layer {layer_id:?}: {err}"),
                None => {}
            }
        }

        requests
    }

    fn dispatch_events(&mut self) {
        for event in self.map.take_events() {
            self.bus.fire(&event);
        }
    }

    fn apply_view(&mut self, view: MapView) {
        self.map.set_view(view);
        self.dispatch_events();
    }
}

/// Navigation of the map view, returned by [`VMap::views`].
pub struct Views<'a> {
    vmap: &'a mut VMap,
}

impl Views<'_> {
    /// Records the current view in the navigation history.
    pub fn save_rewind_position(&mut self) {
        let state = ViewState::from(self.vmap.map.view());
        self.vmap.history.write().capture(state);
    }

    /// Goes one step back in the navigation history. Returns the applied state, or `None` if
    /// there is nothing to go back to.
    pub fn rewind_view(&mut self) -> Option<ViewState> {
        let state = self.vmap.history.write().rewind()?;
        self.apply_state(state);
        Some(state)
    }

    /// Goes one step forward in the navigation history. Returns the applied state, or `None` if
    /// the current state is the last one.
    pub fn forward_view(&mut self) -> Option<ViewState> {
        let state = self.vmap.history.write().advance()?;
        self.apply_state(state);
        Some(state)
    }

    /// Records the initial view.
    pub fn initial_view(&mut self) {
        self.save_rewind_position();
    }

    /// Navigation history of the map.
    pub fn history(&self) -> ViewHistory {
        self.vmap.history.read().clone()
    }

    /// Visible extent in the given projection, `EPSG:3857` by default.
    pub fn get_extent(&self, projection: Option<&str>) -> Result<Rect, VmapError> {
        let target = projection.map_or(Crs::EPSG3857, Crs::new);
        let extent = ProjectionRegistry::global().read().transform_extent(
            &self.vmap.map.view().get_bbox(),
            &Crs::EPSG3857,
            &target,
        )?;

        Ok(extent)
    }

    /// Moves the map center to the point in `EPSG:3857`, kept inside the map extent.
    pub fn set_center(&mut self, center: Point2d) {
        let center = self.vmap.map.constrain_center(center);
        let view = self.vmap.map.view().with_center(center);
        self.vmap.apply_view(view);
    }

    /// Sets the zoom level, clamped into the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        let zoom = self.vmap.map.constrain_zoom(zoom);
        let view = self.vmap.map.view().with_zoom(zoom);
        self.vmap.apply_view(view);
    }

    /// Center of the map in `EPSG:3857`.
    pub fn get_center(&self) -> Point2d {
        self.vmap.map.view().center()
    }

    /// Current zoom level.
    pub fn get_zoom(&self) -> f64 {
        self.vmap.map.view().zoom()
    }

    /// Current view of the map.
    pub fn get_view(&self) -> MapView {
        *self.vmap.map.view()
    }

    /// Fits the view to the extent of the features. Does nothing if there are no features.
    pub fn zoom_to_features(&mut self, features: &[Feature]) {
        let extent = features
            .iter()
            .filter_map(|feature| feature.geometry().bounding_rect())
            .reduce(|a, b| a.merge(b));

        match extent {
            Some(extent) => self.zoom_to_extent(&extent),
            None => log::warn!("No features to zoom to"),
        }
    }

    /// Fits the view to the extent in `EPSG:3857`.
    pub fn zoom_to_extent(&mut self, extent: &Rect) {
        let view = self.vmap.map.constrain(self.vmap.map.view().fit(extent));
        self.vmap.apply_view(view);
    }

    fn apply_state(&mut self, state: ViewState) {
        let view = state.apply_to(self.vmap.map.view());
        self.vmap.apply_view(view);
    }
}

/// Layers of the map, returned by [`VMap::layers`]. Layers are addressed by their ids.
pub struct Layers<'a> {
    vmap: &'a mut VMap,
}

impl Layers<'_> {
    /// Swaps the layer with the one above it.
    pub fn raise_layer(&mut self, id: &str) -> Result<(), VmapError> {
        let index = self.index_of(id)?;
        let layers = self.vmap.map.layers_mut();
        if index + 1 < layers.len() {
            layers.swap(index, index + 1);
            log::debug!("Raised layer {id} to {}", index + 1);
            self.vmap.map.redraw();
        }

        Ok(())
    }

    /// Swaps the layer with the one below it.
    pub fn lower_layer(&mut self, id: &str) -> Result<(), VmapError> {
        let index = self.index_of(id)?;
        if index > 0 {
            self.vmap.map.layers_mut().swap(index - 1, index);
            log::debug!("Lowered layer {id} to {}", index - 1);
            self.vmap.map.redraw();
        }

        Ok(())
    }

    /// Moves the layer above all the others.
    pub fn move_layer_to_top(&mut self, id: &str) -> Result<(), VmapError> {
        let index = self.index_of(id)?;
        let layers = self.vmap.map.layers_mut();
        let top = layers.len() - 1;
        if index != top {
            layers.move_layer(index, top);
            log::debug!("Moved layer {id} to the top");
            self.vmap.map.redraw();
        }

        Ok(())
    }

    /// Moves the layer below all the others. With `above_background` the layer goes right
    /// above the bottom one.
    pub fn move_layer_to_bottom(&mut self, id: &str, above_background: bool) -> Result<(), VmapError> {
        let index = self.index_of(id)?;
        let layers = self.vmap.map.layers_mut();
        let layer = layers.remove(index);
        let position = if above_background { 1.min(layers.len()) } else { 0 };
        layers.insert(position, layer);

        log::debug!("Moved layer {id} to {position}");
        self.vmap.map.redraw();
        Ok(())
    }

    /// Layer with the given id.
    pub fn get_layer_by_id(&self, id: &str) -> Option<&dyn Layer> {
        self.vmap.map.layers().get_by_id(id)
    }

    /// Mutable layer with the given id.
    pub fn get_layer_by_id_mut(&mut self, id: &str) -> Option<&mut Box<dyn Layer>> {
        self.vmap.map.layers_mut().get_by_id_mut(id)
    }

    /// All the layers, from bottom to top.
    pub fn get_all_layers(&self) -> &LayerCollection {
        self.vmap.map.layers()
    }

    /// Adds the layer on top of the others.
    pub fn add_layer(&mut self, layer: impl Into<Box<dyn Layer>>) {
        let layer = layer.into();
        log::debug!("Added layer {:?}", layer.id());

        self.vmap.map.layers_mut().push(layer);
        self.vmap.map.redraw();
    }

    /// Removes the layer from the map and returns it.
    pub fn remove_layer(&mut self, id: &str) -> Result<Box<dyn Layer>, VmapError> {
        let index = self.index_of(id)?;
        let layer = self.vmap.map.layers_mut().remove(index);

        log::debug!("Removed layer {id}");
        self.vmap.map.redraw();
        Ok(layer)
    }

    /// Adds a point given in `EPSG:4326` to the [`TEMP_LAYER_ID`] layer. The layer is created
    /// with the default style if the map does not have it.
    pub fn load_point(&mut self, lon: f64, lat: f64) -> Result<(), VmapError> {
        let point = ProjectionRegistry::global().read().transform(
            &Point2d::new(lon, lat),
            &Crs::EPSG4326,
            &Crs::EPSG3857,
        )?;

        if self.get_layer_by_id(TEMP_LAYER_ID).is_none() {
            let layer = VectorLayer::new(VectorSource::new(), self.vmap.styles.default_style.clone())
                .with_id(TEMP_LAYER_ID);
            self.add_layer(layer);
        }

        self.vector_layer_mut(TEMP_LAYER_ID)?
            .source_mut()
            .add_feature(Feature::new(point));
        self.vmap.map.redraw();
        Ok(())
    }

    /// Adds a layer on top of the map that loads all its features from the url.
    pub fn load_layer(&mut self, url: &str, id: &str, style: impl Into<FeatureStyle>) {
        let layer = VectorLayer::new(VectorSource::from_url(url), style).with_id(id);
        self.add_layer(layer);
    }

    /// Adds a layer on top of the map that loads features for the visible extent. The extent
    /// corners in `projection` are appended to the url as the `coordLeft`, `coordBottom`,
    /// `coordRight` and `coordTop` query parameters.
    pub fn load_layer_by_extent(
        &mut self,
        url: &str,
        id: &str,
        style: impl Into<FeatureStyle>,
        projection: Crs,
    ) {
        let base_url = url.to_string();
        let source = VectorSource::from_url_function(move |extent, _resolution| {
            extent_url(&base_url, extent, &projection)
        });
        let layer = VectorLayer::new(source, style).with_id(id);
        self.add_layer(layer);
    }

    /// Parses a GeoJSON document in `data_crs` and adds its features to the vector layer.
    /// Returns the number of added features.
    pub fn add_geojson(&mut self, id: &str, text: &str, data_crs: &Crs) -> Result<usize, VmapError> {
        let count = self.vector_layer_mut(id)?.source_mut().add_geojson(text, data_crs)?;
        self.vmap.map.redraw();
        Ok(count)
    }

    /// Replaces the map background with the given one, at the bottom of the layers.
    pub fn set_map_background(&mut self, background: &BackgroundLayer) {
        let layers = self.vmap.map.layers_mut();
        if let Some(index) = layers.index_of_id(BACKGROUND_LAYER_ID) {
            layers.remove(index);
        }
        layers.insert(0, background.to_layer());

        self.vmap.backgrounds.active = background.clone();
        log::debug!("Map background changed");
        self.vmap.map.redraw();
    }

    fn index_of(&self, id: &str) -> Result<usize, VmapError> {
        self.vmap
            .map
            .layers()
            .index_of_id(id)
            .ok_or_else(|| VmapError::LayerNotFound(id.to_string()))
    }

    fn vector_layer_mut(&mut self, id: &str) -> Result<&mut VectorLayer, VmapError> {
        self.vmap
            .map
            .layers_mut()
            .get_by_id_mut(id)
            .and_then(|layer| layer.as_any_mut().downcast_mut::<VectorLayer>())
            .ok_or_else(|| VmapError::LayerNotFound(id.to_string()))
    }
}

fn extent_url(url: &str, extent: &Rect, projection: &Crs) -> Result<String, VmapError> {
    let registry = ProjectionRegistry::global().read();
    let geo = registry.transform_extent(extent, &Crs::EPSG3857, &Crs::EPSG4326)?;
    let left_bottom = registry.transform(
        &Point2d::new(geo.x_min(), geo.y_min()),
        &Crs::EPSG4326,
        projection,
    )?;
    let right_top = registry.transform(
        &Point2d::new(geo.x_max(), geo.y_max()),
        &Crs::EPSG4326,
        projection,
    )?;

    Ok(format!(
        "{url}&coordLeft={}&coordBottom={}&coordRight={}&coordTop={}",
        left_bottom.x, left_bottom.y, right_top.x, right_top.y
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;
    use vmap_types::geo::projection::ptv_mercator;

    use super::*;
    use crate::control::MouseButton;
    use crate::layer::{TileLayer, TileSource};
    use crate::style::Style;

    fn vmap() -> VMap {
        let mut vmap = VMap::new(
            MapConfig::default(),
            Backgrounds::default(),
            StylePresets::default(),
        )
        .expect("valid config");
        vmap.update_size(Size::new(800.0, 600.0));
        vmap
    }

    fn ids(vmap: &mut VMap) -> Vec<Option<String>> {
        vmap.layers()
            .get_all_layers()
            .iter()
            .map(|layer| layer.id().map(str::to_string))
            .collect()
    }

    fn add_layers(vmap: &mut VMap, names: &[&str]) {
        for name in names {
            let layer = VectorLayer::new(VectorSource::new(), Style::default()).with_id(*name);
            vmap.layers().add_layer(layer);
        }
    }

    #[test]
    fn initialization() {
        let config = MapConfig::from_json(
            r#"{"center": [8.4, 49.0], "zoom": 30, "maxZoom": 18, "scaleLine": true}"#,
        )
        .expect("valid config");
        let mut vmap = VMap::new(config, Backgrounds::default(), StylePresets::default())
            .expect("map");

        let center = vmap.views().get_center();
        assert_relative_eq!(center.x, 935_083.72, max_relative = 1e-7);
        assert_relative_eq!(center.y, 6_274_861.39, max_relative = 1e-7);
        assert_eq!(vmap.views().get_zoom(), 18.0);

        assert_eq!(ids(&mut vmap), [Some(BACKGROUND_LAYER_ID.to_string())]);
        assert!(vmap.controls().scale_line().is_some());
        assert_eq!(vmap.views().history().len(), 1);
        assert_eq!(vmap.events().listener_count(EventKind::MapMoveEnd), 1);
    }

    #[test]
    fn center_is_kept_in_configured_extent() {
        let config = MapConfig::from_json(r#"{"center": [20, 20], "extent": [0, 0, 10, 10]}"#)
            .expect("valid config");
        let mut vmap = VMap::new(config, Backgrounds::default(), StylePresets::default())
            .expect("map");

        let center = vmap.views().get_center();
        assert_relative_eq!(center.x, 1_113_194.91, max_relative = 1e-7);
        assert_relative_eq!(center.y, 1_118_889.97, max_relative = 1e-7);

        vmap.views().set_center(Point2d::new(-5e6, 5e5));
        let center = vmap.views().get_center();
        assert_abs_diff_eq!(center.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(center.y, 5e5);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MapConfig {
            projection: Crs::new("EPSG:0"),
            ..Default::default()
        };
        assert_matches!(
            VMap::new(config, Backgrounds::default(), StylePresets::default()),
            Err(VmapError::Types(_))
        );

        let config = MapConfig {
            min_zoom: 5.0,
            max_zoom: 1.0,
            ..Default::default()
        };
        assert_matches!(
            VMap::new(config, Backgrounds::default(), StylePresets::default()),
            Err(VmapError::Config(_))
        );

        let vmap = vmap();
        let text = format!("{vmap:?}");
        assert!(text.starts_with("VMap"));
        assert!(text.contains("background"));
    }

    #[test]
    fn navigation_history() {
        let mut vmap = vmap();
        let a = ViewState::from(&vmap.views().get_view());

        vmap.views().set_center(Point2d::new(1000.0, 2000.0));
        let b = ViewState::from(&vmap.views().get_view());
        vmap.views().set_zoom(5.0);
        let c = ViewState::from(&vmap.views().get_view());

        assert_eq!(vmap.views().history().states(), [a, b, c]);

        assert_eq!(vmap.views().rewind_view(), Some(b));
        assert_eq!(vmap.views().get_center(), Point2d::new(1000.0, 2000.0));
        assert_eq!(vmap.views().get_zoom(), 2.0);
        assert_eq!(vmap.views().history().cursor(), Some(1));

        assert_eq!(vmap.views().forward_view(), Some(c));
        assert_eq!(vmap.views().get_zoom(), 5.0);
        assert_eq!(vmap.views().forward_view(), None);

        vmap.views().rewind_view();
        vmap.views().rewind_view();
        assert_eq!(vmap.views().rewind_view(), None);
        assert_eq!(ViewState::from(&vmap.views().get_view()), a);

        // Navigating from the first state drops the states after it.
        vmap.views().set_zoom(7.0);
        let history = vmap.views().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.states()[1].zoom, 7.0);
    }

    #[test]
    fn save_rewind_position_skips_known_views() {
        let mut vmap = vmap();
        vmap.views().save_rewind_position();
        vmap.views().initial_view();
        assert_eq!(vmap.views().history().len(), 1);
    }

    #[test]
    fn drag_pan_is_recorded_once() {
        let mut vmap = vmap();
        let initial = vmap.views().get_center();
        let moves = Arc::new(AtomicUsize::new(0));
        let counter = moves.clone();
        vmap.events_mut().on(EventKind::MapMoveEnd, move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        vmap.handle_event_at(RawUserEvent::PointerMoved(Point2d::new(400.0, 300.0)), start);
        vmap.handle_event_at(RawUserEvent::ButtonPressed(MouseButton::Left), start);
        for step in 1..=10 {
            let position = Point2d::new(400.0 + step as f64 * 10.0, 300.0);
            vmap.handle_event_at(RawUserEvent::PointerMoved(position), start);
        }
        vmap.handle_event_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            start + Duration::from_secs(1),
        );

        assert_eq!(moves.load(Ordering::Relaxed), 1);
        assert_eq!(vmap.views().history().len(), 2);

        // The map moved to the right, so the center moved to the west.
        let resolution = vmap.views().get_view().resolution();
        assert_abs_diff_eq!(
            vmap.views().get_center(),
            Point2d::new(initial.x - 100.0 * resolution, initial.y),
            epsilon = 1e-6
        );

        assert!(vmap.views().rewind_view().is_some());
        assert_eq!(vmap.views().get_center(), initial);
    }

    #[test]
    fn extent_in_other_projections() {
        let mut vmap = vmap();
        vmap.views().set_zoom(12.0);

        let web = vmap.views().get_extent(None).expect("extent");
        assert_abs_diff_eq!(web.width(), 800.0 * vmap.views().get_view().resolution(), epsilon = 1e-6);

        let geo = vmap.views().get_extent(Some("EPSG:4326")).expect("extent");
        assert!(geo.x_min() < 0.0 && geo.x_max() > 0.0);
        assert!(geo.width() < 1.0);

        assert_matches!(
            vmap.views().get_extent(Some("EPSG:1")),
            Err(VmapError::Types(_))
        );
    }

    #[test]
    fn zoom_to_features_and_extent() {
        let mut vmap = vmap();
        let features = [
            Feature::new(Point2d::new(-4000.0, -1000.0)),
            Feature::new(Point2d::new(4000.0, 1000.0)),
        ];
        vmap.views().zoom_to_features(&features);

        let view = vmap.views().get_view();
        assert_eq!(view.center(), Point2d::new(0.0, 0.0));
        assert_relative_eq!(view.resolution(), 10.0, max_relative = 1e-9);

        vmap.views().zoom_to_features(&[]);
        assert_eq!(vmap.views().get_view(), view);

        vmap.views()
            .zoom_to_extent(&Rect::new(1000.0, 1000.0, 1800.0, 1600.0));
        assert_eq!(vmap.views().get_center(), Point2d::new(1400.0, 1300.0));
        assert_relative_eq!(
            vmap.views().get_view().resolution(),
            1.0,
            max_relative = 1e-9
        );
        assert_eq!(vmap.views().history().len(), 3);
    }

    #[test]
    fn layer_order() {
        let mut vmap = vmap();
        add_layers(&mut vmap, &["a", "b", "c"]);
        let names = |vmap: &mut VMap| {
            ids(vmap)
                .into_iter()
                .map(|id| id.unwrap_or_default())
                .collect::<Vec<_>>()
        };

        vmap.layers().raise_layer("a").expect("layer");
        assert_eq!(names(&mut vmap), ["background", "b", "a", "c"]);
        vmap.layers().raise_layer("c").expect("layer");
        assert_eq!(names(&mut vmap), ["background", "b", "a", "c"]);

        vmap.layers().lower_layer("a").expect("layer");
        assert_eq!(names(&mut vmap), ["background", "a", "b", "c"]);

        vmap.layers().move_layer_to_top("a").expect("layer");
        assert_eq!(names(&mut vmap), ["background", "b", "c", "a"]);

        vmap.layers().move_layer_to_bottom("c", true).expect("layer");
        assert_eq!(names(&mut vmap), ["background", "c", "b", "a"]);
        vmap.layers().move_layer_to_bottom("a", false).expect("layer");
        assert_eq!(names(&mut vmap), ["a", "background", "c", "b"]);

        assert_matches!(
            vmap.layers().raise_layer("missing"),
            Err(VmapError::LayerNotFound(id)) if id == "missing"
        );

        let removed = vmap.layers().remove_layer("c").expect("layer");
        assert_eq!(removed.id(), Some("c"));
        assert!(vmap.layers().get_layer_by_id("c").is_none());
        assert_eq!(vmap.layers().get_all_layers().len(), 3);
    }

    #[test]
    fn points_go_to_temp_layer() {
        let mut vmap = vmap();
        vmap.layers().load_point(1.0, 0.0).expect("point");
        vmap.layers().load_point(2.0, 0.0).expect("point");

        let layers = vmap.layers();
        assert_eq!(layers.get_all_layers().len(), 2);
        let temp = layers
            .get_layer_by_id(TEMP_LAYER_ID)
            .and_then(|layer| layer.as_any().downcast_ref::<VectorLayer>())
            .expect("temp layer");
        let features = temp.source().features();
        assert_eq!(features.len(), 2);
        assert_matches!(
            features[0].geometry().vertices().next(),
            Some(point) if (point.x - 111_319.49).abs() < 0.01 && point.y.abs() < 1e-6
        );
    }

    #[test]
    fn loading_by_extent() {
        let mut vmap = vmap();
        vmap.views().set_zoom(12.0);
        vmap.layers().load_layer(
            "http://data/all.json",
            "all",
            StylePresets::default().default_style,
        );
        vmap.layers().load_layer_by_extent(
            "http://data/query?layer=roads",
            "roads",
            StylePresets::default().default_style,
            Crs::EPSG505456,
        );

        let requests = vmap.load_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            LoadRequest {
                layer_id: Some("all".into()),
                url: "http://data/all.json".into()
            }
        );

        let extent = vmap.views().get_extent(Some("EPSG:4326")).expect("extent");
        let (left, bottom) = ptv_mercator::forward(extent.x_min(), extent.y_min());
        let url = &requests[1].url;
        assert!(url.starts_with("http://data/query?layer=roads&coordLeft="));
        let values: Vec<f64> = url
            .split('&')
            .skip(1)
            .map(|pair| {
                pair.split_once('=')
                    .and_then(|(_, value)| value.parse().ok())
                    .expect("number")
            })
            .collect();
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[0], left, max_relative = 1e-9);
        assert_relative_eq!(values[1], bottom, max_relative = 1e-9);

        // The same area is not requested again.
        assert!(vmap.load_requests().is_empty());

        let count = vmap
            .layers()
            .add_geojson(
                "roads",
                r#"{"type": "FeatureCollection", "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [8.4, 49.0]}, "properties": {}}
                ]}"#,
                &Crs::EPSG4326,
            )
            .expect("geojson");
        assert_eq!(count, 1);
    }

    #[test]
    fn background_is_replaced() {
        let mut vmap = vmap();
        add_layers(&mut vmap, &["data"]);

        let backgrounds = Backgrounds::default();
        let mapquest = backgrounds.mapquest.default.clone().expect("mapquest");
        vmap.layers().set_map_background(&mapquest);

        assert_eq!(
            ids(&mut vmap),
            [Some(BACKGROUND_LAYER_ID.to_string()), Some("data".to_string())]
        );
        assert_eq!(vmap.backgrounds().active, mapquest);

        let wms = BackgroundLayer::from(TileLayer::new(TileSource::wms(
            "http://wms",
            [("LAYERS", "base")],
        )));
        vmap.layers().set_map_background(&wms);
        assert_eq!(vmap.layers().get_all_layers().len(), 2);
        assert_matches!(
            vmap.layers()
                .get_layer_by_id(BACKGROUND_LAYER_ID)
                .and_then(|layer| layer.as_any().downcast_ref::<TileLayer>()),
            Some(layer) if matches!(layer.source(), TileSource::Wms { .. })
        );
    }

    #[test]
    fn clicks_are_fired_to_listeners() {
        let mut vmap = vmap();
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        vmap.events_mut().on(EventKind::MapClick, move |event| {
            assert_matches!(event, MapEvent::MapClick(info) if info.pixel == Point2d::new(10.0, 10.0));
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        vmap.handle_event_at(RawUserEvent::PointerMoved(Point2d::new(10.0, 10.0)), now);
        vmap.handle_event_at(RawUserEvent::ButtonPressed(MouseButton::Left), now);
        vmap.handle_event_at(RawUserEvent::ButtonReleased(MouseButton::Left), now);

        assert_eq!(clicks.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn drawing_through_the_map() {
        let mut vmap = vmap();
        vmap.set_active_interaction(Some(InteractionKind::Point), false);

        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        vmap.handle_event_at(RawUserEvent::PointerMoved(Point2d::new(400.0, 300.0)), now);
        vmap.handle_event_at(RawUserEvent::ButtonPressed(MouseButton::Left), now);
        vmap.handle_event_at(RawUserEvent::ButtonReleased(MouseButton::Left), now);

        let interactions = vmap.interactions();
        assert_eq!(interactions.overlay_features().len(), 1);
        assert_matches!(
            interactions.overlay_features()[0].geometry().vertices().next(),
            Some(point) if point.x.abs() < 1e-6 && point.y.abs() < 1e-6
        );
    }
}
