//! [`Map`] holds the layers and the view of a map, and queues the events the map emits.

use vmap_types::cartesian::{Point2d, Rect, Size};

use crate::events::MapEvent;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::view::MapView;
use crate::view_history::ViewState;

mod layer_collection;

pub use layer_collection::LayerCollection;

/// Default zoom range of a map.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;
/// Default zoom range of a map.
pub const DEFAULT_MAX_ZOOM: f64 = 28.0;

/// Map specifies a set of layers, and the view that should be shown.
///
/// Every change of the view through [`Map::set_view`] queues a [`MapEvent::MapMoveEnd`]. While an
/// interaction is in progress (see [`Map::begin_interaction`]), the view changes are collected
/// into a single move-end event that is queued when the interaction ends.
pub struct Map {
    view: MapView,
    layers: LayerCollection,
    messenger: Option<Box<dyn Messenger>>,
    min_zoom: f64,
    max_zoom: f64,
    extent: Option<Rect>,
    interaction_start: Option<MapView>,
    events: Vec<MapEvent>,
}

impl Map {
    /// Creates a new map.
    pub fn new(
        view: MapView,
        layers: Vec<Box<dyn Layer>>,
        messenger: Option<Box<dyn Messenger + 'static>>,
    ) -> Self {
        Self {
            view,
            layers: layers.into(),
            messenger,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            extent: None,
            interaction_start: None,
            events: vec![],
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Returns the list of map's layers.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Returns a mutable reference to the list of map's layers.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Changes the view of the map to the given one.
    ///
    /// The view is used as is, call [`Map::constrain`] first to apply zoom and extent limits.
    pub fn set_view(&mut self, view: MapView) {
        let changed = !same_position(&self.view, &view);
        self.view = view;

        if changed && self.interaction_start.is_none() {
            self.notify(MapEvent::MapMoveEnd(ViewState::from(&self.view)));
        }

        self.redraw();
    }

    /// Request redraw of the map.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Set the size of the map.
    pub fn set_size(&mut self, new_size: Size) {
        self.view = self.view.with_size(new_size);
        self.redraw();
    }

    /// Sets the new event messenger for the map.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.messenger = messenger.map(|m| Box::new(m) as Box<dyn Messenger>);
    }

    /// Minimum allowed zoom level.
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Maximum allowed zoom level.
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// Sets the allowed zoom range. The limits are swapped if `min_zoom > max_zoom`, and
    /// non-finite limits are ignored.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        if !min_zoom.is_finite() || !max_zoom.is_finite() {
            log::warn!("Ignoring invalid zoom limits [{min_zoom}, {max_zoom}]");
            return;
        }

        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
    }

    /// Area the center of the map must stay in.
    pub fn extent(&self) -> Option<Rect> {
        self.extent
    }

    /// Sets the area the center of the map must stay in. Inverted bounds are reordered, an
    /// extent with non-finite bounds is ignored.
    pub fn set_extent(&mut self, extent: Option<Rect>) {
        let Some(extent) = extent else {
            self.extent = None;
            return;
        };

        if extent.to_array().iter().any(|v| !v.is_finite()) {
            log::warn!("Ignoring map extent with non-finite bounds {extent:?}");
            return;
        }

        self.extent = Some(Rect::new(
            extent.x_min.min(extent.x_max),
            extent.y_min.min(extent.y_max),
            extent.x_min.max(extent.x_max),
            extent.y_min.max(extent.y_max),
        ));
    }

    /// Clamps the zoom level into the allowed range.
    pub fn constrain_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Moves the point into the map extent, if the extent is set.
    pub fn constrain_center(&self, center: Point2d) -> Point2d {
        match self.extent {
            Some(extent) => Point2d::new(
                center.x.clamp(extent.x_min(), extent.x_max()),
                center.y.clamp(extent.y_min(), extent.y_max()),
            ),
            None => center,
        }
    }

    /// Applies the zoom and center limits of the map to the view.
    pub fn constrain(&self, view: MapView) -> MapView {
        view.with_zoom(self.constrain_zoom(view.zoom()))
            .with_center(self.constrain_center(view.center()))
    }

    /// Starts a continuous interaction (like a drag pan). No move-end events are queued until
    /// [`Map::end_interaction`] is called.
    pub fn begin_interaction(&mut self) {
        if self.interaction_start.is_none() {
            self.interaction_start = Some(self.view);
        }
    }

    /// Finishes the interaction and queues a single move-end event if the view has changed
    /// since [`Map::begin_interaction`].
    pub fn end_interaction(&mut self) {
        let Some(start) = self.interaction_start.take() else {
            return;
        };

        if !same_position(&start, &self.view) {
            self.notify(MapEvent::MapMoveEnd(ViewState::from(&self.view)));
        }
    }

    /// Returns true while an interaction is in progress.
    pub fn is_interacting(&self) -> bool {
        self.interaction_start.is_some()
    }

    /// Queues an event to be dispatched to the listeners of the map.
    pub fn notify(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    /// Takes all the queued events.
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }
}

fn same_position(a: &MapView, b: &MapView) -> bool {
    a.center() == b.center() && a.zoom() == b.zoom() && a.rotation() == b.rotation()
}
