//! In-process event bus of a map instance.
//!
//! Listeners are registered for one [`EventKind`] and are called synchronously, in the order of
//! registration, every time an event of that kind is fired.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use vmap_types::cartesian::Point2d;

use crate::layer::Feature;
use crate::view_history::ViewState;

/// Kind of a map event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Selection of features changed.
    FeatureSelect,
    /// The map was clicked.
    MapClick,
    /// The map view settled after navigation.
    MapMoveEnd,
    /// The pointer moved over the map.
    MouseMove,
}

/// Position of the pointer at the moment of an event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerInfo {
    /// Position on the screen in pixels from the top-left corner.
    pub pixel: Point2d,
    /// Position on the map in `EPSG:3857`.
    pub coordinate: Point2d,
    /// True if a mouse button is held down while moving.
    pub dragging: bool,
}

/// A selected feature and the layer it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFeature {
    /// Id of the layer.
    pub layer_id: Option<String>,
    /// Index of the layer in the layer collection at the moment of selection.
    pub layer_index: usize,
    /// Index of the feature in the layer source.
    pub feature_index: usize,
    /// Copy of the feature at the moment of selection.
    pub feature: Feature,
}

/// Event fired by a map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Selection changed, contains all the currently selected features.
    FeatureSelect(Vec<SelectedFeature>),
    /// The map was clicked.
    MapClick(PointerInfo),
    /// The map view settled after navigation.
    MapMoveEnd(ViewState),
    /// The pointer moved over the map.
    MouseMove(PointerInfo),
}

impl MapEvent {
    /// Kind of the event.
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::FeatureSelect(_) => EventKind::FeatureSelect,
            MapEvent::MapClick(_) => EventKind::MapClick,
            MapEvent::MapMoveEnd(_) => EventKind::MapMoveEnd,
            MapEvent::MouseMove(_) => EventKind::MouseMove,
        }
    }
}

/// Handle of a registered listener, used to remove it with [`EventBus::un`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Decides whether a feature of the given layer can be selected.
pub type SelectFilter = Arc<dyn Fn(&Feature, Option<&str>) -> bool + Send + Sync>;

type Listener = Arc<dyn Fn(&MapEvent) + Send + Sync>;

/// Registry of event listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
    select_filter: Arc<RwLock<Option<SelectFilter>>>,
}

impl EventBus {
    /// Creates a bus without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the listener for the events of the given kind.
    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&MapEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));

        log::debug!("Registered listener {id:?} for {kind:?}");
        id
    }

    /// Removes the listener. Returns false if it was not registered for this kind.
    pub fn un(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(&kind) else {
            return false;
        };

        match listeners.iter().rposition(|(listener_id, _)| *listener_id == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Calls all the listeners of the event kind in the order of registration.
    pub fn fire(&self, event: &MapEvent) {
        let Some(listeners) = self.listeners.get(&event.kind()) else {
            return;
        };

        for (_, listener) in listeners {
            listener(event);
        }
    }

    /// Number of listeners of the event kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Sets the filter that decides which features can be selected by clicking the map.
    pub fn set_select_filter(
        &mut self,
        filter: impl Fn(&Feature, Option<&str>) -> bool + Send + Sync + 'static,
    ) {
        *self.select_filter.write() = Some(Arc::new(filter));
    }

    /// Removes the select filter, so any feature can be selected.
    pub fn clear_select_filter(&mut self) {
        *self.select_filter.write() = None;
    }

    /// Returns true if the select filter allows selecting the feature.
    pub fn select_filter_allows(&self, feature: &Feature, layer_id: Option<&str>) -> bool {
        allows(&self.select_filter, feature, layer_id)
    }

    pub(crate) fn select_filter_handle(&self) -> Arc<RwLock<Option<SelectFilter>>> {
        self.select_filter.clone()
    }
}

pub(crate) fn allows(
    filter: &RwLock<Option<SelectFilter>>,
    feature: &Feature,
    layer_id: Option<&str>,
) -> bool {
    let filter = filter.read().clone();
    filter.map_or(true, |filter| filter(feature, layer_id))
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    fn pointer(x: f64) -> PointerInfo {
        PointerInfo {
            pixel: Point2d::new(x, 0.0),
            coordinate: Point2d::new(x, 0.0),
            dragging: false,
        }
    }

    #[test]
    fn listeners_are_called_in_order() {
        let calls = Arc::new(Mutex::new(vec![]));
        let mut bus = EventBus::new();

        let first = calls.clone();
        bus.on(EventKind::MapClick, move |_| first.lock().push("first"));
        let second = calls.clone();
        bus.on(EventKind::MapClick, move |_| second.lock().push("second"));
        let other = calls.clone();
        bus.on(EventKind::MouseMove, move |_| other.lock().push("move"));

        bus.fire(&MapEvent::MapClick(pointer(1.0)));
        assert_eq!(*calls.lock(), ["first", "second"]);
    }

    #[test]
    fn un_removes_listener() {
        let calls = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();

        let counter = calls.clone();
        let id = bus.on(EventKind::MouseMove, move |_| *counter.lock() += 1);
        bus.fire(&MapEvent::MouseMove(pointer(1.0)));

        assert!(!bus.un(EventKind::MapClick, id));
        assert!(bus.un(EventKind::MouseMove, id));
        assert!(!bus.un(EventKind::MouseMove, id));
        bus.fire(&MapEvent::MouseMove(pointer(2.0)));

        assert_eq!(*calls.lock(), 1);
        assert_eq!(bus.listener_count(EventKind::MouseMove), 0);
    }

    #[test]
    fn listener_receives_payload() {
        let received = Arc::new(Mutex::new(None));
        let mut bus = EventBus::new();

        let target = received.clone();
        bus.on(EventKind::MapMoveEnd, move |event| {
            if let MapEvent::MapMoveEnd(state) = event {
                *target.lock() = Some(*state);
            }
        });

        let state = ViewState::new(Point2d::new(10.0, 10.0), 4.0);
        bus.fire(&MapEvent::MapMoveEnd(state));
        assert_eq!(*received.lock(), Some(state));
    }

    #[test]
    fn select_filter() {
        let mut bus = EventBus::new();
        let feature = Feature::new(Point2d::new(0.0, 0.0));
        assert!(bus.select_filter_allows(&feature, Some("any")));

        bus.set_select_filter(|_, layer_id| layer_id == Some("selectable"));
        assert!(bus.select_filter_allows(&feature, Some("selectable")));
        assert!(!bus.select_filter_allows(&feature, None));

        let handle = bus.select_filter_handle();
        assert!(!allows(&handle, &feature, Some("other")));

        bus.clear_select_filter();
        assert!(allows(&handle, &feature, Some("other")));
    }
}
