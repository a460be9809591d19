//! Navigation history of a map view with rewind and forward.

use serde::{Deserialize, Serialize};
use vmap_types::cartesian::Point2d;

use crate::view::MapView;

/// Snapshot of a map position: center in `EPSG:3857` and zoom level.
///
/// Two states are equal only if both the center coordinates and the zoom are exactly equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Center of the map.
    pub center: Point2d,
    /// Zoom level.
    pub zoom: f64,
}

impl ViewState {
    /// Creates a new state.
    pub fn new(center: Point2d, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Applies the state to the view, keeping its size and rotation.
    pub fn apply_to(&self, view: &MapView) -> MapView {
        view.with_center(self.center).with_zoom(self.zoom)
    }
}

impl From<&MapView> for ViewState {
    fn from(view: &MapView) -> Self {
        Self::new(view.center(), view.zoom())
    }
}

/// Undo/redo stack of view states.
///
/// The cursor points at the state that is currently shown. Capturing a new state while the
/// cursor is not at the end discards everything after the cursor.
#[derive(Debug, Clone, Default)]
pub struct ViewHistory {
    states: Vec<ViewState>,
    cursor: Option<usize>,
}

impl ViewHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state. Does nothing if an equal state was already recorded at any position.
    pub fn capture(&mut self, current: ViewState) {
        if self.states.contains(&current) {
            log::debug!("View {current:?} is already in the history");
            return;
        }

        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.states.truncate(keep);
        self.states.push(current);
        self.cursor = Some(self.states.len() - 1);

        log::debug!(
            "Captured view {current:?}, history length: {}",
            self.states.len()
        );
    }

    /// Moves the cursor one step back and returns the state to apply. Returns `None` at the
    /// first position or if the history is empty.
    pub fn rewind(&mut self) -> Option<ViewState> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)? - 1;
        self.cursor = Some(cursor);

        log::debug!("Rewound view history to position {cursor}");
        self.states.get(cursor).copied()
    }

    /// Moves the cursor one step forward and returns the state to apply. Returns `None` at the
    /// last position or if the history is empty.
    pub fn advance(&mut self) -> Option<ViewState> {
        let cursor = self.cursor? + 1;
        let state = self.states.get(cursor).copied()?;
        self.cursor = Some(cursor);

        log::debug!("Advanced view history to position {cursor}");
        Some(state)
    }

    /// Recorded states, oldest first.
    pub fn states(&self) -> &[ViewState] {
        &self.states
    }

    /// Index of the current state, `None` if the history is empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no state was recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
