//! VMap is a map instance façade. It keeps the model of an interactive map (the view, an ordered
//! list of layers, features with styles), turns user input into navigation and feature editing,
//! and exposes everything through a single [`VMap`] object.
//!
//! # Quick start
//!
//! ```
//! use vmap::background::Backgrounds;
//! use vmap::config::MapConfig;
//! use vmap::events::{EventKind, MapEvent};
//! use vmap::style::StylePresets;
//! use vmap::VMap;
//!
//! let config = MapConfig::from_json(r#"{"center": [8.4, 49.0], "zoom": 10}"#).unwrap();
//! let mut vmap = VMap::new(config, Backgrounds::default(), StylePresets::default()).unwrap();
//!
//! vmap.events_mut().on(EventKind::MapMoveEnd, |event| {
//!     if let MapEvent::MapMoveEnd(state) = event {
//!         println!("moved to {:?}", state.center);
//!     }
//! });
//!
//! vmap.layers().load_point(8.4, 49.0).unwrap();
//! vmap.views().set_zoom(12.0);
//! vmap.views().rewind_view();
//! ```
//!
//! # Main components
//!
//! * [`Map`](map::Map) contains the [`MapView`] and the [`layers`](layer). It only stores data and
//!   queues the [`events`] that happen to it.
//! * [`EventProcessor`](control::EventProcessor) converts raw input into
//!   [`UserEvent`](control::UserEvent)s and passes them through a chain of handlers: the
//!   [`interactions`](interaction) (select, draw, modify, measure) and the
//!   [`MapController`](control::MapController) that navigates the map.
//! * [`ViewHistory`] records every position the map settled at, for rewind and forward.
//!
//! Drawing the map is left to the host application. It reads the layers and the view from
//! [`VMap::map`] and is asked to redraw through a [`Messenger`].

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod background;
mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
mod instance;
pub mod interaction;
pub mod layer;
pub mod map;
mod messenger;
pub mod style;
mod view;
mod view_history;
pub mod widgets;

pub use color::Color;
pub use error::VmapError;
pub use instance::{Layers, LoadRequest, VMap, Views, TEMP_LAYER_ID};
pub use messenger::Messenger;
pub use view::{zoom_for_resolution, MapView, ZOOM_0_RESOLUTION};
pub use view_history::{ViewHistory, ViewState};

// Reexport vmap_types
pub use vmap_types;
