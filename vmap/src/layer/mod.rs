//! [Layers](Layer) specify what data is shown on the map.
//!
//! There are three kinds of layers:
//! * [`TileLayer`] - prerendered image tiles from an Internet service (used for backgrounds).
//! * [`LayerGroup`] - several layers handled as one.
//! * [`VectorLayer`] - a set of [`Feature`]s drawn with a [`FeatureStyle`](crate::style::FeatureStyle).

use std::any::Any;

mod feature;
pub mod geojson;
mod group;
mod tile_layer;
mod vector_layer;

pub use feature::Feature;
pub(crate) use feature::value_to_text;
pub use group::LayerGroup;
pub use tile_layer::{TileIndex, TileLayer, TileSource};
pub use vector_layer::{LoadingStrategy, UrlFunction, VectorLayer, VectorSource};

/// A layer of a map.
///
/// A map stores layers as trait objects. Use [`Layer::as_any`] to get the concrete type back.
pub trait Layer: Send + Sync {
    /// Id of the layer, used to find it in a [`LayerCollection`](crate::map::LayerCollection).
    fn id(&self) -> Option<&str>;
    /// Changes the id of the layer.
    fn set_id(&mut self, id: Option<String>);
    /// Whether the layer is shown when it is added to a map.
    fn is_visible(&self) -> bool {
        true
    }
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Used in tests.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TestLayer(pub Option<String>);

#[cfg(test)]
impl TestLayer {
    pub(crate) fn new(id: &str) -> Self {
        Self(Some(id.to_string()))
    }
}

#[cfg(test)]
impl Layer for TestLayer {
    fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.0 = id;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
