use std::any::Any;

use crate::layer::Layer;

/// Several layers that are added to and removed from a map as a single layer.
///
/// Child layers are drawn in the order they are stored, the first one at the bottom.
#[derive(Default)]
pub struct LayerGroup {
    id: Option<String>,
    layers: Vec<Box<dyn Layer>>,
}

impl LayerGroup {
    /// Creates a group of the given layers.
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        Self { id: None, layers }
    }

    /// Sets the id of the group.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a layer on top of the group.
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    /// Child layers.
    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Mutable child layers.
    pub fn layers_mut(&mut self) -> &mut Vec<Box<dyn Layer>> {
        &mut self.layers
    }
}

impl Layer for LayerGroup {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{TileLayer, TileSource};

    #[test]
    fn children_keep_order() {
        let mut group = LayerGroup::new(vec![Box::new(
            TileLayer::new(TileSource::MapQuest { layer: "sat".into() }).with_id("sat"),
        )])
        .with_id("group");
        group.push(TileLayer::new(TileSource::MapQuest { layer: "hyb".into() }).with_id("hyb"));

        let ids: Vec<_> = group.layers().iter().filter_map(|l| l.id()).collect();
        assert_eq!(ids, ["sat", "hyb"]);
        assert_eq!(group.id(), Some("group"));
    }
}
