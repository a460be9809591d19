use std::ops::{Index, IndexMut};

use crate::layer::Layer;

/// Ordered list of map layers. The first layer is drawn at the bottom.
///
/// Any layer can be temporarily hidden with [`LayerCollection::hide`]. Hidden layers keep their
/// place in the collection.
///
/// Layers are stored as trait objects. Use downcasting through the `Any` trait to get the
/// concrete layer type:
///
/// ```
/// use vmap::layer::{Layer, TileLayer, TileSource};
/// use vmap::map::LayerCollection;
///
/// let mut collection = LayerCollection::default();
/// collection.push(TileLayer::new(TileSource::osm("http://{a-c}.tile.openstreetmap.org/{z}/{x}/{y}.png")).with_id("osm"));
///
/// assert!(collection[0].as_any().downcast_ref::<TileLayer>().is_some());
/// assert_eq!(collection.index_of_id("osm"), Some(0));
/// ```
#[derive(Default)]
pub struct LayerCollection(Vec<LayerEntry>);

struct LayerEntry {
    layer: Box<dyn Layer>,
    is_hidden: bool,
}

impl LayerCollection {
    /// Removes all layers from the collection.
    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Inserts a layer at position `index`, shifting all layers after it up.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    pub fn insert(&mut self, index: usize, layer: impl Into<Box<dyn Layer>>) {
        self.0.insert(index, LayerEntry::from(layer.into()));
    }

    /// Removes a layer at `index`, shifting all layers after it down and returning the removed
    /// layer.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Box<dyn Layer> {
        self.0.remove(index).layer
    }

    /// Retains only the layers specified by the predicate.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&dyn Layer) -> bool,
    {
        self.0.retain(|entry| f(&*entry.layer))
    }

    /// Adds the layer on top of the collection.
    pub fn push(&mut self, layer: impl Into<Box<dyn Layer>>) {
        self.0.push(LayerEntry::from(layer.into()))
    }

    /// Removes the top layer from the collection and returns it.
    pub fn pop(&mut self) -> Option<Box<dyn Layer>> {
        self.0.pop().map(|entry| entry.layer)
    }

    /// Returns the count of layers in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the collection contains zero layers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a layer at `index`, or `None` if index is out of bounds.
    pub fn get(&self, index: usize) -> Option<&dyn Layer> {
        self.0.get(index).map(|entry| &*entry.layer)
    }

    /// Returns a mutable reference to a layer at `index`, or `None` if index is out of bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn Layer>> {
        self.0.get_mut(index).map(|entry| &mut entry.layer)
    }

    /// Position of the layer with the given id. If several layers have the same id, the top-most
    /// one is returned.
    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.0
            .iter()
            .rposition(|entry| entry.layer.id() == Some(id))
    }

    /// Layer with the given id, see [`LayerCollection::index_of_id`].
    pub fn get_by_id(&self, id: &str) -> Option<&dyn Layer> {
        self.index_of_id(id).and_then(|index| self.get(index))
    }

    /// Mutable layer with the given id, see [`LayerCollection::index_of_id`].
    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut Box<dyn Layer>> {
        self.index_of_id(id).and_then(|index| self.get_mut(index))
    }

    /// Swaps two layers in the collection.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` are out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b)
    }

    /// Moves the layer from position `from` to position `to`, shifting the layers in between.
    ///
    /// # Panics
    ///
    /// Panics if `from` or `to` are out of bounds.
    pub fn move_layer(&mut self, from: usize, to: usize) {
        let entry = self.0.remove(from);
        self.0.insert(to, entry);
    }

    /// Iterates over all layers from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.0.iter().map(|entry| &*entry.layer)
    }

    /// Iterates over mutable references to all layers in the collection.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Layer>> + '_ {
        self.0.iter_mut().map(|entry| &mut entry.layer)
    }

    /// Sets the layer at `index` as invisible.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn hide(&mut self, index: usize) {
        self.0[index].is_hidden = true;
    }

    /// Sets the layer at `index` as visible.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn show(&mut self, index: usize) {
        self.0[index].is_hidden = false;
    }

    /// Returns true, if the layer at `index` is not hidden.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn is_visible(&self, index: usize) -> bool {
        !self.0[index].is_hidden
    }

    /// Iterates over all visible layers from bottom to top.
    pub fn iter_visible(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.0
            .iter()
            .filter(|entry| !entry.is_hidden)
            .map(|entry| &*entry.layer)
    }

    /// Ids of all layers from bottom to top. Layers without id are listed as `None`.
    pub fn ids(&self) -> Vec<Option<&str>> {
        self.iter().map(|layer| layer.id()).collect()
    }
}

impl Index<usize> for LayerCollection {
    type Output = dyn Layer;

    fn index(&self, index: usize) -> &Self::Output {
        &*self.0[index].layer
    }
}

impl IndexMut<usize> for LayerCollection {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut *self.0[index].layer
    }
}

impl From<Vec<Box<dyn Layer>>> for LayerCollection {
    fn from(value: Vec<Box<dyn Layer>>) -> Self {
        Self(value.into_iter().map(LayerEntry::from).collect())
    }
}

impl From<Box<dyn Layer>> for LayerEntry {
    fn from(layer: Box<dyn Layer>) -> Self {
        Self {
            is_hidden: !layer.is_visible(),
            layer,
        }
    }
}

impl<T: Layer + 'static> From<T> for Box<dyn Layer> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
