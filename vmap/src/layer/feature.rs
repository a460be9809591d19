use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use vmap_types::geometry::Geom;

/// Geographic object shown by a [`VectorLayer`](super::VectorLayer).
///
/// The geometry is stored in the working projection of the map (`EPSG:3857`). Properties are
/// arbitrary JSON values, as they come from GeoJSON documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    id: Option<String>,
    geometry: Geom,
    properties: JsonMap<String, Value>,
}

impl Feature {
    /// Creates a feature without id and properties.
    pub fn new(geometry: impl Into<Geom>) -> Self {
        Self {
            id: None,
            geometry: geometry.into(),
            properties: JsonMap::new(),
        }
    }

    /// Sets the id of the feature.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets a property of the feature.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Replaces all the properties of the feature.
    pub fn with_properties(mut self, properties: JsonMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Id of the feature.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Changes the id of the feature.
    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Geometry of the feature.
    pub fn geometry(&self) -> &Geom {
        &self.geometry
    }

    /// Mutable geometry of the feature.
    pub fn geometry_mut(&mut self) -> &mut Geom {
        &mut self.geometry
    }

    /// Replaces the geometry of the feature.
    pub fn set_geometry(&mut self, geometry: impl Into<Geom>) {
        self.geometry = geometry.into();
    }

    /// All properties of the feature.
    pub fn properties(&self) -> &JsonMap<String, Value> {
        &self.properties
    }

    /// Value of the property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Sets the value of the property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Text to label the feature with: the value of the `key` property, or the id of the feature
    /// if the property is not set or is empty.
    pub fn label(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(value) if is_truthy(value) => Some(value_to_text(value)),
            _ => self.id.clone(),
        }
    }
}

/// Returns false for values that are considered "not set": `null`, `false`, `0`, `""`.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(v) => *v,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String values without quotes, everything else in JSON notation.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
