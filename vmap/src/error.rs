//! Error types used by the crate.

use thiserror::Error;
use vmap_types::VmapTypesError;

/// VMap error type.
#[derive(Debug, Error)]
pub enum VmapError {
    /// Coordinate or geometry error.
    #[error(transparent)]
    Types(#[from] VmapTypesError),
    /// There is no layer with the given id in the map.
    #[error("layer not found: {0}")]
    LayerNotFound(String),
    /// Style definition cannot be used.
    #[error("invalid style: {0}")]
    InvalidStyle(String),
    /// JSON document cannot be parsed.
    #[error("failed to parse json")]
    Json(#[from] serde_json::Error),
    /// GeoJSON document cannot be converted into features.
    #[error("invalid geojson: {0}")]
    GeoJson(String),
    /// Map configuration is not valid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<geojson::Error> for VmapError {
    fn from(value: geojson::Error) -> Self {
        Self::GeoJson(value.to_string())
    }
}
