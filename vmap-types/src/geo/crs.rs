use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Coordinate reference system, identified by its code (e.g. `EPSG:3857`).
///
/// The code is resolved into an actual projection by the
/// [`ProjectionRegistry`](super::ProjectionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs {
    code: Cow<'static, str>,
}

impl Crs {
    /// Geographic coordinates on the WGS84 ellipsoid in degrees (longitude, latitude).
    pub const EPSG4326: Crs = Crs::from_static("EPSG:4326");
    /// Spherical Web Mercator, the working projection of a map view.
    pub const EPSG3857: Crs = Crs::from_static("EPSG:3857");
    /// PTV Mercator projection used by PTV xServer tile and feature services.
    pub const EPSG505456: Crs = Crs::from_static("EPSG:505456");

    /// Creates a CRS with a static code.
    pub const fn from_static(code: &'static str) -> Self {
        Self {
            code: Cow::Borrowed(code),
        }
    }

    /// Creates a CRS with the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: Cow::Owned(code.into()),
        }
    }

    /// Code of the CRS.
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

impl From<&str> for Crs {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Crs {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
