//! Geographic points (see [`GeoPoint2d`]), coordinate reference systems ([`Crs`]), conversion
//! between them ([`Projection`]) and the [`ProjectionRegistry`] that knows which projections are
//! available in the process.

mod crs;
mod datum;
mod point;
pub mod projection;
mod registry;

pub use crs::Crs;
pub use datum::Datum;
pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
pub use projection::{
    ChainProjection, IdentityProjection, InvertedProjection, Projection, PtvMercator, WebMercator,
};
pub use registry::{GeoProjection, ProjectionDefinition, ProjectionRegistry, Units};
