//! Geometries, coordinate reference systems and projections used by the `vmap` crate.
//!
//! * [`cartesian`] - points, extents and sizes in projected (planar) coordinates.
//! * [`geo`] - geographic points, coordinate reference systems, projections and the
//!   process-wide [`ProjectionRegistry`](geo::ProjectionRegistry).
//! * [`geometry`] - feature geometries with the planar measurements the map needs (length, area,
//!   interior point, hit testing).

pub mod cartesian;
pub mod error;
pub mod geo;
pub mod geometry;

pub use cartesian::{CartesianPoint2d, NewCartesianPoint2d, Point2d, Rect, Size, Vector2d};
pub use error::VmapTypesError;
pub use geometry::{Contour, Geom, GeometryType, Polygon};
