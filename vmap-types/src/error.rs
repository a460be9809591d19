//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmapTypesError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// The projection code is not registered.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),
    /// Both projections are known, but there is no way to transform coordinates between them.
    #[error("no transform registered from {from} to {to}")]
    NoTransform {
        /// Source projection code.
        from: String,
        /// Target projection code.
        to: String,
    },
    /// Input coordinates are outside of the domain of the projection (e.g. a pole in a Mercator
    /// projection), so the result is not a finite number.
    #[error("coordinates are outside of the projection domain")]
    OutOfDomain,
}
