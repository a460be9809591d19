//! PTV Mercator (`EPSG:505456`), a spherical Mercator with a scaled Earth radius.
//!
//! [`forward`] and [`inverse`] are the raw closed-form transforms and return whatever IEEE
//! arithmetic yields, including infinities at the poles. The [`PtvMercator`] projection wraps
//! them and rejects the poles and non-finite results.

use std::f64::consts::PI;
use std::marker::PhantomData;

use crate::cartesian::NewCartesianPoint2d;
use crate::geo::point::NewGeoPoint;
use crate::geo::projection::Projection;
use crate::Rect;

/// Scaled radius constant of the projection.
pub const R: f64 = PI * 6_371_000.0;

/// Declared extent of the projection in meters.
pub const EXTENT: Rect = Rect::new(-19_900_000.0, -7_300_000.0, 19_900_000.0, 18_600_000.0);

/// Converts geographic `(lon, lat)` in degrees into projected `(x, y)`.
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * R / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    let y = y * R / 180.0;

    (x, y)
}

/// Converts projected `(x, y)` into geographic `(lon, lat)` in degrees.
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / R) * 180.0;
    let lat = (y / R) * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);

    (lon, lat)
}

/// [`forward`] and [`inverse`] as a [`Projection`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PtvMercator<In, Out> {
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> PtvMercator<In, Out> {
    /// Creates a new instance.
    pub fn new() -> Self {
        Self {
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In: NewGeoPoint, Out: NewCartesianPoint2d<f64>> Projection for PtvMercator<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        if input.lat().abs() >= 90.0 {
            return None;
        }

        let (x, y) = forward(input.lon(), input.lat());
        (x.is_finite() && y.is_finite()).then(|| Out::new(x, y))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let (lon, lat) = inverse(input.x(), input.y());
        (lon.is_finite() && lat.is_finite()).then(|| In::lonlat(lon, lat))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::{GeoPoint, GeoPoint2d};
    use crate::latlon;

    #[test]
    fn round_trip() {
        for lon in [-180.0, -120.5, -1.0, 0.5, 8.4, 90.0, 179.99] {
            for lat in [-89.89, -60.0, -0.25, 0.1, 30.0, 48.77, 89.89] {
                let (x, y) = forward(lon, lat);
                let (lon_back, lat_back) = inverse(x, y);
                assert_relative_eq!(lon_back, lon, max_relative = 1e-6);
                assert_relative_eq!(lat_back, lat, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn round_trip_on_extent() {
        for x in [EXTENT.x_min(), -1_000.0, 0.0, 123_456.7, EXTENT.x_max()] {
            for y in [EXTENT.y_min(), -5_000.5, 1.0, 6_000_000.0, EXTENT.y_max()] {
                let (lon, lat) = inverse(x, y);
                let (x_back, y_back) = forward(lon, lat);
                assert_relative_eq!(x_back, x, max_relative = 1e-6, epsilon = 1e-6);
                assert_relative_eq!(y_back, y, max_relative = 1e-6, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn longitude_is_linear() {
        for lon in [-180.0, -45.0, 0.0, 1.0, 13.37, 180.0] {
            let (x, _) = forward(lon, 0.0);
            assert_eq!(x, lon * R / 180.0);
        }
    }

    #[test]
    fn equator_maps_to_zero() {
        let (_, y) = forward(0.0, 0.0);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn raw_functions_propagate_pole_values() {
        let (_, south) = forward(0.0, -90.0);
        assert_eq!(south, f64::NEG_INFINITY);

        let (_, north) = forward(0.0, 90.0);
        assert!(north > 1e8);
    }

    #[test]
    fn projection_rejects_poles() {
        let projection = PtvMercator::<GeoPoint2d, Point2d>::new();
        assert!(projection.project(&latlon!(-90.0, 10.0)).is_none());
        assert!(projection.project(&latlon!(90.0, 10.0)).is_none());
        assert!(projection.project(&latlon!(f64::NAN, 10.0)).is_none());

        let projected = projection.project(&latlon!(52.52, 13.4)).expect("finite");
        let back = projection.unproject(&projected).expect("finite");
        assert_relative_eq!(back.lat(), 52.52, max_relative = 1e-9);
        assert_relative_eq!(back.lon(), 13.4, max_relative = 1e-9);
    }
}
