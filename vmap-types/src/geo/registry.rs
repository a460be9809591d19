use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::cartesian::{CartesianPoint2d, Point2d, Rect};
use crate::error::VmapTypesError;
use crate::geo::projection::{ptv_mercator, Projection, PtvMercator, WebMercator};
use crate::geo::{Crs, GeoPoint, GeoPoint2d, NewGeoPoint};

/// Projection between geographic coordinates and a projected CRS, as stored in the registry.
pub type GeoProjection =
    Arc<dyn Projection<InPoint = GeoPoint2d, OutPoint = Point2d> + Send + Sync>;

/// Linear units of a CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    /// Angular degrees (geographic CRS).
    Degrees,
    /// Meters.
    Meters,
}

/// Named projection: its code, the extent over which it is valid and its units.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionDefinition {
    code: Crs,
    extent: Rect,
    units: Units,
}

impl ProjectionDefinition {
    /// Creates a new definition.
    pub fn new(code: Crs, extent: Rect, units: Units) -> Self {
        Self {
            code,
            extent,
            units,
        }
    }

    /// Code of the projection.
    pub fn code(&self) -> &Crs {
        &self.code
    }

    /// Valid extent in the units of the projection.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Units of the projection.
    pub fn units(&self) -> Units {
        self.units
    }
}

const WEB_MERCATOR_HALF_WIDTH: f64 = 20037508.342789244;

lazy_static! {
    static ref GLOBAL_REGISTRY: RwLock<ProjectionRegistry> =
        RwLock::new(ProjectionRegistry::with_defaults());
}

/// Set of known projections and the transforms between them.
///
/// `EPSG:4326` is the pivot: every projected CRS registers a transform to and from geographic
/// coordinates, and a transform between two projected systems goes through it. Points in
/// `EPSG:4326` are represented as `Point2d { x: lon, y: lat }`.
pub struct ProjectionRegistry {
    definitions: HashMap<Crs, ProjectionDefinition>,
    transforms: HashMap<Crs, GeoProjection>,
}

impl ProjectionRegistry {
    /// Creates a registry without any projections.
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            transforms: HashMap::new(),
        }
    }

    /// Creates a registry with `EPSG:4326`, `EPSG:3857` and `EPSG:505456`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.add_projection(ProjectionDefinition::new(
            Crs::EPSG4326,
            Rect::new(-180.0, -90.0, 180.0, 90.0),
            Units::Degrees,
        ));
        registry.add_projection(ProjectionDefinition::new(
            Crs::EPSG3857,
            Rect::new(
                -WEB_MERCATOR_HALF_WIDTH,
                -WEB_MERCATOR_HALF_WIDTH,
                WEB_MERCATOR_HALF_WIDTH,
                WEB_MERCATOR_HALF_WIDTH,
            ),
            Units::Meters,
        ));
        registry.add_coordinate_transforms(
            Crs::EPSG3857,
            Arc::new(WebMercator::<GeoPoint2d, Point2d>::default()),
        );
        registry.add_projection(ProjectionDefinition::new(
            Crs::EPSG505456,
            ptv_mercator::EXTENT,
            Units::Meters,
        ));
        registry.add_coordinate_transforms(
            Crs::EPSG505456,
            Arc::new(PtvMercator::<GeoPoint2d, Point2d>::new()),
        );

        registry
    }

    /// Process-wide registry, initialized with the default projections on first access.
    pub fn global() -> &'static RwLock<ProjectionRegistry> {
        &GLOBAL_REGISTRY
    }

    /// Adds or replaces a projection definition.
    pub fn add_projection(&mut self, definition: ProjectionDefinition) {
        log::info!(
            "Registered projection {} with extent {:?}",
            definition.code,
            definition.extent.to_array()
        );
        self.definitions.insert(definition.code.clone(), definition);
    }

    /// Sets the transform between geographic coordinates and the projected CRS `code`.
    pub fn add_coordinate_transforms(&mut self, code: Crs, projection: GeoProjection) {
        log::info!("Registered transform between {} and {code}", Crs::EPSG4326);
        self.transforms.insert(code, projection);
    }

    /// Definition of the projection with the given code.
    pub fn get(&self, code: &Crs) -> Option<&ProjectionDefinition> {
        self.definitions.get(code)
    }

    /// Converts a point in `crs` into geographic coordinates.
    pub fn to_geo(&self, point: &Point2d, crs: &Crs) -> Result<GeoPoint2d, VmapTypesError> {
        self.definition(crs)?;
        if *crs == Crs::EPSG4326 {
            return Ok(GeoPoint2d::latlon(point.y(), point.x()));
        }

        self.transform_for(crs)?
            .unproject(point)
            .ok_or(VmapTypesError::OutOfDomain)
    }

    /// Converts a geographic point into `crs`.
    pub fn from_geo(&self, point: &GeoPoint2d, crs: &Crs) -> Result<Point2d, VmapTypesError> {
        self.definition(crs)?;
        if *crs == Crs::EPSG4326 {
            return Ok(Point2d::new(point.lon(), point.lat()));
        }

        self.transform_for(crs)?
            .project(point)
            .ok_or(VmapTypesError::OutOfDomain)
    }

    /// Converts a point from one CRS into another.
    pub fn transform(
        &self,
        point: &Point2d,
        from: &Crs,
        to: &Crs,
    ) -> Result<Point2d, VmapTypesError> {
        if from == to {
            self.definition(from)?;
            return Ok(*point);
        }

        let geo = self.to_geo(point, from)?;
        self.from_geo(&geo, to)
    }

    /// Converts an extent from one CRS into another by transforming its corners.
    pub fn transform_extent(
        &self,
        extent: &Rect,
        from: &Crs,
        to: &Crs,
    ) -> Result<Rect, VmapTypesError> {
        let corners = extent
            .into_quadrangle()
            .iter()
            .map(|corner| self.transform(corner, from, to))
            .collect::<Result<Vec<_>, _>>()?;

        Rect::from_points(corners.iter()).ok_or(VmapTypesError::OutOfDomain)
    }

    fn definition(&self, crs: &Crs) -> Result<&ProjectionDefinition, VmapTypesError> {
        self.definitions
            .get(crs)
            .ok_or_else(|| VmapTypesError::UnknownProjection(crs.to_string()))
    }

    fn transform_for(&self, crs: &Crs) -> Result<&GeoProjection, VmapTypesError> {
        self.transforms
            .get(crs)
            .ok_or_else(|| VmapTypesError::NoTransform {
                from: Crs::EPSG4326.to_string(),
                to: crs.to_string(),
            })
    }
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn ptv_is_registered() {
        let registry = ProjectionRegistry::global().read();
        let definition = registry.get(&Crs::EPSG505456).expect("registered");
        assert_eq!(definition.units(), Units::Meters);
        assert_eq!(
            definition.extent().to_array(),
            [-19_900_000.0, -7_300_000.0, 19_900_000.0, 18_600_000.0]
        );
    }

    #[test]
    fn transform_through_geographic() {
        let registry = ProjectionRegistry::with_defaults();
        let lonlat = Point2d::new(8.4, 49.0);

        let ptv = registry
            .transform(&lonlat, &Crs::EPSG4326, &Crs::EPSG505456)
            .expect("transform");
        let (x, y) = ptv_mercator::forward(8.4, 49.0);
        assert_relative_eq!(ptv.x, x, max_relative = 1e-12);
        assert_relative_eq!(ptv.y, y, max_relative = 1e-12);

        let web = registry
            .transform(&ptv, &Crs::EPSG505456, &Crs::EPSG3857)
            .expect("transform");
        let back = registry
            .transform(&web, &Crs::EPSG3857, &Crs::EPSG4326)
            .expect("transform");
        assert_relative_eq!(back.x, 8.4, max_relative = 1e-9);
        assert_relative_eq!(back.y, 49.0, max_relative = 1e-9);
    }

    #[test]
    fn transform_extent_uses_corners() {
        let registry = ProjectionRegistry::with_defaults();
        let extent = Rect::new(-10.0, -20.0, 30.0, 40.0);
        let projected = registry
            .transform_extent(&extent, &Crs::EPSG4326, &Crs::EPSG3857)
            .expect("transform");

        assert_relative_eq!(projected.x_min(), -1113194.9079327357, max_relative = 1e-9);
        assert_relative_eq!(projected.x_max(), 3339584.723798207, max_relative = 1e-9);
        assert!(projected.y_min() < 0.0);
        assert!(projected.y_max() > projected.y_min());
    }

    #[test]
    fn errors() {
        let registry = ProjectionRegistry::with_defaults();
        let point = Point2d::new(0.0, 0.0);

        assert_matches!(
            registry.transform(&point, &Crs::new("EPSG:1234"), &Crs::EPSG4326),
            Err(VmapTypesError::UnknownProjection(code)) if code == "EPSG:1234"
        );
        assert_matches!(
            registry.transform(&Point2d::new(0.0, 90.0), &Crs::EPSG4326, &Crs::EPSG505456),
            Err(VmapTypesError::OutOfDomain)
        );

        let mut registry = ProjectionRegistry::new();
        registry.add_projection(ProjectionDefinition::new(
            Crs::EPSG4326,
            Rect::new(-180.0, -90.0, 180.0, 90.0),
            Units::Degrees,
        ));
        registry.add_projection(ProjectionDefinition::new(
            Crs::new("EPSG:25832"),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Units::Meters,
        ));
        assert_matches!(
            registry.transform(&point, &Crs::EPSG4326, &Crs::new("EPSG:25832")),
            Err(VmapTypesError::NoTransform { .. })
        );
    }
}
