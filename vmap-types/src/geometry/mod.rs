//! Feature geometries in projected coordinates.
//!
//! Map features store their geometries as [`Geom`] in the working projection of the map. All
//! measurements (length, area) are planar, in the units of that projection.

mod contour;
mod polygon;

pub use contour::{Contour, Segment};
pub use polygon::Polygon;
use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Point2d, Rect};
use crate::geo::Projection;

/// Kind of a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// Single point.
    Point,
    /// Set of points.
    MultiPoint,
    /// Line string.
    LineString,
    /// Set of line strings.
    MultiLineString,
    /// Polygon.
    Polygon,
    /// Set of polygons.
    MultiPolygon,
}

/// Geometry of a map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geom {
    /// Single point.
    Point(Point2d),
    /// Set of points.
    MultiPoint(Vec<Point2d>),
    /// Line string (open contour).
    LineString(Contour),
    /// Set of line strings.
    MultiLineString(Vec<Contour>),
    /// Polygon.
    Polygon(Polygon),
    /// Set of polygons.
    MultiPolygon(Vec<Polygon>),
}

impl Geom {
    /// Kind of the geometry.
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geom::Point(_) => GeometryType::Point,
            Geom::MultiPoint(_) => GeometryType::MultiPoint,
            Geom::LineString(_) => GeometryType::LineString,
            Geom::MultiLineString(_) => GeometryType::MultiLineString,
            Geom::Polygon(_) => GeometryType::Polygon,
            Geom::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Iterates over all vertices of the geometry. For polygons the outer ring goes first.
    pub fn vertices(&self) -> Box<dyn Iterator<Item = &Point2d> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::MultiPoint(points) => Box::new(points.iter()),
            Geom::LineString(contour) => Box::new(contour.points().iter()),
            Geom::MultiLineString(contours) => {
                Box::new(contours.iter().flat_map(|c| c.points().iter()))
            }
            Geom::Polygon(polygon) => {
                Box::new(polygon.iter_contours().flat_map(|c| c.points().iter()))
            }
            Geom::MultiPolygon(polygons) => Box::new(
                polygons
                    .iter()
                    .flat_map(|p| p.iter_contours())
                    .flat_map(|c| c.points().iter()),
            ),
        }
    }

    /// Mutable iterator over all vertices of the geometry.
    pub fn vertices_mut(&mut self) -> Box<dyn Iterator<Item = &mut Point2d> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::MultiPoint(points) => Box::new(points.iter_mut()),
            Geom::LineString(contour) => Box::new(contour.points_mut().iter_mut()),
            Geom::MultiLineString(contours) => {
                Box::new(contours.iter_mut().flat_map(|c| c.points_mut().iter_mut()))
            }
            Geom::Polygon(polygon) => Box::new(
                polygon
                    .iter_contours_mut()
                    .flat_map(|c| c.points_mut().iter_mut()),
            ),
            Geom::MultiPolygon(polygons) => Box::new(
                polygons
                    .iter_mut()
                    .flat_map(|p| p.iter_contours_mut())
                    .flat_map(|c| c.points_mut().iter_mut()),
            ),
        }
    }

    /// Bounding rectangle of the geometry. `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.vertices())
    }

    /// Planar length of line geometries. Zero for other kinds.
    pub fn length(&self) -> f64 {
        match self {
            Geom::LineString(contour) => contour.length(),
            Geom::MultiLineString(contours) => contours.iter().map(Contour::length).sum(),
            _ => 0.0,
        }
    }

    /// Planar area of polygon geometries. Zero for other kinds.
    pub fn area(&self) -> f64 {
        match self {
            Geom::Polygon(polygon) => polygon.area(),
            Geom::MultiPolygon(polygons) => polygons.iter().map(Polygon::area).sum(),
            _ => 0.0,
        }
    }

    /// Point inside a polygon (the largest one for multipolygons) to attach labels to.
    pub fn interior_point(&self) -> Option<Point2d> {
        match self {
            Geom::Polygon(polygon) => polygon.interior_point(),
            Geom::MultiPolygon(polygons) => polygons
                .iter()
                .max_by(|a, b| a.area().total_cmp(&b.area()))
                .and_then(Polygon::interior_point),
            _ => None,
        }
    }

    /// Last vertex of the geometry in vertex order.
    pub fn last_coordinate(&self) -> Option<Point2d> {
        match self {
            Geom::Polygon(polygon) => polygon.outer_contour.points().last().copied(),
            Geom::MultiPolygon(polygons) => polygons
                .last()
                .and_then(|p| p.outer_contour.points().last().copied()),
            _ => self.vertices().last().copied(),
        }
    }

    /// Moves every vertex by the given offset.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in self.vertices_mut() {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Smallest distance between the point and the geometry. Zero for points inside polygons.
    pub fn distance_to(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<f64> {
        let distance_sq = match self {
            Geom::Point(p) => Some(p.distance_sq(point)),
            Geom::MultiPoint(points) => points
                .iter()
                .map(|p| p.distance_sq(point))
                .min_by(f64::total_cmp),
            Geom::LineString(contour) => contour.distance_to_point_sq(point),
            Geom::MultiLineString(contours) => contours
                .iter()
                .filter_map(|c| c.distance_to_point_sq(point))
                .min_by(f64::total_cmp),
            Geom::Polygon(polygon) => polygon_distance_sq(polygon, point),
            Geom::MultiPolygon(polygons) => polygons
                .iter()
                .filter_map(|p| polygon_distance_sq(p, point))
                .min_by(f64::total_cmp),
        };

        distance_sq.map(f64::sqrt)
    }

    /// Returns true if the point is inside the geometry or not farther than `tolerance` from it.
    pub fn contains_point(
        &self,
        point: &impl CartesianPoint2d<Num = f64>,
        tolerance: f64,
    ) -> bool {
        self.distance_to(point)
            .is_some_and(|distance| distance <= tolerance)
    }

    /// Converts every vertex with the given function, stopping at the first error.
    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(&Point2d) -> Result<Point2d, E>,
    ) -> Result<Geom, E> {
        Ok(match self {
            Geom::Point(p) => Geom::Point(f(p)?),
            Geom::MultiPoint(points) => {
                Geom::MultiPoint(points.iter().map(&mut f).collect::<Result<_, _>>()?)
            }
            Geom::LineString(c) => Geom::LineString(map_contour(c, &mut f)?),
            Geom::MultiLineString(contours) => Geom::MultiLineString(
                contours
                    .iter()
                    .map(|c| map_contour(c, &mut f))
                    .collect::<Result<_, _>>()?,
            ),
            Geom::Polygon(p) => Geom::Polygon(map_polygon(p, &mut f)?),
            Geom::MultiPolygon(polygons) => Geom::MultiPolygon(
                polygons
                    .iter()
                    .map(|p| map_polygon(p, &mut f))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Projects the geometry with the given projection. Returns `None` if any of the vertices
    /// cannot be projected.
    pub fn project<Proj>(&self, projection: &Proj) -> Option<Geom>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        self.try_map(|p| projection.project(p).ok_or(())).ok()
    }
}

fn map_contour<E>(
    contour: &Contour,
    f: &mut impl FnMut(&Point2d) -> Result<Point2d, E>,
) -> Result<Contour, E> {
    Ok(Contour::new(
        contour.points().iter().map(f).collect::<Result<_, _>>()?,
        contour.is_closed(),
    ))
}

fn map_polygon<E>(
    polygon: &Polygon,
    f: &mut impl FnMut(&Point2d) -> Result<Point2d, E>,
) -> Result<Polygon, E> {
    Ok(Polygon::new(
        map_contour(&polygon.outer_contour, f)?,
        polygon
            .inner_contours
            .iter()
            .map(|c| map_contour(c, f))
            .collect::<Result<_, _>>()?,
    ))
}

fn polygon_distance_sq(
    polygon: &Polygon,
    point: &impl CartesianPoint2d<Num = f64>,
) -> Option<f64> {
    if polygon.contains_point(point) {
        return Some(0.0);
    }

    polygon
        .iter_segments()
        .map(|s| s.distance_to_point_sq(point))
        .min_by(f64::total_cmp)
}

impl From<Point2d> for Geom {
    fn from(value: Point2d) -> Self {
        Self::Point(value)
    }
}

impl From<Contour> for Geom {
    fn from(value: Contour) -> Self {
        Self::LineString(value)
    }
}

impl From<Polygon> for Geom {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}
