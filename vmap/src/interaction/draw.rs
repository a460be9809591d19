use vmap_types::cartesian::{CartesianPoint2d, Point2d};
use vmap_types::geometry::{Contour, Geom, GeometryType, Polygon};

use crate::view::MapView;

/// A click closer than this to the finishing vertex of a sketch finishes it.
const FINISH_TOLERANCE_PX: f64 = 12.0;

/// Result of adding a vertex to a sketch.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum SketchUpdate {
    /// The vertex was added, drawing continues.
    Added,
    /// The vertex was ignored.
    Ignored,
    /// The geometry is complete.
    Finished(Geom),
}

/// Geometry being drawn by the user.
#[derive(Debug, Clone)]
pub(super) struct Sketch {
    geometry_type: GeometryType,
    points: Vec<Point2d>,
}

impl Sketch {
    pub(super) fn new(geometry_type: GeometryType) -> Self {
        Self {
            geometry_type,
            points: vec![],
        }
    }

    pub(super) fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// True if the sketch has enough vertices to be finished.
    pub(super) fn can_finish(&self) -> bool {
        !self.points.is_empty() && self.points.len() >= self.min_points()
    }

    fn min_points(&self) -> usize {
        match self.geometry_type {
            GeometryType::Polygon => 3,
            GeometryType::LineString => 2,
            _ => 1,
        }
    }

    /// Adds a vertex clicked by the user.
    ///
    /// Clicking the last vertex of a line or the first vertex of a polygon finishes the sketch.
    /// A vertex equal to the last one is not added.
    pub(super) fn add_point(&mut self, point: Point2d, view: &MapView) -> SketchUpdate {
        if self.geometry_type == GeometryType::Point {
            return SketchUpdate::Finished(Geom::Point(point));
        }

        let finishing_vertex = match self.geometry_type {
            GeometryType::Polygon => self.points.first(),
            _ => self.points.last(),
        };
        if let Some(vertex) = finishing_vertex {
            let pixel_distance = vertex.distance(&point) / view.resolution();
            if pixel_distance <= FINISH_TOLERANCE_PX && self.points.len() >= self.min_points() {
                return self.finish().map_or(SketchUpdate::Ignored, SketchUpdate::Finished);
            }
        }

        if self.points.last() == Some(&point) {
            return SketchUpdate::Ignored;
        }

        self.points.push(point);
        SketchUpdate::Added
    }

    /// Completes the sketch, if it has enough vertices. The sketch is cleared in any case.
    pub(super) fn finish(&mut self) -> Option<Geom> {
        let points = std::mem::take(&mut self.points);
        if points.len() < self.min_points() {
            return None;
        }

        Some(match self.geometry_type {
            GeometryType::Polygon => Geom::Polygon(Polygon::from(points)),
            GeometryType::LineString => Geom::LineString(Contour::open(points)),
            _ => Geom::Point(points[0]),
        })
    }

    /// Current geometry of the sketch with the floating vertex at the pointer position.
    pub(super) fn geometry_with(&self, pointer: Point2d) -> Option<Geom> {
        if self.points.is_empty() {
            return None;
        }

        let mut points = self.points.clone();
        if points.last() != Some(&pointer) {
            points.push(pointer);
        }

        match self.geometry_type {
            GeometryType::Polygon => Some(Geom::Polygon(Polygon::from(points))),
            GeometryType::LineString => Some(Geom::LineString(Contour::open(points))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vmap_types::cartesian::Size;

    use super::*;
    use crate::view::zoom_for_resolution;

    fn view() -> MapView {
        MapView::new(Point2d::new(0.0, 0.0), zoom_for_resolution(1.0))
            .with_size(Size::new(500.0, 500.0))
    }

    #[test]
    fn point_finishes_immediately() {
        let mut sketch = Sketch::new(GeometryType::Point);
        assert_matches!(
            sketch.add_point(Point2d::new(1.0, 2.0), &view()),
            SketchUpdate::Finished(Geom::Point(p)) if p == Point2d::new(1.0, 2.0)
        );
        assert!(sketch.points().is_empty());
    }

    #[test]
    fn line_needs_two_vertices() {
        let view = view();
        let mut sketch = Sketch::new(GeometryType::LineString);

        assert_eq!(sketch.add_point(Point2d::new(0.0, 0.0), &view), SketchUpdate::Added);
        assert_eq!(sketch.add_point(Point2d::new(0.0, 0.0), &view), SketchUpdate::Ignored);
        assert_eq!(sketch.points().len(), 1);

        assert_eq!(sketch.add_point(Point2d::new(100.0, 0.0), &view), SketchUpdate::Added);
        assert_matches!(
            sketch.add_point(Point2d::new(101.0, 1.0), &view),
            SketchUpdate::Finished(Geom::LineString(c)) if c.points().len() == 2
        );
        assert!(sketch.points().is_empty());
        assert!(sketch.finish().is_none());
    }

    #[test]
    fn polygon_closes_at_first_vertex() {
        let view = view();
        let mut sketch = Sketch::new(GeometryType::Polygon);

        for p in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            assert_eq!(sketch.add_point(Point2d::new(p.0, p.1), &view), SketchUpdate::Added);
        }
        assert_matches!(
            sketch.add_point(Point2d::new(2.0, 2.0), &view),
            SketchUpdate::Finished(Geom::Polygon(p)) if p.outer_contour.points().len() == 3
        );
    }

    #[test]
    fn polygon_with_two_vertices_is_not_finished() {
        let view = view();
        let mut sketch = Sketch::new(GeometryType::Polygon);
        sketch.add_point(Point2d::new(0.0, 0.0), &view);
        sketch.add_point(Point2d::new(100.0, 0.0), &view);

        assert_eq!(sketch.add_point(Point2d::new(1.0, 0.0), &view), SketchUpdate::Added);
        assert!(sketch.can_finish());
        assert!(Sketch::new(GeometryType::Polygon).finish().is_none());
    }

    #[test]
    fn floating_vertex() {
        let view = view();
        let mut sketch = Sketch::new(GeometryType::LineString);
        assert!(sketch.geometry_with(Point2d::new(1.0, 1.0)).is_none());

        sketch.add_point(Point2d::new(0.0, 0.0), &view);
        let geometry = sketch.geometry_with(Point2d::new(3.0, 4.0));
        assert_eq!(geometry.map(|g| g.length()), Some(5.0));
    }
}
