use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Point2d, Rect};

/// A straight line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a>(pub &'a Point2d, pub &'a Point2d);

impl Segment<'_> {
    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.0.distance(self.1)
    }

    /// Shortest euclidean distance (squared) between a point and the segment:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the returned value
    ///   is the squared length of the normal
    /// * otherwise the returned value is the smaller one of the distances between the point and
    ///   the segment's endpoints
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> f64 {
        if self.0.equal(self.1) {
            return self.0.distance_sq(point);
        }

        let ds = self.1.sub(self.0);
        let dp = Point2d::new(point.x(), point.y()).sub(self.0);
        let ds_len = ds.x * ds.x + ds.y * ds.y;

        let r = (dp.x * ds.x + dp.y * ds.y) / ds_len;
        if r <= 0.0 {
            self.0.distance_sq(point)
        } else if r >= 1.0 {
            self.1.distance_sq(point)
        } else {
            let s = (dp.y * ds.x - dp.x * ds.y) / ds_len;
            (s * s) * ds_len
        }
    }
}

/// Sequence of points.
///
/// An open contour is a line string. A closed contour has an implicit segment between the last
/// and the first points: the first point is not repeated at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2d>,
    is_closed: bool,
}

impl Contour {
    /// Creates a new contour.
    pub fn new(points: Vec<Point2d>, is_closed: bool) -> Self {
        Self { points, is_closed }
    }

    /// Creates an open contour (line string).
    pub fn open(points: Vec<Point2d>) -> Self {
        Self::new(points, false)
    }

    /// Creates a closed contour (polygon ring). If the last point repeats the first one, it is
    /// dropped.
    pub fn closed(mut points: Vec<Point2d>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        Self::new(points, true)
    }

    /// Whether the contour is closed.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Points of the contour.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Mutable access to the points of the contour.
    pub fn points_mut(&mut self) -> &mut Vec<Point2d> {
        &mut self.points
    }

    /// Iterates over the points, repeating the first point at the end for closed contours.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &Point2d> {
        let closing = if self.is_closed {
            self.points.first()
        } else {
            None
        };

        self.points.iter().chain(closing)
    }

    /// Iterates over the segments of the contour, including the closing one for closed contours.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_>> {
        let mut points = self.iter_points_closing();
        let mut prev = points.next();
        points.filter_map(move |p| Some(Segment(prev.replace(p)?, p)))
    }

    /// Sum of the segment lengths.
    pub fn length(&self) -> f64 {
        self.iter_segments().map(|s| s.length()).sum()
    }

    /// Signed area of a closed contour (positive for counter-clockwise winding).
    pub fn area_signed(&self) -> f64 {
        let mut iter = self.iter_points_closing();
        let Some(mut prev) = iter.next() else {
            return 0.0;
        };

        let mut aggr = 0.0;
        for p in iter {
            aggr += prev.x * p.y - p.x * prev.y;
            prev = p;
        }

        aggr / 2.0
    }

    /// Smallest distance (squared) between the point and any segment of the contour.
    pub fn distance_to_point_sq(&self, point: &impl CartesianPoint2d<Num = f64>) -> Option<f64> {
        if self.points.len() == 1 {
            return Some(self.points[0].distance_sq(point));
        }

        self.iter_segments()
            .map(|s| s.distance_to_point_sq(point))
            .min_by(f64::total_cmp)
    }

    /// Bounding rectangle of the contour points.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn closed_drops_repeated_point() {
        let contour = Contour::closed(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(0.0, 0.0),
        ]);
        assert_eq!(contour.points().len(), 3);
        assert_eq!(contour.iter_points_closing().count(), 4);
        assert_eq!(contour.iter_segments().count(), 3);
    }

    #[test]
    fn iter_segments() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0)]);
        assert_eq!(contour.iter_segments().count(), 0);

        let contour = Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_segments().count(), 1);
        assert_eq!(
            contour.iter_segments().last(),
            Some(Segment(&Point2d::new(0.0, 0.0), &Point2d::new(1.0, 1.0)))
        );
    }

    #[test]
    fn length_and_area() {
        let line = Contour::open(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(3.0, 4.0),
            Point2d::new(3.0, 10.0),
        ]);
        assert_abs_diff_eq!(line.length(), 11.0);

        let square = Contour::closed(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(2.0, 0.0),
            Point2d::new(2.0, 2.0),
            Point2d::new(0.0, 2.0),
        ]);
        assert_abs_diff_eq!(square.length(), 8.0);
        assert_abs_diff_eq!(square.area_signed(), 4.0);
    }

    #[test]
    fn distance_to_point() {
        let contour = Contour::closed(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(1.0, 0.0),
        ]);

        assert_eq!(contour.distance_to_point_sq(&Point2d::new(0.5, 0.5)), Some(0.0));
        assert_eq!(contour.distance_to_point_sq(&Point2d::new(0.0, 1.0)), Some(0.5));
        assert_eq!(contour.distance_to_point_sq(&Point2d::new(2.0, 2.0)), Some(2.0));
        assert_eq!(contour.distance_to_point_sq(&Point2d::new(-2.0, -2.0)), Some(8.0));
        assert_eq!(Contour::open(vec![]).distance_to_point_sq(&Point2d::new(0.0, 0.0)), None);
    }
}
