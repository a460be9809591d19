use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Point2d, Rect};
use crate::geometry::contour::{Contour, Segment};

/// Polygon with an outer ring and optional holes. All rings are closed contours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Outer contour.
    pub outer_contour: Contour,
    /// Inner contours (holes).
    pub inner_contours: Vec<Contour>,
}

impl Polygon {
    /// Creates a new polygon.
    pub fn new(outer_contour: Contour, inner_contours: Vec<Contour>) -> Self {
        Self {
            outer_contour,
            inner_contours,
        }
    }

    /// Iterates over the outer contour followed by the holes.
    pub fn iter_contours(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.outer_contour).chain(self.inner_contours.iter())
    }

    /// Mutable access to all the rings.
    pub fn iter_contours_mut(&mut self) -> impl Iterator<Item = &mut Contour> {
        std::iter::once(&mut self.outer_contour).chain(self.inner_contours.iter_mut())
    }

    /// Iterates over the segments of all the rings.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.iter_contours().flat_map(Contour::iter_segments)
    }

    /// Planar area of the polygon with the area of the holes subtracted.
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .inner_contours
            .iter()
            .map(|c| c.area_signed().abs())
            .sum();
        self.outer_contour.area_signed().abs() - holes
    }

    /// Returns true if the `point` lies inside the polygon or on one of its sides. Holes are
    /// resolved with the even-odd rule, so their winding does not matter.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        if self
            .iter_segments()
            .any(|s| s.distance_to_point_sq(point) == 0.0)
        {
            return true;
        }

        let x = point.x();
        let y = point.y();
        let mut inside = false;

        for Segment(p1, p2) in self.iter_segments() {
            if (p1.y > y) != (p2.y > y) {
                let x_cross = (p2.x - p1.x) * (y - p1.y) / (p2.y - p1.y) + p1.x;
                if x < x_cross {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// A point guaranteed to be inside the polygon, suitable for placing a label.
    ///
    /// A horizontal line through the middle of the bounding rectangle is intersected with all
    /// the rings, and the middle of the widest inner span is returned. Falls back to the center
    /// of the bounding rectangle for degenerate polygons.
    pub fn interior_point(&self) -> Option<Point2d> {
        let bbox = self.bounding_rect()?;
        let y = bbox.center().y;

        let mut intersections: Vec<f64> = self
            .iter_segments()
            .filter(|Segment(p1, p2)| p1.y != p2.y)
            .filter(|Segment(p1, p2)| (p1.y <= y && y <= p2.y) || (p2.y <= y && y <= p1.y))
            .map(|Segment(p1, p2)| (y - p1.y) / (p2.y - p1.y) * (p2.x - p1.x) + p1.x)
            .collect();
        intersections.sort_by(f64::total_cmp);

        let mut best: Option<(f64, f64)> = None;
        for pair in intersections.windows(2) {
            let width = (pair[1] - pair[0]).abs();
            let x = (pair[0] + pair[1]) / 2.0;
            if best.map_or(true, |(best_width, _)| width > best_width)
                && self.contains_point(&Point2d::new(x, y))
            {
                best = Some((width, x));
            }
        }

        let x = best.map_or(bbox.center().x, |(_, x)| x);
        Some(Point2d::new(x, y))
    }

    /// Bounding rectangle of the outer contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.outer_contour.bounding_rect()
    }
}

impl From<Vec<Point2d>> for Polygon {
    fn from(value: Vec<Point2d>) -> Self {
        Self::new(Contour::closed(value), vec![])
    }
}
