use nalgebra::{Rotation2, Vector2};
use vmap_types::cartesian::{CartesianPoint2d, Point2d, Rect, Size};

/// Resolution (meters per pixel) of zoom level 0 in the Web Mercator tile grid.
pub const ZOOM_0_RESOLUTION: f64 = 156543.03392804097;

/// Position of the map on the screen: center point in `EPSG:3857`, zoom level, rotation and the
/// size of the map in pixels.
///
/// The zoom level is the primary value, the resolution is derived from it. This way a view
/// restored from the navigation history has exactly the zoom it was saved with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    center: Point2d,
    zoom: f64,
    rotation: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Point2d::new(0.0, 0.0),
            zoom: 0.0,
            rotation: 0.0,
            size: Size::new(0.0, 0.0),
        }
    }
}

impl MapView {
    /// Creates a new view.
    pub fn new(center: Point2d, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            ..Default::default()
        }
    }

    /// Center of the view.
    pub fn center(&self) -> Point2d {
        self.center
    }

    /// Returns a copy of the view with the given center.
    pub fn with_center(&self, center: Point2d) -> Self {
        Self { center, ..*self }
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Returns a copy of the view with the given zoom level.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self { zoom, ..*self }
    }

    /// Size of a pixel in map units.
    pub fn resolution(&self) -> f64 {
        ZOOM_0_RESOLUTION / 2f64.powf(self.zoom)
    }

    /// Returns a copy of the view with the zoom level matching the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        self.with_zoom(zoom_for_resolution(resolution))
    }

    /// Rotation of the view in radians, counterclockwise.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Returns a copy of the view with the given rotation.
    pub fn with_rotation(&self, rotation: f64) -> Self {
        Self { rotation, ..*self }
    }

    /// Size of the map in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given size.
    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }

    /// Extent of the visible area. For a rotated view this is the bounding rectangle of the
    /// rotated screen.
    pub fn get_bbox(&self) -> Rect {
        let corners = [
            Point2d::new(0.0, 0.0),
            Point2d::new(self.size.width(), 0.0),
            Point2d::new(0.0, self.size.height()),
            Point2d::new(self.size.width(), self.size.height()),
        ]
        .map(|p| self.screen_to_map(p));

        Rect::from_points(corners.iter()).unwrap_or_else(|| Rect::from_point(&self.center))
    }

    /// Converts a pixel position (from the top-left corner) into map coordinates.
    pub fn screen_to_map(&self, px_position: Point2d) -> Point2d {
        let offset = Vector2::new(
            (px_position.x - self.size.half_width()) * self.resolution(),
            (self.size.half_height() - px_position.y) * self.resolution(),
        );

        self.center + Rotation2::new(self.rotation) * offset
    }

    /// Converts map coordinates into a pixel position.
    pub fn map_to_screen(&self, point: &impl CartesianPoint2d<Num = f64>) -> Point2d {
        let offset = Rotation2::new(-self.rotation)
            * Vector2::new(point.x() - self.center.x, point.y() - self.center.y);

        Point2d::new(
            offset.x / self.resolution() + self.size.half_width(),
            self.size.half_height() - offset.y / self.resolution(),
        )
    }

    /// Moves the view so that the map point under the pixel `from` ends up under the pixel `to`.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let delta = self.screen_to_map(to) - self.screen_to_map(from);
        Self {
            center: self.center - delta,
            ..*self
        }
    }

    /// Changes zoom by `delta` keeping the map point under the pixel `base_point` in place.
    pub fn zoom_around(&self, delta: f64, base_point: Point2d) -> Self {
        let anchor = self.screen_to_map(base_point);
        let zoomed = self.with_zoom(self.zoom + delta);
        let k = zoomed.resolution() / self.resolution();

        zoomed.with_center(anchor + (self.center - anchor) * k)
    }

    /// View that shows the whole `extent` in the current size, centered on it.
    ///
    /// If the size of the view or the extent is zero, only the center is changed.
    pub fn fit(&self, extent: &Rect) -> Self {
        let centered = self.with_center(extent.center());
        if self.size.is_zero() || (extent.width() == 0.0 && extent.height() == 0.0) {
            return centered;
        }

        let resolution = (extent.width() / self.size.width())
            .max(extent.height() / self.size.height());
        centered.with_resolution(resolution)
    }
}

/// Zoom level at which a pixel has the given size in map units.
pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (ZOOM_0_RESOLUTION / resolution).log2()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn view(center: Point2d, zoom: f64) -> MapView {
        MapView::new(center, zoom).with_size(Size::new(100.0, 100.0))
    }

    #[test]
    fn resolution_follows_zoom() {
        let view = MapView::new(Point2d::new(0.0, 0.0), 0.0);
        assert_eq!(view.resolution(), ZOOM_0_RESOLUTION);
        assert_eq!(view.with_zoom(3.0).resolution(), ZOOM_0_RESOLUTION / 8.0);
        assert_abs_diff_eq!(
            view.with_resolution(ZOOM_0_RESOLUTION / 4.0).zoom(),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn screen_to_map_size() {
        let view = view(Point2d::new(0.0, 0.0), zoom_for_resolution(1.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-50.0, 50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(50.0, 50.0)),
            Point2d::new(0.0, 0.0),
            epsilon = 0.0001,
        );

        let view = view.with_size(Size::new(200.0, 50.0));
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(25.0, 49.0)),
            Point2d::new(-75.0, -24.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn screen_to_map_position_and_resolution() {
        let view = view(Point2d::new(-100.0, -100.0), zoom_for_resolution(2.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-200.0, 0.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(100.0, 100.0)),
            Point2d::new(0.0, -200.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn rotated_view_round_trip() {
        let view = view(Point2d::new(10.0, 20.0), 15.0).with_rotation(0.7);
        let px = Point2d::new(13.0, 77.0);
        let map = view.screen_to_map(px);

        assert_abs_diff_eq!(view.map_to_screen(&map), px, epsilon = 1e-6);
    }

    #[test]
    fn bbox() {
        let view = view(Point2d::new(0.0, 0.0), zoom_for_resolution(1.0));
        let bbox = view.get_bbox();
        assert_abs_diff_eq!(bbox.x_min(), -50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bbox.y_max(), 50.0, epsilon = 1e-9);

        let rotated = view.with_rotation(std::f64::consts::FRAC_PI_4).get_bbox();
        assert_abs_diff_eq!(rotated.x_max(), 50.0 * 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn translate_by_pixels() {
        let view = view(Point2d::new(0.0, 0.0), zoom_for_resolution(2.0));
        let moved = view.translate_by_pixels(Point2d::new(10.0, 10.0), Point2d::new(20.0, 0.0));

        assert_abs_diff_eq!(moved.center(), Point2d::new(-20.0, -20.0), epsilon = 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor() {
        let view = view(Point2d::new(0.0, 0.0), 10.0);
        let anchor_px = Point2d::new(80.0, 30.0);
        let anchor = view.screen_to_map(anchor_px);

        let zoomed = view.zoom_around(1.0, anchor_px);
        assert_eq!(zoomed.zoom(), 11.0);
        assert_abs_diff_eq!(zoomed.screen_to_map(anchor_px), anchor, epsilon = 1e-6);
    }

    #[test]
    fn fit_extent() {
        let view = view(Point2d::new(0.0, 0.0), 0.0);
        let fitted = view.fit(&Rect::new(100.0, 100.0, 500.0, 300.0));

        assert_eq!(fitted.center(), Point2d::new(300.0, 200.0));
        assert_abs_diff_eq!(fitted.resolution(), 4.0, epsilon = 1e-9);

        let point = view.fit(&Rect::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(point.center(), Point2d::new(5.0, 5.0));
        assert_eq!(point.zoom(), 0.0);
    }
}
