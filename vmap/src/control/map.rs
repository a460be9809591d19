use nalgebra::Vector2;
use vmap_types::cartesian::Point2d;

use crate::control::{EventPropagation, Key, MouseButton, UserEvent, UserEventHandler};
use crate::map::Map;
use crate::view::MapView;

const ROTATION_SPEED_K: f64 = 0.005;
const KEYBOARD_PAN_PX: f64 = 128.0;
const KEYBOARD_ZOOM_DELTA: f64 = 1.0;
const DOUBLE_CLICK_ZOOM_DELTA: f64 = 1.0;

/// Configuration of a [`MapController`]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapControllerConfiguration {
    zoom_speed: f64,
    rotation_speed: f64,

    drag_pan: bool,
    drag_rotate: bool,
    mouse_wheel_zoom: bool,
    double_click_zoom: bool,
    pinch_zoom: bool,
    keyboard: bool,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self {
            zoom_speed: 0.5,
            rotation_speed: 1.0,
            drag_pan: true,
            drag_rotate: true,
            mouse_wheel_zoom: true,
            double_click_zoom: true,
            pinch_zoom: true,
            keyboard: true,
        }
    }
}

impl MapControllerConfiguration {
    /// Zoom levels added on every line of mouse wheel scrolling.
    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    /// Sets zoom levels added on every line of mouse wheel scrolling.
    pub fn with_zoom_speed(mut self, speed: f64) -> Self {
        self.zoom_speed = speed;
        self
    }

    /// Sensitivity for map rotation by dragging right mouse button.
    ///
    /// The value here is an abstract multiplier. Default value is `1.0`. Use higher values for
    /// higher sensitivity. Negative value will inverse rotation direction.
    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Sets sensitivity for map rotation by dragging right mouse button.
    pub fn with_rotation_speed(mut self, speed: f64) -> Self {
        self.rotation_speed = speed;
        self
    }

    /// Whether the map is panned by dragging with the left mouse button.
    pub fn drag_pan(&self) -> bool {
        self.drag_pan
    }

    /// Enables or disables panning by dragging.
    pub fn with_drag_pan(mut self, enabled: bool) -> Self {
        self.drag_pan = enabled;
        self
    }

    /// Whether the map is rotated by dragging with the right mouse button.
    pub fn drag_rotate(&self) -> bool {
        self.drag_rotate
    }

    /// Enables or disables rotation by dragging.
    pub fn with_drag_rotate(mut self, enabled: bool) -> Self {
        self.drag_rotate = enabled;
        self
    }

    /// Whether the map is zoomed by the mouse wheel.
    pub fn mouse_wheel_zoom(&self) -> bool {
        self.mouse_wheel_zoom
    }

    /// Enables or disables zooming by the mouse wheel.
    pub fn with_mouse_wheel_zoom(mut self, enabled: bool) -> Self {
        self.mouse_wheel_zoom = enabled;
        self
    }

    /// Whether double click zooms the map in.
    pub fn double_click_zoom(&self) -> bool {
        self.double_click_zoom
    }

    /// Enables or disables zooming by double click.
    pub fn with_double_click_zoom(mut self, enabled: bool) -> Self {
        self.double_click_zoom = enabled;
        self
    }

    /// Whether pinch gestures zoom the map.
    pub fn pinch_zoom(&self) -> bool {
        self.pinch_zoom
    }

    /// Enables or disables zooming by pinch gestures.
    pub fn with_pinch_zoom(mut self, enabled: bool) -> Self {
        self.pinch_zoom = enabled;
        self
    }

    /// Whether the arrow keys pan the map and `+`/`-` zoom it.
    pub fn keyboard(&self) -> bool {
        self.keyboard
    }

    /// Enables or disables keyboard navigation.
    pub fn with_keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = enabled;
        self
    }
}

/// Event handler of a map, providing panning, zooming and rotation capabilities.
///
/// All the views the controller sets are constrained by the zoom limits and the extent of the
/// map. Drag gestures are wrapped into a map interaction, so every drag produces a single
/// move-end event.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new instance of `MapController` with the given configuration.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Returns the current configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    /// Update the configuration of the controller.
    pub fn set_config(&mut self, config: MapControllerConfiguration) {
        self.config = config;
    }
}

impl UserEventHandler for MapController {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::DragStarted(button, _) if self.drags_with(*button) => {
                map.begin_interaction();
                EventPropagation::Consume
            }
            UserEvent::Drag(button, delta, e) => match button {
                MouseButton::Left | MouseButton::Other => {
                    let current_position = e.screen_pointer_position;
                    let prev_position = current_position - *delta;

                    let target = map
                        .view()
                        .translate_by_pixels(prev_position, current_position);
                    self.apply(map, target);

                    EventPropagation::Stop
                }
                MouseButton::Right => {
                    let target = self.get_rotation(map.view(), *delta);
                    self.apply(map, target);

                    EventPropagation::Stop
                }
                _ => EventPropagation::Propagate,
            },
            UserEvent::DragEnded(..) => {
                map.end_interaction();
                EventPropagation::Stop
            }
            UserEvent::Scroll(delta, mouse_event) if self.config.mouse_wheel_zoom => {
                let target = map.view().zoom_around(
                    *delta * self.config.zoom_speed,
                    mouse_event.screen_pointer_position,
                );
                self.apply(map, target);

                EventPropagation::Stop
            }
            UserEvent::DoubleClick(MouseButton::Left, mouse_event)
                if self.config.double_click_zoom =>
            {
                let target = map
                    .view()
                    .zoom_around(DOUBLE_CLICK_ZOOM_DELTA, mouse_event.screen_pointer_position);
                self.apply(map, target);

                EventPropagation::Stop
            }
            UserEvent::Zoom(zoom, center) if self.config.pinch_zoom => {
                let target = map.view().zoom_around(*zoom, *center);
                self.apply(map, target);

                EventPropagation::Stop
            }
            UserEvent::KeyPressed(key) if self.config.keyboard => {
                let target = self.get_keyboard_target(map.view(), *key);
                self.apply(map, target);

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

impl MapController {
    fn drags_with(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left | MouseButton::Other => self.config.drag_pan,
            MouseButton::Right => self.config.drag_rotate,
            MouseButton::Middle => false,
        }
    }

    fn get_rotation(&self, curr_view: &MapView, px_delta: Vector2<f64>) -> MapView {
        let dz = px_delta.x * self.config.rotation_speed * ROTATION_SPEED_K;
        curr_view.with_rotation(curr_view.rotation() + dz)
    }

    fn get_keyboard_target(&self, curr_view: &MapView, key: Key) -> MapView {
        let size = curr_view.size();
        let center = Point2d::new(size.half_width(), size.half_height());
        let pan = |dx: f64, dy: f64| {
            curr_view.translate_by_pixels(center, center + Vector2::new(dx, dy))
        };

        match key {
            Key::ArrowUp => pan(0.0, KEYBOARD_PAN_PX),
            Key::ArrowDown => pan(0.0, -KEYBOARD_PAN_PX),
            Key::ArrowLeft => pan(KEYBOARD_PAN_PX, 0.0),
            Key::ArrowRight => pan(-KEYBOARD_PAN_PX, 0.0),
            Key::Plus => curr_view.with_zoom(curr_view.zoom() + KEYBOARD_ZOOM_DELTA),
            Key::Minus => curr_view.with_zoom(curr_view.zoom() - KEYBOARD_ZOOM_DELTA),
        }
    }

    fn apply(&self, map: &mut Map, target: MapView) {
        let adjusted = self.adjust_target_view(map, target);
        map.set_view(adjusted);
    }

    /// Adjusts target view according to the limits of the map.
    fn adjust_target_view(&self, map: &Map, target: MapView) -> MapView {
        map.constrain(target)
    }
}
