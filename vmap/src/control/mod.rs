//! This module contains traits and structs that provide interactivity of a map.
//!
//! User interaction handling is done in several steps:
//! 1. The host application converts its windowing events into [`RawUserEvent`]s.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into [`UserEvent`]s.
//!    `EventProcessor` keeps track of input state (which mouse buttons are pressed, where the
//!    pointer is, when the last click happened).
//! 3. `EventProcessor` has a list of [`UserEventHandler`]s, which change the state of the map
//!    based on the events.

use nalgebra::Vector2;
use vmap_types::cartesian::Point2d;

use crate::map::Map;

mod event_processor;
mod map;
mod notify;

pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};
pub use notify::NotificationHandler;

/// User input handler.
pub trait UserEventHandler: Send + Sync {
    /// Handle the event.
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation;
}

impl<T: for<'a> Fn(&'a UserEvent, &'a mut Map) -> EventPropagation> UserEventHandler for T
where
    T: Send + Sync,
{
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self(event, map)
    }
}

/// Raw user interaction event, as it comes from the windowing system. It does not provide any
/// state information. The state is tracked by the [`EventProcessor`], which combines
/// `RawUserEvent` with the state to produce [`UserEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Point2d),
    /// Scroll was called (by a mouse wheel or touch pad scrolling). The number is the number of
    /// lines that the event would scroll if it was scrolling a text.
    Scroll(f64),
    /// A pinch gesture. The value is the zoom delta.
    Pinch(f64),
    /// A keyboard key was pressed.
    KeyPressed(Key),
}

/// Keyboard keys used for map navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// `+` key.
    Plus,
    /// `-` key.
    Minus,
}

/// User interaction event. This is the main type that the handlers work with.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. This event is fired right after the
    /// [`UserEvent::ButtonReleased`] event if the release was shortly after the press event and
    /// the pointer was not dragged.
    Click(MouseButton, MouseEvent),
    /// A double click was done. This event is fired right after the second [`UserEvent::Click`]
    /// event if the second click was done shortly after the first click.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),

    /// Drag started (user pressed a mouse button and moves the pointer around without releasing
    /// the button).
    DragStarted(MouseButton, MouseEvent),

    /// Mouse pointer moved after drag started was consumed. The vector is the pointer offset in
    /// pixels since the previous drag event.
    Drag(MouseButton, Vector2<f64>, MouseEvent),

    /// Mouse button was released while dragging.
    DragEnded(MouseButton, MouseEvent),

    /// Scroll event is called. The number is number of text lines the scroll is requested for.
    Scroll(f64, MouseEvent),

    /// Zoom is called around a point. This is different from [`UserEvent::Scroll`], as it is not
    /// produced by a mouse but rather by gestures. The first parameter is zoom delta value.
    Zoom(f64, Point2d),

    /// A keyboard key was pressed.
    KeyPressed(Key),
}

/// Value returned by an [`UserEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
    /// Event should not be propagated to the next handler, and the current event handler should
    /// be considered the owner of the event. This is used, for example, to indicate, that the
    /// handler wants to take ownership of the [`UserEvent::DragStarted`], so that all consequent
    /// drag events are only processed by this handler.
    Consume,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Clone)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub screen_pointer_position: Point2d,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    /// Returns true if any of the buttons is pressed.
    pub fn any_pressed(&self) -> bool {
        [self.left, self.middle, self.right].contains(&MouseButtonState::Pressed)
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    fn single_pressed(&self) -> Option<MouseButton> {
        let mut button = None;
        if self.left == MouseButtonState::Pressed && button.replace(MouseButton::Left).is_some() {
            return None;
        }
        if self.middle == MouseButtonState::Pressed && button.replace(MouseButton::Middle).is_some()
        {
            return None;
        }
        if self.right == MouseButtonState::Pressed && button.replace(MouseButton::Right).is_some() {
            return None;
        }

        button
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}
