use std::time::Duration;

use vmap_types::cartesian::{CartesianPoint2d, Point2d};
use web_time::SystemTime;

use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};
use crate::map::Map;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(200);
const DBL_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and hands them to the chain of handlers.
///
/// Handlers are called in the order they were added, until one of them returns
/// [`EventPropagation::Stop`] or [`EventPropagation::Consume`]. A handler that consumes
/// [`UserEvent::DragStarted`] becomes the drag target, and receives all the following
/// [`UserEvent::Drag`] events and the final [`UserEvent::DragEnded`].
pub struct EventProcessor {
    handlers: Vec<Box<dyn UserEventHandler>>,
    pointer_position: Point2d,
    pointer_pressed_position: Point2d,

    buttons_state: MouseButtonsState,

    last_pressed_time: SystemTime,
    last_click_time: SystemTime,

    drag_started: bool,
    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Point2d::new(0.0, 0.0),
            pointer_pressed_position: Point2d::new(0.0, 0.0),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            last_click_time: SystemTime::UNIX_EPOCH,
            drag_started: false,
            drag_target: None,
        }
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the chain.
    pub fn add_handler(&mut self, handler: impl UserEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of handlers in the chain.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Last known position of the pointer in pixels.
    pub fn pointer_position(&self) -> Point2d {
        self.pointer_position
    }

    /// Processes the raw event.
    pub fn handle(&mut self, event: RawUserEvent, map: &mut Map) {
        self.handle_at(event, map, SystemTime::now());
    }

    /// Processes the raw event as if it happened at the given time.
    pub fn handle_at(&mut self, event: RawUserEvent, map: &mut Map, now: SystemTime) {
        for user_event in self.process(event, now) {
            self.dispatch(&user_event, map);

            if matches!(user_event, UserEvent::DragEnded(..)) {
                self.drag_target = None;
            }
        }
    }

    fn dispatch(&mut self, user_event: &UserEvent, map: &mut Map) {
        if matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..)) {
            if let Some(handler) = self.drag_target.and_then(|index| self.handlers.get(index)) {
                handler.handle(user_event, map);
            }

            return;
        }

        let mut drag_start_target = None;
        for (index, handler) in self.handlers.iter().enumerate() {
            match handler.handle(user_event, map) {
                EventPropagation::Propagate => {}
                EventPropagation::Stop => break,
                EventPropagation::Consume => {
                    if let UserEvent::DragStarted(button, _) = user_event {
                        drag_start_target = Some(index);

                        let delta = self.pointer_position - self.pointer_pressed_position;
                        handler.handle(
                            &UserEvent::Drag(*button, delta, self.get_mouse_event()),
                            map,
                        );
                    }

                    break;
                }
            }
        }

        if drag_start_target.is_some() {
            log::debug!("Drag is handled by handler {drag_start_target:?}");
            self.drag_target = drag_start_target;
        }
    }

    fn process(&mut self, event: RawUserEvent, now: SystemTime) -> Vec<UserEvent> {
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = now;
                self.pointer_pressed_position = self.pointer_position;
                self.drag_started = false;

                vec![UserEvent::ButtonPressed(button, self.get_mouse_event())]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(button, self.get_mouse_event())];

                if self.drag_target.is_some() {
                    events.push(UserEvent::DragEnded(button, self.get_mouse_event()));
                } else if !self.drag_started
                    && elapsed(self.last_pressed_time, now) < CLICK_TIMEOUT
                {
                    events.push(UserEvent::Click(button, self.get_mouse_event()));

                    if elapsed(self.last_click_time, now) < DBL_CLICK_TIMEOUT {
                        events.push(UserEvent::DoubleClick(button, self.get_mouse_event()));
                        self.last_click_time = SystemTime::UNIX_EPOCH;
                    } else {
                        self.last_click_time = now;
                    }
                }

                self.drag_started = false;
                events
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event())];
                if let Some(button) = self.buttons_state.single_pressed() {
                    if !self.drag_started
                        && position.taxicab_distance(&self.pointer_pressed_position)
                            > DRAG_THRESHOLD
                    {
                        self.drag_started = true;
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(self.pointer_pressed_position),
                        ));
                    } else if self.drag_target.is_some() {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(),
                        ));
                    }
                }

                events
            }
            RawUserEvent::Scroll(delta) => vec![UserEvent::Scroll(delta, self.get_mouse_event())],
            RawUserEvent::Pinch(delta) => vec![UserEvent::Zoom(delta, self.pointer_position)],
            RawUserEvent::KeyPressed(key) => vec![UserEvent::KeyPressed(key)],
        }
    }

    fn get_mouse_event(&self) -> MouseEvent {
        self.get_mouse_event_pos(self.pointer_position)
    }

    fn get_mouse_event_pos(&self, screen_pointer_position: Point2d) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            buttons: self.buttons_state,
        }
    }
}

fn elapsed(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use vmap_types::cartesian::Size;

    use super::*;
    use crate::control::MouseButton;
    use crate::view::MapView;

    type Log = Arc<Mutex<Vec<UserEvent>>>;

    fn recorder(log: &Log, result: EventPropagation) -> impl UserEventHandler {
        let log = log.clone();
        move |event: &UserEvent, _map: &mut Map| {
            log.lock().push(event.clone());
            result
        }
    }

    fn map() -> Map {
        Map::new(
            MapView::new(Point2d::new(0.0, 0.0), 5.0).with_size(Size::new(200.0, 200.0)),
            vec![],
            None,
        )
    }

    fn at(ms: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1000) + Duration::from_millis(ms)
    }

    fn names(log: &Log) -> Vec<&'static str> {
        log.lock()
            .iter()
            .map(|event| match event {
                UserEvent::ButtonPressed(..) => "pressed",
                UserEvent::ButtonReleased(..) => "released",
                UserEvent::Click(..) => "click",
                UserEvent::DoubleClick(..) => "double_click",
                UserEvent::PointerMoved(..) => "moved",
                UserEvent::DragStarted(..) => "drag_started",
                UserEvent::Drag(..) => "drag",
                UserEvent::DragEnded(..) => "drag_ended",
                UserEvent::Scroll(..) => "scroll",
                UserEvent::Zoom(..) => "zoom",
                UserEvent::KeyPressed(..) => "key",
            })
            .collect()
    }

    #[test]
    fn click_and_double_click() {
        let log = Log::default();
        let mut processor = EventProcessor::default();
        processor.add_handler(recorder(&log, EventPropagation::Propagate));
        let mut map = map();

        let left = MouseButton::Left;
        processor.handle_at(RawUserEvent::ButtonPressed(left), &mut map, at(0));
        processor.handle_at(RawUserEvent::ButtonReleased(left), &mut map, at(50));
        processor.handle_at(RawUserEvent::ButtonPressed(left), &mut map, at(150));
        processor.handle_at(RawUserEvent::ButtonReleased(left), &mut map, at(200));

        assert_eq!(
            names(&log),
            [
                "pressed",
                "released",
                "click",
                "pressed",
                "released",
                "click",
                "double_click"
            ]
        );
    }

    #[test]
    fn slow_release_is_not_a_click() {
        let log = Log::default();
        let mut processor = EventProcessor::default();
        processor.add_handler(recorder(&log, EventPropagation::Propagate));
        let mut map = map();

        processor.handle_at(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map, at(0));
        processor.handle_at(RawUserEvent::ButtonReleased(MouseButton::Left), &mut map, at(500));

        assert_eq!(names(&log), ["pressed", "released"]);
    }

    #[test]
    fn drag_goes_to_consumer_only() {
        let consumer_log = Log::default();
        let other_log = Log::default();
        let mut processor = EventProcessor::default();
        processor.add_handler(recorder(&consumer_log, EventPropagation::Consume));
        processor.add_handler(recorder(&other_log, EventPropagation::Propagate));
        let mut map = map();

        let left = MouseButton::Left;
        processor.handle_at(RawUserEvent::PointerMoved(Point2d::new(10.0, 10.0)), &mut map, at(0));
        processor.handle_at(RawUserEvent::ButtonPressed(left), &mut map, at(0));
        processor.handle_at(RawUserEvent::PointerMoved(Point2d::new(20.0, 10.0)), &mut map, at(10));
        processor.handle_at(RawUserEvent::PointerMoved(Point2d::new(25.0, 12.0)), &mut map, at(20));
        processor.handle_at(RawUserEvent::ButtonReleased(left), &mut map, at(30));

        assert_eq!(
            names(&consumer_log),
            [
                "moved",
                "pressed",
                "moved",
                "drag_started",
                "drag",
                "moved",
                "drag",
                "released",
                "drag_ended"
            ]
        );
        assert!(other_log.lock().is_empty());

        let log = consumer_log.lock();
        assert_matches!(&log[4], UserEvent::Drag(_, delta, _) if delta.x == 10.0 && delta.y == 0.0);
        assert_matches!(&log[6], UserEvent::Drag(_, delta, _) if delta.x == 5.0 && delta.y == 2.0);
    }

    #[test]
    fn small_movement_keeps_click() {
        let log = Log::default();
        let mut processor = EventProcessor::default();
        processor.add_handler(recorder(&log, EventPropagation::Consume));
        let mut map = map();

        processor.handle_at(RawUserEvent::ButtonPressed(MouseButton::Left), &mut map, at(0));
        processor.handle_at(RawUserEvent::PointerMoved(Point2d::new(1.0, 1.0)), &mut map, at(10));
        processor.handle_at(RawUserEvent::ButtonReleased(MouseButton::Left), &mut map, at(20));

        assert_eq!(names(&log), ["pressed", "moved", "released", "click"]);
    }

    #[test]
    fn stop_breaks_the_chain() {
        let first = Log::default();
        let second = Log::default();
        let mut processor = EventProcessor::default();
        processor.add_handler(recorder(&first, EventPropagation::Stop));
        processor.add_handler(recorder(&second, EventPropagation::Propagate));
        let mut map = map();

        processor.handle(RawUserEvent::Scroll(1.0), &mut map);
        processor.handle(RawUserEvent::Pinch(0.5), &mut map);

        assert_eq!(names(&first), ["scroll", "zoom"]);
        assert!(second.lock().is_empty());
        assert_eq!(processor.handler_count(), 2);
    }
}
