use crate::control::{EventPropagation, MouseButton, MouseEvent, UserEvent, UserEventHandler};
use crate::events::{MapEvent, PointerInfo};
use crate::map::Map;

/// Queues pointer moves and clicks as map events. The events are always propagated to the
/// next handler.
#[derive(Debug, Default, Copy, Clone)]
pub struct NotificationHandler;

impl UserEventHandler for NotificationHandler {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::PointerMoved(e) => {
                let info = pointer_info(map, e);
                map.notify(MapEvent::MouseMove(info));
            }
            UserEvent::Click(MouseButton::Left, e) => {
                let info = pointer_info(map, e);
                map.notify(MapEvent::MapClick(info));
            }
            _ => {}
        }

        EventPropagation::Propagate
    }
}

pub(crate) fn pointer_info(map: &Map, event: &MouseEvent) -> PointerInfo {
    PointerInfo {
        pixel: event.screen_pointer_position,
        coordinate: map.view().screen_to_map(event.screen_pointer_position),
        dragging: event.buttons.any_pressed(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vmap_types::cartesian::{Point2d, Size};

    use super::*;
    use crate::control::{MouseButtonState, MouseButtonsState};
    use crate::view::{zoom_for_resolution, MapView};

    #[test]
    fn pointer_events_are_queued() {
        let mut map = Map::new(
            MapView::new(Point2d::new(0.0, 0.0), zoom_for_resolution(1.0))
                .with_size(Size::new(100.0, 100.0)),
            vec![],
            None,
        );

        let mut buttons = MouseButtonsState::default();
        let moved = MouseEvent {
            screen_pointer_position: Point2d::new(60.0, 40.0),
            buttons,
        };
        let result = NotificationHandler.handle(&UserEvent::PointerMoved(moved.clone()), &mut map);
        assert_eq!(result, EventPropagation::Propagate);

        buttons.left = MouseButtonState::Pressed;
        let dragged = MouseEvent {
            screen_pointer_position: Point2d::new(60.0, 40.0),
            buttons,
        };
        NotificationHandler.handle(&UserEvent::PointerMoved(dragged), &mut map);
        NotificationHandler.handle(&UserEvent::Click(MouseButton::Right, moved.clone()), &mut map);
        NotificationHandler.handle(&UserEvent::Click(MouseButton::Left, moved), &mut map);

        let events = map.take_events();
        assert_eq!(events.len(), 3);
        assert_matches!(
            &events[0],
            MapEvent::MouseMove(info)
                if !info.dragging && (info.coordinate - Point2d::new(10.0, 10.0)).norm() < 1e-9
        );
        assert_matches!(&events[1], MapEvent::MouseMove(info) if info.dragging);
        assert_matches!(&events[2], MapEvent::MapClick(info) if info.pixel == Point2d::new(60.0, 40.0));
    }
}
