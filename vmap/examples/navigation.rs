//! This example drives a map with synthetic user input: it pans, zooms and walks through the
//! navigation history, draws a line with the distance measurement and prints what the map
//! reports.
//!
//! Run with `RUST_LOG=debug` to see the state transitions.

use std::time::Duration;

use vmap::background::Backgrounds;
use vmap::config::MapConfig;
use vmap::control::{Key, MouseButton, RawUserEvent};
use vmap::events::{EventKind, MapEvent};
use vmap::interaction::InteractionKind;
use vmap::style::StylePresets;
use vmap::vmap_types::cartesian::{Point2d, Size};
use vmap::vmap_types::geo::Crs;
use vmap::VMap;
use web_time::SystemTime;

const CONFIG: &str = r#"{
    "center": [8.4037, 49.0069],
    "zoom": 12,
    "minZoom": 3,
    "maxZoom": 19,
    "scaleLine": true,
    "mousePosition": true
}"#;

fn main() {
    env_logger::init();

    let config = MapConfig::from_json(CONFIG).expect("valid configuration");
    let mut vmap = VMap::new(config, Backgrounds::default(), StylePresets::default())
        .expect("failed to create the map");
    vmap.update_size(Size::new(1024.0, 768.0));

    vmap.events_mut().on(EventKind::MapMoveEnd, |event| {
        if let MapEvent::MapMoveEnd(state) = event {
            println!("Move end: center {:?}, zoom {:.2}", state.center, state.zoom);
        }
    });
    vmap.events_mut().on(EventKind::MapClick, |event| {
        if let MapEvent::MapClick(info) = event {
            println!("Click at {:?}", info.coordinate);
        }
    });

    let mut input = Input::new();

    // Pan by dragging 200 pixels to the left.
    input.drag(&mut vmap, Point2d::new(512.0, 384.0), Point2d::new(312.0, 384.0));
    // Zoom in with the keyboard, and out with the mouse wheel.
    input.send(&mut vmap, RawUserEvent::KeyPressed(Key::Plus));
    input.send(&mut vmap, RawUserEvent::Scroll(-1.0));

    print_position(&mut vmap);

    while vmap.views().rewind_view().is_some() {
        print!("Rewind -> ");
        print_position(&mut vmap);
    }
    while vmap.views().forward_view().is_some() {
        print!("Forward -> ");
        print_position(&mut vmap);
    }

    vmap.set_active_interaction(Some(InteractionKind::MeasureDistance), true);
    input.click(&mut vmap, Point2d::new(100.0, 100.0));
    input.click(&mut vmap, Point2d::new(600.0, 100.0));
    input.double_click(&mut vmap, Point2d::new(600.0, 500.0));

    for tooltip in vmap.interactions().static_tooltips() {
        println!("Measured: {}", tooltip.text);
    }

    let view = vmap.views().get_view();
    if let Some(scale) = vmap.controls().scale_line() {
        println!("Scale: {}", scale.render(&view).text);
    }

    let extent = vmap
        .views()
        .get_extent(Some(Crs::EPSG505456.code()))
        .expect("extent in PTV Mercator");
    println!("Visible extent in EPSG:505456: {extent:?}");
}

fn print_position(vmap: &mut VMap) {
    let center = vmap.views().get_center();
    let zoom = vmap.views().get_zoom();
    let text = vmap
        .controls()
        .mouse_position()
        .and_then(|control| control.format(&center));
    println!("center {}, zoom {zoom:.2}", text.unwrap_or_default());
}

/// Produces raw input events with increasing timestamps.
struct Input {
    now: SystemTime,
}

impl Input {
    fn new() -> Self {
        Self {
            now: SystemTime::now(),
        }
    }

    fn send(&mut self, vmap: &mut VMap, event: RawUserEvent) {
        self.now += Duration::from_millis(10);
        vmap.handle_event_at(event, self.now);
    }

    fn click(&mut self, vmap: &mut VMap, position: Point2d) {
        self.send(vmap, RawUserEvent::PointerMoved(position));
        self.send(vmap, RawUserEvent::ButtonPressed(MouseButton::Left));
        self.send(vmap, RawUserEvent::ButtonReleased(MouseButton::Left));
        self.now += Duration::from_secs(1);
    }

    fn double_click(&mut self, vmap: &mut VMap, position: Point2d) {
        self.send(vmap, RawUserEvent::PointerMoved(position));
        for _ in 0..2 {
            self.send(vmap, RawUserEvent::ButtonPressed(MouseButton::Left));
            self.send(vmap, RawUserEvent::ButtonReleased(MouseButton::Left));
        }
    }

    fn drag(&mut self, vmap: &mut VMap, from: Point2d, to: Point2d) {
        self.send(vmap, RawUserEvent::PointerMoved(from));
        self.send(vmap, RawUserEvent::ButtonPressed(MouseButton::Left));
        for step in 1..=10 {
            let position = from + (to - from) * (step as f64 / 10.0);
            self.send(vmap, RawUserEvent::PointerMoved(position));
        }
        self.send(vmap, RawUserEvent::ButtonReleased(MouseButton::Left));
    }
}
