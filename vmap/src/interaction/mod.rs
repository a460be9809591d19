//! Interactions of the user with map features: selection, drawing, editing and measuring.
//!
//! At most one interaction of [`InteractionKind`] is active at a time. While no drawing or
//! measuring is in progress, clicking the map selects the top-most feature under the pointer.
//! Drawn and measured geometries are collected in an overlay layer that is not a part of the
//! map layer list.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use vmap_types::cartesian::{Point2d, Vector2};
use vmap_types::geometry::{Geom, GeometryType};

use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::error::VmapError;
use crate::events::{SelectFilter, SelectedFeature};
use crate::layer::{Feature, VectorLayer, VectorSource};
use crate::map::Map;
use crate::style::FeatureStyle;

mod draw;
mod measure;
mod modify;
mod select;
mod snap;

use draw::{Sketch, SketchUpdate};
pub use measure::{format_area, format_length, Tooltip};
use measure::Measure;
use modify::EditDrag;
use select::Select;
pub use select::HIT_TOLERANCE_PX;
use snap::Snap;
pub use snap::SNAP_TOLERANCE_PX;

/// Interaction that can be activated with [`Interactions::set_active`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Draw points.
    Point,
    /// Draw line strings.
    LineString,
    /// Draw polygons.
    Polygon,
    /// Drag vertices of the selected features.
    Modify,
    /// Drag the selected features.
    Translate,
    /// Measure length of a drawn line.
    MeasureDistance,
    /// Measure area of a drawn polygon.
    MeasureArea,
}

impl InteractionKind {
    /// All the interaction kinds.
    pub const ALL: [InteractionKind; 7] = [
        InteractionKind::Point,
        InteractionKind::LineString,
        InteractionKind::Polygon,
        InteractionKind::Modify,
        InteractionKind::Translate,
        InteractionKind::MeasureDistance,
        InteractionKind::MeasureArea,
    ];

    /// Name of the interaction, as accepted by [`InteractionKind::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            InteractionKind::Point => "Point",
            InteractionKind::LineString => "LineString",
            InteractionKind::Polygon => "Polygon",
            InteractionKind::Modify => "Modify",
            InteractionKind::Translate => "Translate",
            InteractionKind::MeasureDistance => "MeasureDistance",
            InteractionKind::MeasureArea => "MeasureArea",
        }
    }

    /// Type of the geometry drawn by the interaction, if it draws anything.
    pub fn sketch_type(&self) -> Option<GeometryType> {
        match self {
            InteractionKind::Point => Some(GeometryType::Point),
            InteractionKind::LineString | InteractionKind::MeasureDistance => {
                Some(GeometryType::LineString)
            }
            InteractionKind::Polygon | InteractionKind::MeasureArea => Some(GeometryType::Polygon),
            InteractionKind::Modify | InteractionKind::Translate => None,
        }
    }

    /// Returns true for the measure interactions.
    pub fn is_measure(&self) -> bool {
        matches!(
            self,
            InteractionKind::MeasureDistance | InteractionKind::MeasureArea
        )
    }
}

impl Display for InteractionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InteractionKind {
    type Err = VmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| VmapError::Config(format!("unknown interaction type: {s}")))
    }
}

/// State of the map interactions.
pub struct Interactions {
    active: Option<InteractionKind>,
    select: Select,
    sketch: Option<Sketch>,
    snap: Snap,
    measure: Measure,
    overlay: VectorLayer,
    edit_drag: Option<EditDrag>,
}

impl Interactions {
    pub(crate) fn new(
        select_filter: Arc<RwLock<Option<SelectFilter>>>,
        draw_style: impl Into<FeatureStyle>,
    ) -> Self {
        Self {
            active: None,
            select: Select::new(select_filter),
            sketch: None,
            snap: Snap::default(),
            measure: Measure::default(),
            overlay: VectorLayer::new(VectorSource::new(), draw_style),
            edit_drag: None,
        }
    }

    /// Activates the interaction of the given kind and deactivates all the others. With `None`
    /// only the selection stays active. `snapped` turns snapping to the overlay features on or
    /// off.
    ///
    /// An unfinished sketch is discarded.
    pub fn set_active(&mut self, kind: Option<InteractionKind>, snapped: bool) {
        log::debug!("Active interaction: {kind:?}, snapping: {snapped}");

        self.active = kind;
        self.sketch = kind.and_then(|k| k.sketch_type()).map(Sketch::new);
        self.edit_drag = None;
        self.snap.set_enabled(snapped);
        self.measure.cancel();
    }

    /// Currently active interaction.
    pub fn active(&self) -> Option<InteractionKind> {
        self.active
    }

    /// Returns true if drawn vertices snap to the overlay features.
    pub fn is_snapping(&self) -> bool {
        self.snap.is_enabled()
    }

    /// Currently selected features.
    pub fn selection(&self) -> &[SelectedFeature] {
        self.select.selected()
    }

    pub(crate) fn clear_selection(&mut self, map: &mut Map) -> bool {
        self.select.clear(map)
    }

    /// Layer with the drawn and measured features.
    pub fn overlay(&self) -> &VectorLayer {
        &self.overlay
    }

    /// Drawn and measured features.
    pub fn overlay_features(&self) -> &[Feature] {
        self.overlay.source().features()
    }

    /// Removes the drawn features and the finished measurement tooltips.
    pub fn clear_overlay(&mut self) {
        self.overlay.source_mut().clear();
        self.measure.clear();
    }

    /// Vertices of the geometry being drawn.
    pub fn sketch_points(&self) -> &[Point2d] {
        self.sketch.as_ref().map(Sketch::points).unwrap_or_default()
    }

    /// Tooltip of the measurement in progress. `None` if no measure interaction is active.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.is_measuring().then(|| self.measure.tooltip())
    }

    /// Tooltips of the finished measurements.
    pub fn static_tooltips(&self) -> &[Tooltip] {
        self.measure.finished()
    }

    fn is_measuring(&self) -> bool {
        self.active.is_some_and(|kind| kind.is_measure())
    }

    pub(crate) fn handle(&mut self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::Click(MouseButton::Left, e) => self.on_click(e.screen_pointer_position, map),
            UserEvent::DoubleClick(MouseButton::Left, e) if self.sketch.is_some() => {
                self.finish_sketch(e.screen_pointer_position, map);
                EventPropagation::Stop
            }
            UserEvent::PointerMoved(e) => {
                if !e.buttons.any_pressed() {
                    self.on_pointer_moved(e.screen_pointer_position, map);
                }
                EventPropagation::Propagate
            }
            UserEvent::DragStarted(MouseButton::Left, e) => {
                self.start_edit(e.screen_pointer_position, map)
            }
            UserEvent::Drag(MouseButton::Left, delta, e) => {
                self.on_drag(*delta, e.screen_pointer_position, map)
            }
            UserEvent::DragEnded(..) => match self.edit_drag.take() {
                Some(drag) => {
                    log::debug!("Finished editing: {drag:?}");
                    EventPropagation::Stop
                }
                None => EventPropagation::Propagate,
            },
            _ => EventPropagation::Propagate,
        }
    }

    fn on_click(&mut self, pixel: Point2d, map: &mut Map) -> EventPropagation {
        let view = *map.view();
        let Some(sketch) = &mut self.sketch else {
            self.select.click(map, pixel);
            return EventPropagation::Propagate;
        };

        let point = self.snap.snap(
            view.screen_to_map(pixel),
            &view,
            self.overlay.source().features(),
        );

        match sketch.add_point(point, &view) {
            SketchUpdate::Added => {
                if self.active.is_some_and(|kind| kind.is_measure()) {
                    if let Some(geometry) = sketch.geometry_with(point) {
                        self.measure.update(&geometry, point);
                    }
                }
            }
            SketchUpdate::Ignored => {}
            SketchUpdate::Finished(geometry) => self.complete(geometry, point, map),
        }

        EventPropagation::Stop
    }

    fn finish_sketch(&mut self, pixel: Point2d, map: &mut Map) {
        let Some(sketch) = &mut self.sketch else {
            return;
        };

        if !sketch.can_finish() {
            return;
        }

        if let Some(geometry) = sketch.finish() {
            let pointer = map.view().screen_to_map(pixel);
            self.complete(geometry, pointer, map);
        }
    }

    fn complete(&mut self, geometry: Geom, pointer: Point2d, map: &mut Map) {
        log::debug!("Finished drawing {:?}", geometry.geometry_type());

        if self.is_measuring() {
            self.measure.update(&geometry, pointer);
            self.measure.finish();
        }

        self.overlay.source_mut().add_feature(Feature::new(geometry));
        map.redraw();
    }

    fn on_pointer_moved(&mut self, pixel: Point2d, map: &Map) {
        if !self.is_measuring() {
            return;
        }

        let pointer = map.view().screen_to_map(pixel);
        if let Some(geometry) = self.sketch.as_ref().and_then(|s| s.geometry_with(pointer)) {
            self.measure.update(&geometry, pointer);
        }
    }

    fn start_edit(&mut self, pixel: Point2d, map: &Map) -> EventPropagation {
        let view = map.view();
        let point = view.screen_to_map(pixel);
        let selected = self.select.selected();

        let drag = match self.active {
            Some(InteractionKind::Modify) => {
                let tolerance = SNAP_TOLERANCE_PX * view.resolution();
                modify::find_vertex(selected, &point, tolerance).map(
                    |(selection_index, vertex_index)| EditDrag::Vertex {
                        selection_index,
                        vertex_index,
                    },
                )
            }
            Some(InteractionKind::Translate) => {
                let tolerance = HIT_TOLERANCE_PX * view.resolution();
                modify::find_feature(selected, &point, tolerance).map(|_| EditDrag::Translate)
            }
            _ => None,
        };

        match drag {
            Some(drag) => {
                log::debug!("Started editing: {drag:?}");
                self.edit_drag = Some(drag);
                EventPropagation::Consume
            }
            None => EventPropagation::Propagate,
        }
    }

    fn on_drag(&mut self, delta: Vector2<f64>, pixel: Point2d, map: &mut Map) -> EventPropagation {
        let Some(drag) = self.edit_drag else {
            return EventPropagation::Propagate;
        };

        let view = *map.view();
        match drag {
            EditDrag::Vertex {
                selection_index,
                vertex_index,
            } => {
                let point = self.snap.snap(
                    view.screen_to_map(pixel),
                    &view,
                    self.overlay.source().features(),
                );
                if let Some(selected) = self.select.selected_mut().get_mut(selection_index) {
                    modify::move_vertex(map, selected, vertex_index, point);
                }
            }
            EditDrag::Translate => {
                let from = view.screen_to_map(pixel - delta);
                let to = view.screen_to_map(pixel);
                modify::translate(map, self.select.selected_mut(), to.x - from.x, to.y - from.y);
            }
        }

        EventPropagation::Consume
    }
}

/// Passes user input to the shared [`Interactions`].
pub(crate) struct InteractionHandler(pub(crate) Arc<RwLock<Interactions>>);

impl UserEventHandler for InteractionHandler {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self.0.write().handle(event, map)
    }
}
