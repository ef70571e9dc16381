//! Table layout canvas: renders a zone's tables and turns pointer gestures
//! into table events for the host.
//!
//! In [`LayoutMode::Admin`] tables drag (snapping to the grid on release),
//! clicks select, and furniture dropped from an outside palette becomes a
//! new table. In [`LayoutMode::Client`] tables are read-only; clicking a
//! table that is not occupied selects it. Dragging the background pans the
//! view in both modes.
//!
//! A change of zone identity rebuilds the surface. Mode, occupied-set and
//! selected-set changes redraw the tables layer only.

use crate::input::InputEvent;
use fp_core::{
    ContainerGeometry, EditorConfig, FurnitureDescriptor, ModelError, ScaleAware, ScaleEngine, Table,
    TableId, Zone, snap_to_grid,
};
use fp_render::build::walls_layer;
use fp_render::hit::contains;
use fp_render::tables::table_shapes;
use fp_render::{CanvasTheme, LayerKind, LayoutMode, Surface, SurfaceError, TableStyleInputs};
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the canvas reports back to its host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "table", rename_all = "camelCase")]
pub enum TableEvent {
    /// A table created by a palette drop. Carries a fresh id and the
    /// placeholder code; the host assigns the real code.
    Added(Table),
    /// A table moved or rotated; position already snapped.
    Updated(Table),
    Selected(Table),
}

impl TableEvent {
    pub fn table(&self) -> &Table {
        match self {
            TableEvent::Added(t) | TableEvent::Updated(t) | TableEvent::Selected(t) => t,
        }
    }
}

// ─── View transform ──────────────────────────────────────────────────────

/// Pan and zoom applied on top of the surface, screen = surface × zoom + pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    fn zoom_or_one(&self) -> f64 {
        if self.zoom > 0.0 { self.zoom } else { 1.0 }
    }

    /// Canvas-element pixels → surface pixels.
    pub fn to_surface(&self, screen: Point) -> Point {
        let zoom = self.zoom_or_one();
        Point::new((screen.x - self.pan_x) / zoom, (screen.y - self.pan_y) / zoom)
    }

    /// Surface pixels → canvas-element pixels.
    pub fn to_screen(&self, surface: Point) -> Point {
        let zoom = self.zoom_or_one();
        Point::new(surface.x * zoom + self.pan_x, surface.y * zoom + self.pan_y)
    }

    pub fn affine(&self) -> Affine {
        Affine::translate((self.pan_x, self.pan_y)) * Affine::scale(self.zoom_or_one())
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Pointer went down on a table. `grab` is the table center minus the
    /// pointer, in surface pixels.
    Table {
        id: TableId,
        down: Point,
        grab: Vec2,
        moved: bool,
    },
    Pan {
        last: Point,
    },
}

pub struct TableCanvas {
    engine: ScaleEngine,
    zone: Option<Zone>,
    surface: Option<Surface>,
    inputs: TableStyleInputs,
    view: ViewTransform,
    gesture: Gesture,
    theme: CanvasTheme,
    config: EditorConfig,
    drawn_revision: u64,
    redraws: u64,
}

impl TableCanvas {
    pub fn new(engine: ScaleEngine, mode: LayoutMode, config: EditorConfig) -> Self {
        Self {
            engine,
            zone: None,
            surface: None,
            inputs: TableStyleInputs {
                mode,
                ..Default::default()
            },
            view: ViewTransform::default(),
            gesture: Gesture::Idle,
            theme: CanvasTheme::light(),
            config,
            drawn_revision: 0,
            redraws: 0,
        }
    }

    pub fn with_theme(mut self, theme: CanvasTheme) -> Self {
        self.theme = theme;
        self
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Bind the scale engine to `container`, then build the surface for `zone`.
    pub fn mount(&mut self, container: &dyn ContainerGeometry, zone: Zone) -> Result<(), SurfaceError> {
        self.engine.initialize(container, &zone);
        self.zone = Some(zone);
        self.rebuild()
    }

    /// Supply zone data. A different zone id tears the surface down and
    /// builds a new one; the same id only redraws what changed. New
    /// dimensions on the same zone rescale and redraw every layer.
    pub fn set_zone(&mut self, zone: Zone) -> Result<(), SurfaceError> {
        let same_zone = self.zone.as_ref().is_some_and(|z| z.id == zone.id);
        if same_zone && self.surface.is_some() {
            let (walls_changed, resized) = self.zone.as_ref().map_or((false, false), |z| {
                (z.walls != zone.walls, z.width != zone.width || z.height != zone.height)
            });
            let width = zone.width;
            self.zone = Some(zone);
            self.gesture = Gesture::Idle;
            if resized {
                self.engine.set_zone_width(width);
                self.redraw();
                return Ok(());
            }
            if walls_changed {
                self.redraw_walls();
            }
            self.redraw_tables();
            return Ok(());
        }
        let width = zone.width;
        self.zone = Some(zone);
        self.engine.set_zone_width(width);
        self.rebuild()
    }

    /// Destroy the current surface (if any) and create a fresh one.
    pub fn rebuild(&mut self) -> Result<(), SurfaceError> {
        if let Some(old) = self.surface.take() {
            old.dispose();
        }
        self.gesture = Gesture::Idle;
        let zone = self.zone.as_ref().ok_or(SurfaceError::Disposed)?;
        self.surface = Some(Surface::create(zone, &self.engine)?);
        self.redraw();
        Ok(())
    }

    /// Release the surface and every shape on it.
    pub fn dispose(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.dispose();
        }
        self.gesture = Gesture::Idle;
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Resize to the current stage dimensions and redraw grid, walls and
    /// tables, in that order.
    pub fn redraw(&mut self) {
        let (Some(surface), Some(zone)) = (self.surface.as_mut(), self.zone.as_ref()) else {
            return;
        };
        surface.resize(self.engine.stage_dimensions(zone.height));
        surface.draw_grid(self.engine.scale_factor(), &self.theme);
        self.redraw_walls();
        self.redraw_tables();
        self.drawn_revision = self.engine.revision();
        self.redraws += 1;
    }

    /// Redraw if the scale changed since the last paint.
    pub fn sync_scale(&mut self) {
        if self.drawn_revision != self.engine.revision() {
            self.redraw();
        }
    }

    fn redraw_walls(&mut self) {
        let scale = self.engine.scale_factor();
        if let (Some(surface), Some(zone)) = (self.surface.as_mut(), self.zone.as_ref()) {
            surface
                .layer_mut(LayerKind::Walls)
                .replace(walls_layer(&zone.walls, scale, &self.theme));
        }
    }

    fn redraw_tables(&mut self) {
        let scale = self.engine.scale_factor();
        if let (Some(surface), Some(zone)) = (self.surface.as_mut(), self.zone.as_ref()) {
            surface
                .layer_mut(LayerKind::Interactive)
                .replace(table_shapes(&zone.tables, &self.inputs, scale, &self.theme));
        }
    }

    /// Number of full redraws so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    // ─── Render inputs ───────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: LayoutMode) {
        if self.inputs.mode != mode {
            self.inputs.mode = mode;
            self.gesture = Gesture::Idle;
            self.redraw_tables();
        }
    }

    pub fn set_occupied(&mut self, ids: impl IntoIterator<Item = TableId>) {
        self.inputs.occupied = ids.into_iter().collect();
        self.redraw_tables();
    }

    pub fn set_selected(&mut self, ids: impl IntoIterator<Item = TableId>) {
        self.inputs.selected = ids.into_iter().collect();
        self.redraw_tables();
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Feed one pointer event (canvas-element pixels).
    pub fn handle(&mut self, event: &InputEvent) -> Option<TableEvent> {
        self.sync_scale();
        if !event.is_primary() {
            return None;
        }
        let tolerance = self.config.snap.click_tolerance_px;

        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                let screen = Point::new(x, y);
                let local = self.view.to_surface(screen);
                let hit = self.surface.as_ref()?.table_at(local);
                self.gesture = match hit.and_then(|id| Some((id, self.table_center_px(id)?))) {
                    Some((id, center)) => Gesture::Table {
                        id,
                        down: screen,
                        grab: center - local,
                        moved: false,
                    },
                    None => Gesture::Pan { last: screen },
                };
                None
            }
            InputEvent::PointerMove { x, y, .. } => {
                let screen = Point::new(x, y);
                match self.gesture {
                    Gesture::Table {
                        id,
                        down,
                        grab,
                        moved,
                    } if self.inputs.mode == LayoutMode::Admin => {
                        if !moved && screen.distance(down) <= tolerance {
                            return None;
                        }
                        self.gesture = Gesture::Table {
                            id,
                            down,
                            grab,
                            moved: true,
                        };
                        self.place_shape(id, self.view.to_surface(screen) + grab);
                    }
                    Gesture::Pan { last } => {
                        self.view.pan_x += screen.x - last.x;
                        self.view.pan_y += screen.y - last.y;
                        self.gesture = Gesture::Pan { last: screen };
                    }
                    Gesture::Table { .. } | Gesture::Idle => {}
                }
                None
            }
            InputEvent::PointerUp { x, y, .. } => {
                let screen = Point::new(x, y);
                match std::mem::take(&mut self.gesture) {
                    Gesture::Table { id, grab, moved: true, .. } if self.inputs.mode == LayoutMode::Admin => {
                        self.finish_drag(id, self.view.to_surface(screen) + grab)
                    }
                    Gesture::Table { id, down, .. } if screen.distance(down) <= tolerance => self.select(id),
                    _ => None,
                }
            }
            InputEvent::PointerCancel => {
                if let Gesture::Table { moved: true, .. } = std::mem::take(&mut self.gesture) {
                    self.redraw_tables();
                }
                None
            }
        }
    }

    /// Place a table from a palette drop at canvas-element position `(x, y)`.
    ///
    /// Ignored outside admin mode. Fails only on a malformed payload.
    pub fn handle_drop(&mut self, payload: &str, x: f64, y: f64) -> Result<Option<TableEvent>, ModelError> {
        if self.inputs.mode != LayoutMode::Admin {
            return Ok(None);
        }
        let descriptor = FurnitureDescriptor::from_json(payload)?;
        let local = self.view.to_surface(Point::new(x, y));
        let (mx, my) = self.snapped_meters(local);

        let Some(zone) = self.zone.as_mut() else {
            return Ok(None);
        };
        let mut table = descriptor.place_at(mx, my);
        while zone.table(table.id).is_some() {
            table.id = TableId::generate();
        }
        zone.tables.push(table.clone());
        log::debug!("table dropped at ({mx:.1}, {my:.1}) m as {:?}", table.id);
        self.redraw_tables();
        Ok(Some(TableEvent::Added(table)))
    }

    /// Rotate a table by `delta_deg` (admin only).
    pub fn rotate_table(&mut self, id: TableId, delta_deg: f64) -> Option<TableEvent> {
        if self.inputs.mode != LayoutMode::Admin {
            return None;
        }
        let table = self.zone.as_mut()?.tables.iter_mut().find(|t| t.id == id)?;
        *table = table.rotated_by(delta_deg);
        let updated = table.clone();
        self.redraw_tables();
        Some(TableEvent::Updated(updated))
    }

    /// CSS cursor for a canvas-element position.
    pub fn cursor_at(&self, x: f64, y: f64) -> &'static str {
        let local = self.view.to_surface(Point::new(x, y));
        let Some(surface) = self.surface.as_ref() else {
            return "default";
        };
        let shapes = surface.layer(LayerKind::Interactive).shapes();
        match shapes.iter().rev().find(|s| s.table.is_some() && contains(s, local)) {
            Some(shape) if !shape.listening => "not-allowed",
            Some(shape) if shape.draggable => "move",
            Some(_) => "pointer",
            None => "grab",
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn table_center_px(&self, id: TableId) -> Option<Point> {
        let table = self.zone.as_ref()?.table(id)?;
        Some(Point::new(
            self.engine.meters_to_pixels(table.x),
            self.engine.meters_to_pixels(table.y),
        ))
    }

    fn snapped_meters(&self, local: Point) -> (f64, f64) {
        let step = self.config.snap.grid_step_m;
        (
            snap_to_grid(self.engine.pixels_to_meters(local.x), step),
            snap_to_grid(self.engine.pixels_to_meters(local.y), step),
        )
    }

    /// Move a table's shape so its center sits at `center` (surface pixels).
    fn place_shape(&mut self, id: TableId, center: Point) {
        if let Some(shape) = self
            .surface
            .as_mut()
            .and_then(|s| s.layer_mut(LayerKind::Interactive).table_shape_mut(id))
        {
            let delta = center - shape.geometry.origin();
            shape.geometry.translate(delta);
        }
    }

    fn finish_drag(&mut self, id: TableId, center: Point) -> Option<TableEvent> {
        let (mx, my) = self.snapped_meters(center);
        let snapped = Point::new(self.engine.meters_to_pixels(mx), self.engine.meters_to_pixels(my));
        self.place_shape(id, snapped);

        let table = self.zone.as_mut()?.tables.iter_mut().find(|t| t.id == id)?;
        *table = table.with_position(mx, my);
        log::debug!("table {id:?} moved to ({mx:.1}, {my:.1}) m");
        Some(TableEvent::Updated(table.clone()))
    }

    fn select(&self, id: TableId) -> Option<TableEvent> {
        if self.inputs.mode == LayoutMode::Client && self.inputs.occupied.contains(&id) {
            return None;
        }
        let table = self.zone.as_ref()?.table(id)?;
        Some(TableEvent::Selected(table.clone()))
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn mode(&self) -> LayoutMode {
        self.inputs.mode
    }

    pub fn occupied(&self) -> &HashSet<TableId> {
        &self.inputs.occupied
    }

    pub fn selected(&self) -> &HashSet<TableId> {
        &self.inputs.selected
    }

    pub fn engine(&self) -> &ScaleEngine {
        &self.engine
    }

    pub fn theme(&self) -> &CanvasTheme {
        &self.theme
    }
}

impl ScaleAware for TableCanvas {
    fn on_scale_changed(&mut self, _engine: &ScaleEngine) {
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_round_trips() {
        let view = ViewTransform {
            pan_x: 40.0,
            pan_y: -20.0,
            zoom: 2.0,
        };
        let p = Point::new(130.0, 80.0);
        assert_eq!(view.to_screen(view.to_surface(p)), p);
        assert_eq!(view.to_surface(p), Point::new(45.0, 50.0));
        assert_eq!(view.affine() * Point::new(45.0, 50.0), p);
    }

    #[test]
    fn zero_zoom_acts_as_identity_scale() {
        let view = ViewTransform {
            zoom: 0.0,
            ..Default::default()
        };
        assert_eq!(view.to_surface(Point::new(10.0, 10.0)), Point::new(10.0, 10.0));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let table = FurnitureDescriptor::from_json(r#"{"shape":"rect","seats":2,"width":1,"height":1}"#)
            .unwrap()
            .place_at(1.0, 2.0);
        let json = serde_json::to_value(TableEvent::Added(table)).unwrap();
        assert_eq!(json["type"], "added");
        assert_eq!(json["table"]["code"], "NEW");
    }
}
