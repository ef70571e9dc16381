//! Integration tests: gestures through the blueprint editor and table canvas.
//!
//! Every scenario mounts a component on a `ManualContainer`, drives it with
//! pointer events, and checks the emitted model values in meters.

use fp_core::{
    EditorConfig, ManualContainer, ScaleEngine, SnapConfig, Table, TableId, TableShape, Wall, Zone, bind,
};
use fp_editor::{BlueprintEditor, InputEvent, LayoutMode, TableCanvas, TableEvent, ViewTransform};
use fp_render::{Geometry, LayerKind, TableStyleInputs};
use kurbo::Point;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn table(id: &str, code: &str, x: f64, y: f64) -> Table {
    Table {
        id: TableId::intern(id),
        code: code.into(),
        x,
        y,
        width: 1.0,
        height: 1.0,
        rotation: 0.0,
        seats: 4,
        shape: TableShape::Rect,
    }
}

/// 10 m × 8 m zone shown in a 1000 px container: 100 px per meter.
fn dining_zone() -> Zone {
    let mut zone = Zone::new("lg-dining", "Dining", 10.0, 8.0);
    zone.tables = vec![
        table("lg-1", "M-01", 1.0, 1.0),
        table("lg-2", "M-02", 5.0, 5.0),
    ];
    zone
}

fn canvas(mode: LayoutMode) -> (TableCanvas, ManualContainer) {
    let container = ManualContainer::new(1000.0);
    let mut canvas = TableCanvas::new(ScaleEngine::new(), mode, EditorConfig::default());
    canvas.mount(&container, dining_zone()).unwrap();
    (canvas, container)
}

fn editor(config: EditorConfig) -> (BlueprintEditor, ManualContainer) {
    let container = ManualContainer::new(1000.0);
    let mut editor = BlueprintEditor::new(ScaleEngine::new(), "lg-bp", 10.0, 10.0, config);
    editor.mount(&container).unwrap();
    (editor, container)
}

fn draw(editor: &mut BlueprintEditor, from: (f64, f64), to: (f64, f64)) -> Option<Wall> {
    editor.handle(&InputEvent::down(from.0, from.1));
    editor.handle(&InputEvent::moved(to.0, to.1));
    editor.handle(&InputEvent::up(to.0, to.1))
}

// ─── Wall drawing ───────────────────────────────────────────────────────

#[test]
fn wall_commit_converts_pixels_to_meters() {
    let (mut editor, _c) = editor(EditorConfig::default());
    let wall = draw(&mut editor, (0.0, 0.0), (100.0, 0.0)).unwrap();
    assert_eq!((wall.x1, wall.y1, wall.x2, wall.y2), (0.0, 0.0, 1.0, 0.0));
    assert_eq!(wall.length, 1.0);
    assert_eq!(wall.angle, 0.0);
    assert_eq!(editor.walls(), &[wall]);
}

#[test]
fn near_vertical_drag_snaps_to_vertical() {
    let config = EditorConfig {
        snap: SnapConfig {
            axis_tolerance_deg: 15.0,
            ..SnapConfig::default()
        },
        ..EditorConfig::default()
    };
    let (mut editor, _c) = editor(config);
    let rad = 91f64.to_radians();
    let end = (200.0 + 300.0 * rad.cos(), 100.0 + 300.0 * rad.sin());
    let wall = draw(&mut editor, (200.0, 100.0), end).unwrap();
    assert_eq!(wall.x2, wall.x1);
    assert!((wall.angle - 90.0).abs() < 1e-9);
}

#[test]
fn short_drag_is_discarded() {
    let (mut editor, _c) = editor(EditorConfig::default());
    assert_eq!(draw(&mut editor, (50.0, 50.0), (53.0, 54.0)), None);
    assert!(editor.walls().is_empty());
    let surface = editor.surface().unwrap();
    assert!(surface.layer(LayerKind::Interactive).is_empty());
    assert!(surface.layer(LayerKind::Walls).is_empty());
}

// ─── Admin table layout ─────────────────────────────────────────────────

#[test]
fn drag_release_snaps_to_tenth_of_meter() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    assert_eq!(canvas.handle(&InputEvent::down(100.0, 100.0)), None);
    canvas.handle(&InputEvent::moved(110.0, 300.0));
    let event = canvas.handle(&InputEvent::up(123.0, 456.0)).unwrap();

    let TableEvent::Updated(moved) = event else {
        panic!("expected an update, got {event:?}");
    };
    assert_eq!((moved.x, moved.y), (1.2, 4.6));
    assert_eq!(moved.code, "M-01");

    // the shape already sits on the snapped position
    let surface = canvas.surface().unwrap();
    assert_eq!(surface.table_at(kurbo::Point::new(120.0, 460.0)), Some(moved.id));
}

#[test]
fn admin_click_selects_without_update() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    canvas.handle(&InputEvent::down(500.0, 500.0));
    let event = canvas.handle(&InputEvent::up(501.0, 500.0));
    assert_eq!(event, Some(TableEvent::Selected(table("lg-2", "M-02", 5.0, 5.0))));
}

#[test]
fn cancelled_drag_restores_shape() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    canvas.handle(&InputEvent::down(100.0, 100.0));
    canvas.handle(&InputEvent::moved(400.0, 400.0));
    assert_eq!(canvas.handle(&InputEvent::PointerCancel), None);
    let surface = canvas.surface().unwrap();
    assert_eq!(surface.table_at(kurbo::Point::new(100.0, 100.0)), Some(TableId::intern("lg-1")));
}

#[test]
fn drop_creates_snapped_table_with_fresh_id() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    let payload = r#"{"shape":"circle","seats":4,"width":1,"height":1}"#;
    let event = canvas.handle_drop(payload, 234.0, 234.0).unwrap().unwrap();

    let TableEvent::Added(created) = event else {
        panic!("expected a new table, got {event:?}");
    };
    assert_eq!((created.x, created.y), (2.3, 2.3));
    assert_eq!(created.shape, TableShape::Circle);
    assert_eq!(created.rotation, 0.0);
    assert_eq!(created.seats, 4);
    let existing = dining_zone();
    assert!(existing.tables.iter().all(|t| t.id != created.id));
}

#[test]
fn drop_accounts_for_pan_and_zoom() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    canvas.set_view(ViewTransform {
        pan_x: 100.0,
        pan_y: 50.0,
        zoom: 2.0,
    });
    let payload = r#"{"shape":"rect","seats":2,"width":1,"height":0.8}"#;
    let event = canvas.handle_drop(payload, 300.0, 250.0).unwrap().unwrap();
    let created = event.table();
    assert_eq!((created.x, created.y), (1.0, 1.0));
}

#[test]
fn drop_is_ignored_in_client_mode_and_rejects_bad_payload() {
    let (mut admin, _c) = canvas(LayoutMode::Admin);
    assert!(admin.handle_drop("{\"shape\":\"hexagon\"}", 10.0, 10.0).is_err());

    let (mut client, _c) = canvas(LayoutMode::Client);
    let payload = r#"{"shape":"rect","seats":2,"width":1,"height":1}"#;
    assert_eq!(client.handle_drop(payload, 10.0, 10.0).unwrap(), None);
}

#[test]
fn rotation_is_normalized() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    let id = TableId::intern("lg-1");
    for _ in 0..8 {
        canvas.rotate_table(id, 45.0);
    }
    let event = canvas.rotate_table(id, 45.0).unwrap();
    assert!((event.table().rotation - 45.0).abs() < 1e-9);
}

#[test]
fn background_drag_pans_view() {
    let (mut canvas, _c) = canvas(LayoutMode::Client);
    canvas.handle(&InputEvent::down(800.0, 700.0));
    canvas.handle(&InputEvent::moved(820.0, 690.0));
    assert_eq!(canvas.handle(&InputEvent::up(820.0, 690.0)), None);
    let view = canvas.view();
    assert_eq!((view.pan_x, view.pan_y), (20.0, -10.0));
}

// ─── Client table layout ────────────────────────────────────────────────

#[test]
fn occupied_wins_over_selected_and_rejects_clicks() {
    let (mut canvas, _c) = canvas(LayoutMode::Client);
    let id = TableId::intern("lg-1");
    canvas.set_occupied([id]);
    canvas.set_selected([id]);

    let shape = &canvas.surface().unwrap().layer(LayerKind::Interactive).shapes()[0];
    let inputs = TableStyleInputs {
        mode: LayoutMode::Client,
        occupied: [id].into_iter().collect(),
        selected: [id].into_iter().collect(),
    };
    assert_eq!(inputs.state_of(id), fp_render::TableState::Occupied);
    assert_eq!(shape.fill, Some(canvas.theme().occupied_fill));

    canvas.handle(&InputEvent::down(100.0, 100.0));
    assert_eq!(canvas.handle(&InputEvent::up(100.0, 100.0)), None);
    assert_eq!(canvas.cursor_at(100.0, 100.0), "not-allowed");
}

#[test]
fn client_click_selects_free_table_without_moving_it() {
    let (mut canvas, _c) = canvas(LayoutMode::Client);
    canvas.handle(&InputEvent::down(500.0, 500.0));
    canvas.handle(&InputEvent::moved(600.0, 600.0));
    assert_eq!(canvas.handle(&InputEvent::up(500.0, 500.0)).map(|e| e.table().code.clone()), Some("M-02".into()));
    assert_eq!(canvas.zone().unwrap().table(TableId::intern("lg-2")).map(|t| t.x), Some(5.0));
}

// ─── Redraw policy ──────────────────────────────────────────────────────

#[test]
fn state_changes_redraw_tables_only() {
    let (mut canvas, _c) = canvas(LayoutMode::Client);
    let surface = canvas.surface().unwrap();
    let grid_draws = surface.layer(LayerKind::Grid).draw_count();
    let wall_draws = surface.layer(LayerKind::Walls).draw_count();
    let table_draws = surface.layer(LayerKind::Interactive).draw_count();

    canvas.set_selected([TableId::intern("lg-2")]);
    canvas.set_mode(LayoutMode::Admin);

    let surface = canvas.surface().unwrap();
    assert_eq!(surface.layer(LayerKind::Grid).draw_count(), grid_draws);
    assert_eq!(surface.layer(LayerKind::Walls).draw_count(), wall_draws);
    assert_eq!(surface.layer(LayerKind::Interactive).draw_count(), table_draws + 2);
}

#[test]
fn new_zone_identity_rebuilds_surface() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    let mut patio = Zone::new("lg-patio", "Patio", 20.0, 5.0);
    patio.tables = vec![table("lg-p1", "M-01", 2.0, 2.0)];
    canvas.set_zone(patio).unwrap();

    let surface = canvas.surface().unwrap();
    assert_eq!(surface.zone_id(), "lg-patio");
    assert_eq!((surface.width(), surface.height()), (1000.0, 250.0));
    assert_eq!(surface.layer(LayerKind::Grid).draw_count(), 1);
}

#[test]
fn same_zone_with_new_dimensions_rescales() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    let mut wider = dining_zone();
    wider.width = 20.0;
    canvas.set_zone(wider).unwrap();

    assert_eq!(canvas.engine().scale_factor(), 50.0);
    assert_eq!(canvas.engine().zone_width(), 20.0);
    let surface = canvas.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (1000.0, 400.0));
    let grid = surface.layer(LayerKind::Grid).shapes();
    assert_eq!(grid[1].geometry, Geometry::Line {
        from: Point::new(50.0, 0.0),
        to: Point::new(50.0, 400.0),
    });
}

#[test]
fn container_resize_rescales_every_layer() {
    let container = ManualContainer::new(1000.0);
    let engine = ScaleEngine::new();
    let canvas = Rc::new(RefCell::new(TableCanvas::new(
        engine.clone(),
        LayoutMode::Admin,
        EditorConfig::default(),
    )));
    let _binding = bind(&engine, &canvas);
    let mut zone = dining_zone();
    zone.walls = vec![Wall::between(fp_core::Point::new(1.0, 2.0), fp_core::Point::new(4.0, 2.0))];
    canvas.borrow_mut().mount(&container, zone).unwrap();

    container.resize(500.0);

    let canvas = canvas.borrow();
    assert_eq!(canvas.engine().scale_factor(), 50.0);
    let surface = canvas.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (500.0, 400.0));

    let grid = surface.layer(LayerKind::Grid).shapes();
    assert_eq!(grid[1].geometry, Geometry::Line {
        from: Point::new(50.0, 0.0),
        to: Point::new(50.0, 400.0),
    });

    let walls = surface.layer(LayerKind::Walls).shapes();
    assert_eq!(walls[0].geometry, Geometry::Line {
        from: Point::new(50.0, 100.0),
        to: Point::new(200.0, 100.0),
    });

    let table = surface
        .layer(LayerKind::Interactive)
        .shapes()
        .iter()
        .find(|s| s.table == Some(TableId::intern("lg-2")))
        .unwrap();
    let Geometry::Rect { center, width, .. } = table.geometry else {
        panic!("expected a rect table");
    };
    assert_eq!((center, width), (Point::new(250.0, 250.0), 50.0));
}

#[test]
fn repeated_resize_to_same_width_does_not_redraw() {
    let container = ManualContainer::new(1000.0);
    let engine = ScaleEngine::new();
    let canvas = Rc::new(RefCell::new(TableCanvas::new(
        engine.clone(),
        LayoutMode::Client,
        EditorConfig::default(),
    )));
    let _binding = bind(&engine, &canvas);
    canvas.borrow_mut().mount(&container, dining_zone()).unwrap();

    container.resize(800.0);
    let after_first = canvas.borrow().redraw_count();
    container.resize(800.0);
    assert_eq!(canvas.borrow().redraw_count(), after_first);

    let surface_width = canvas.borrow().surface().map(|s| s.width());
    assert_eq!(surface_width, Some(800.0));
}

#[test]
fn dispose_releases_surface() {
    let (mut canvas, _c) = canvas(LayoutMode::Admin);
    canvas.dispose();
    assert!(!canvas.is_mounted());
    assert_eq!(canvas.handle(&InputEvent::down(100.0, 100.0)), None);
}
