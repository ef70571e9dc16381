//! Drive the floor-plan components without a browser.
//!
//! Builds a 10 m × 10 m zone with three tables, drags one, drops a new one,
//! draws a wall in the blueprint editor and writes the JPEG preview to
//! `floor-plan-preview.jpg`.
//!
//! ```text
//! RUST_LOG=debug cargo run -p fp-editor --example playground
//! ```

use base64::Engine as _;
use fp_core::{
    BlueprintDraft, BlueprintProvider, EditorConfig, InMemoryBackend, ManualContainer, ScaleEngine, Table,
    TableId, TableShape, Zone, ZoneProvider,
};
use fp_editor::{BlueprintEditor, InputEvent, LayoutMode, LayoutSession, TableCanvas};
use std::error::Error;

fn table(id: &str, code: &str, x: f64, y: f64, shape: TableShape, seats: u32) -> Table {
    Table {
        id: TableId::intern(id),
        code: code.into(),
        x,
        y,
        width: 1.2,
        height: 0.8,
        rotation: 0.0,
        seats,
        shape,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let backend = InMemoryBackend::new("playground");
    let mut zone = Zone::new("zone-main", "Main Hall", 10.0, 10.0);
    zone.tables = vec![
        table("t-1", "M-01", 2.0, 2.0, TableShape::Rect, 4),
        table("t-2", "M-02", 5.0, 2.0, TableShape::Circle, 2),
        table("t-3", "M-03", 8.0, 6.0, TableShape::Rect, 6),
    ];
    backend.insert_zone("branch-1", zone);

    // ─── Furniture editor ────────────────────────────────────────────────
    let container = ManualContainer::new(800.0);
    let config = EditorConfig::default();
    let mut session = LayoutSession::open(&backend, "zone-main", config.code_prefix.clone())?;
    let mut canvas = TableCanvas::new(ScaleEngine::new(), LayoutMode::Admin, config.clone());
    canvas.mount(&container, session.zone().clone())?;

    // 80 px per meter: drag M-01 from (2, 2) m to roughly (3.27, 4.11) m
    canvas.handle(&InputEvent::down(160.0, 160.0));
    canvas.handle(&InputEvent::moved(200.0, 250.0));
    if let Some(event) = canvas.handle(&InputEvent::up(262.0, 329.0)) {
        let stored = session.apply(&event).map(|t| (t.code.clone(), t.x, t.y));
        println!("moved: {stored:?}");
    }

    let payload = r#"{"shape":"circle","seats":4,"width":1,"height":1}"#;
    if let Some(event) = canvas.handle_drop(payload, 400.0, 600.0)? {
        let stored = session.apply(&event).map(|t| t.code.clone());
        println!("dropped: {stored:?}");
    }

    let saved = session.save(&backend)?;
    println!("saved {} tables in `{}`", saved.tables.len(), saved.name);
    canvas.set_zone(session.zone().clone())?;
    session.close(&backend)?;
    canvas.dispose();

    // ─── Blueprint editor ────────────────────────────────────────────────
    let blueprint = backend.create(BlueprintDraft {
        name: "Main Hall".into(),
        description: None,
        width: 20.0,
        height: 15.0,
    })?;
    let mut editor = BlueprintEditor::for_blueprint(ScaleEngine::new(), &blueprint, config);
    editor.mount(&container)?;
    for (from, to) in [((40.0, 40.0), (760.0, 42.0)), ((760.0, 42.0), (758.0, 560.0))] {
        editor.handle(&InputEvent::down(from.0, from.1));
        editor.handle(&InputEvent::moved(to.0, to.1));
        if let Some(wall) = editor.handle(&InputEvent::up(to.0, to.1)) {
            println!("wall: {:.2} m at {:.0}°", wall.length, wall.angle);
        }
    }

    let layout = editor.save()?;
    backend.update_layout(&blueprint.id, &layout)?;
    let zone = backend.instantiate_blueprint(&blueprint.id, "branch-1", "Terrace")?;
    println!("instantiated `{}` with {} walls", zone.name, zone.walls.len());

    let encoded = layout
        .preview_image
        .strip_prefix(fp_render::preview::DATA_URL_PREFIX)
        .ok_or("preview is not a JPEG data URL")?;
    let jpeg = base64::engine::general_purpose::STANDARD.decode(encoded)?;
    std::fs::write("floor-plan-preview.jpg", &jpeg)?;
    println!("wrote floor-plan-preview.jpg ({} bytes)", jpeg.len());
    Ok(())
}
