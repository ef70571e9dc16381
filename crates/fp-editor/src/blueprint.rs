//! Blueprint editor: a surface, the wall tool and the wall list.
//!
//! The wall list is the editor's in-memory model. Saving is a separate,
//! explicit step that snapshots the surface into a downscaled JPEG and
//! returns `{walls, previewImage}` for the host to persist.

use crate::input::InputEvent;
use crate::tools::{WallTool, WallToolState};
use fp_core::{
    Blueprint, BlueprintLayout, ContainerGeometry, EditorConfig, ScaleAware, ScaleEngine, Wall, Zone,
};
use fp_render::build::{wall_shapes, walls_layer};
use fp_render::preview::snapshot_data_url;
use fp_render::{CanvasTheme, LayerKind, Surface, SurfaceError};

/// Authoring area for a new blueprint, in meters.
pub const DEFAULT_BLUEPRINT_SIZE: (f64, f64) = (20.0, 15.0);

pub struct BlueprintEditor {
    engine: ScaleEngine,
    zone: Zone,
    walls: Vec<Wall>,
    surface: Option<Surface>,
    tool: WallTool,
    theme: CanvasTheme,
    config: EditorConfig,
    drawn_revision: u64,
    redraws: u64,
}

impl BlueprintEditor {
    /// An editor over a `width × height` meter area. Nothing is drawn until
    /// [`mount`](Self::mount).
    pub fn new(engine: ScaleEngine, blueprint_id: &str, width: f64, height: f64, config: EditorConfig) -> Self {
        let tool = WallTool::new(config.snap);
        Self {
            engine,
            zone: Zone::new(blueprint_id, blueprint_id, width, height),
            walls: Vec::new(),
            surface: None,
            tool,
            theme: CanvasTheme::light(),
            config,
            drawn_revision: 0,
            redraws: 0,
        }
    }

    /// An editor for a fresh blueprint on the default 20 m × 15 m area.
    pub fn blank(engine: ScaleEngine, blueprint_id: &str, config: EditorConfig) -> Self {
        let (width, height) = DEFAULT_BLUEPRINT_SIZE;
        Self::new(engine, blueprint_id, width, height, config)
    }

    /// An editor opened on a persisted blueprint, walls included.
    pub fn for_blueprint(engine: ScaleEngine, blueprint: &Blueprint, config: EditorConfig) -> Self {
        let mut editor = Self::new(engine, &blueprint.id, blueprint.width, blueprint.height, config);
        editor.zone.name = blueprint.name.clone();
        editor.walls = blueprint.walls.clone();
        editor
    }

    pub fn with_theme(mut self, theme: CanvasTheme) -> Self {
        self.theme = theme;
        self
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Bind the scale engine to `container` and create the surface.
    ///
    /// Fails with [`SurfaceError::ContainerNotReady`] while the container
    /// has no width; call again once it has been laid out.
    pub fn mount(&mut self, container: &dyn ContainerGeometry) -> Result<(), SurfaceError> {
        self.engine.initialize(container, &self.zone);
        self.recreate_surface()
    }

    /// Create the surface from the engine's current state, destroying any
    /// previous one first.
    pub fn recreate_surface(&mut self) -> Result<(), SurfaceError> {
        if let Some(old) = self.surface.take() {
            old.dispose();
        }
        self.tool = WallTool::new(self.config.snap);
        self.surface = Some(Surface::create(&self.zone, &self.engine)?);
        self.redraw();
        Ok(())
    }

    /// Release the surface. The editor keeps its walls and can be mounted again.
    pub fn dispose(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.dispose();
        }
        self.tool = WallTool::new(self.config.snap);
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Resize to the current stage dimensions and redraw grid and walls.
    /// Any wall in progress is abandoned, since its pixel start point no
    /// longer matches the scale.
    pub fn redraw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let scale = self.engine.scale_factor();
        surface.resize(self.engine.stage_dimensions(self.zone.height));
        surface.draw_grid(scale, &self.theme);
        surface
            .layer_mut(LayerKind::Walls)
            .replace(walls_layer(&self.walls, scale, &self.theme));
        self.tool.cancel(surface);
        self.drawn_revision = self.engine.revision();
        self.redraws += 1;
    }

    /// Redraw if the scale changed since the last paint.
    pub fn sync_scale(&mut self) {
        if self.drawn_revision != self.engine.revision() {
            self.redraw();
        }
    }

    /// Number of full redraws so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a pointer event to the wall tool. Returns the wall appended to
    /// the list, if the event committed one.
    pub fn handle(&mut self, event: &InputEvent) -> Option<Wall> {
        self.sync_scale();
        let surface = self.surface.as_mut()?;
        let wall = self.tool.handle(event, surface, &self.engine, &self.theme)?;
        surface
            .layer_mut(LayerKind::Walls)
            .extend(wall_shapes(&wall, self.engine.scale_factor(), &self.theme));
        self.walls.push(wall);
        Some(wall)
    }

    pub fn tool_state(&self) -> WallToolState {
        self.tool.state()
    }

    // ─── Wall list ───────────────────────────────────────────────────────

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Replace the wall list with persisted walls and draw them.
    pub fn load_walls(&mut self, walls: Vec<Wall>) {
        self.walls = walls;
        let scale = self.engine.scale_factor();
        if let Some(surface) = self.surface.as_mut() {
            surface
                .layer_mut(LayerKind::Walls)
                .replace(walls_layer(&self.walls, scale, &self.theme));
        }
    }

    /// Remove every wall. A gesture in progress is unaffected.
    pub fn clear_all(&mut self) {
        self.walls.clear();
        if let Some(surface) = self.surface.as_mut() {
            surface.layer_mut(LayerKind::Walls).clear();
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Walls plus a downscaled JPEG preview of the surface.
    pub fn save(&self) -> Result<BlueprintLayout, SurfaceError> {
        let surface = self.surface.as_ref().ok_or(SurfaceError::Disposed)?;
        let preview_image = snapshot_data_url(surface, &self.theme, &self.config.preview)?;
        Ok(BlueprintLayout {
            walls: self.walls.clone(),
            preview_image,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn engine(&self) -> &ScaleEngine {
        &self.engine
    }

    pub fn theme(&self) -> &CanvasTheme {
        &self.theme
    }

    pub fn area(&self) -> (f64, f64) {
        (self.zone.width, self.zone.height)
    }
}

impl ScaleAware for BlueprintEditor {
    fn on_scale_changed(&mut self, _engine: &ScaleEngine) {
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::{ManualContainer, Point, bind};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mounted(width: f64) -> (BlueprintEditor, ManualContainer) {
        let container = ManualContainer::new(width);
        let mut editor = BlueprintEditor::new(ScaleEngine::new(), "bp-1", 10.0, 5.0, EditorConfig::default());
        editor.mount(&container).unwrap();
        (editor, container)
    }

    fn draw(editor: &mut BlueprintEditor, from: (f64, f64), to: (f64, f64)) -> Option<Wall> {
        editor.handle(&InputEvent::down(from.0, from.1));
        editor.handle(&InputEvent::moved(to.0, to.1));
        editor.handle(&InputEvent::up(to.0, to.1))
    }

    #[test]
    fn mount_waits_for_container_width() {
        let container = ManualContainer::new(0.0);
        let mut editor = BlueprintEditor::blank(ScaleEngine::new(), "bp-0", EditorConfig::default());
        assert!(matches!(
            editor.mount(&container),
            Err(SurfaceError::ContainerNotReady { .. })
        ));
        assert!(!editor.is_mounted());

        container.resize(800.0);
        editor.recreate_surface().unwrap();
        assert_eq!(editor.surface().map(|s| s.height()), Some(600.0));
    }

    #[test]
    fn committed_walls_are_drawn_permanently() {
        let (mut editor, _c) = mounted(1000.0);
        draw(&mut editor, (0.0, 0.0), (300.0, 0.0)).unwrap();
        assert_eq!(editor.walls().len(), 1);
        let surface = editor.surface().unwrap();
        assert_eq!(surface.layer(LayerKind::Walls).shapes().len(), 3);
        assert!(surface.layer(LayerKind::Interactive).is_empty());
    }

    #[test]
    fn clear_all_keeps_gesture() {
        let (mut editor, _c) = mounted(1000.0);
        draw(&mut editor, (0.0, 0.0), (300.0, 0.0));
        editor.handle(&InputEvent::down(10.0, 10.0));
        editor.clear_all();
        assert!(editor.walls().is_empty());
        assert!(matches!(editor.tool_state(), WallToolState::Drawing { .. }));
        assert!(editor.surface().unwrap().layer(LayerKind::Walls).is_empty());
    }

    #[test]
    fn load_walls_replaces_list() {
        let (mut editor, _c) = mounted(1000.0);
        draw(&mut editor, (0.0, 0.0), (300.0, 0.0));
        let persisted = vec![
            Wall::between(Point::new(0.0, 0.0), Point::new(0.0, 5.0)),
            Wall::between(Point::new(0.0, 5.0), Point::new(10.0, 5.0)),
        ];
        editor.load_walls(persisted.clone());
        assert_eq!(editor.walls(), persisted.as_slice());
        assert_eq!(editor.surface().unwrap().layer(LayerKind::Walls).shapes().len(), 6);
    }

    #[test]
    fn bound_editor_redraws_once_per_resize() {
        let container = ManualContainer::new(1000.0);
        let engine = ScaleEngine::new();
        let editor = Rc::new(RefCell::new(BlueprintEditor::new(
            engine.clone(),
            "bp-2",
            10.0,
            5.0,
            EditorConfig::default(),
        )));
        let _binding = bind(&engine, &editor);
        editor.borrow_mut().mount(&container).unwrap();
        let before = editor.borrow().redraw_count();

        container.resize(500.0);
        container.resize(500.0);
        assert_eq!(editor.borrow().redraw_count(), before + 1);
        assert_eq!(editor.borrow().surface().map(|s| s.width()), Some(500.0));
    }

    #[test]
    fn save_produces_walls_and_preview() {
        let (mut editor, _c) = mounted(400.0);
        draw(&mut editor, (0.0, 100.0), (400.0, 100.0));
        let layout = editor.save().unwrap();
        assert_eq!(layout.walls.len(), 1);
        assert!(layout.preview_image.starts_with("data:image/jpeg;base64,"));

        editor.dispose();
        assert!(matches!(editor.save(), Err(SurfaceError::Disposed)));
    }
}
