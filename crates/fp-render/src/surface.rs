//! The drawing root: pixel size, zone identity and three ordered layers.
//!
//! Paint order is fixed, back to front: grid, walls, interactive (tables or
//! the wall-drawing overlay). A surface belongs to exactly one zone; when the
//! zone identity changes, the owner disposes it and creates a new one.

use crate::build::grid_lines;
use crate::error::SurfaceError;
use crate::hit::hit_test;
use crate::shape::Shape;
use crate::theme::CanvasTheme;
use fp_core::{ScaleEngine, StageDimensions, TableId, Zone};
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Grid,
    Walls,
    Interactive,
}

impl LayerKind {
    /// Back to front.
    pub const PAINT_ORDER: [LayerKind; 3] = [LayerKind::Grid, LayerKind::Walls, LayerKind::Interactive];

    fn index(self) -> usize {
        match self {
            LayerKind::Grid => 0,
            LayerKind::Walls => 1,
            LayerKind::Interactive => 2,
        }
    }
}

/// An ordered list of shapes, painted in insertion order.
#[derive(Debug, Clone)]
pub struct Layer {
    kind: LayerKind,
    shapes: Vec<Shape>,
    draws: u64,
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            shapes: Vec::new(),
            draws: 0,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Discard every shape and draw `shapes` in their place.
    pub fn replace(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        self.draws += 1;
    }

    pub fn extend(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.shapes.extend(shapes);
        self.draws += 1;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// How many times this layer's contents have been (re)drawn.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Interactive shape for a table, if present.
    pub fn table_shape_mut(&mut self, id: TableId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.table == Some(id))
    }
}

#[derive(Debug)]
pub struct Surface {
    zone_id: String,
    width: f64,
    height: f64,
    background_url: Option<String>,
    layers: [Layer; 3],
}

impl Surface {
    /// Create a surface sized for `zone` at the engine's current scale.
    ///
    /// Refused while the container is unmeasured or the zone has no area.
    pub fn create(zone: &Zone, engine: &ScaleEngine) -> Result<Self, SurfaceError> {
        let container_width = engine.container_width();
        if container_width <= 0.0 || zone.validate().is_err() {
            return Err(SurfaceError::ContainerNotReady {
                container_width,
                zone_width: zone.width,
                zone_height: zone.height,
            });
        }
        let StageDimensions { width, height } = engine.stage_dimensions(zone.height);
        log::debug!("surface created for zone `{}`: {width:.0}×{height:.0}px", zone.id);
        Ok(Self {
            zone_id: zone.id.clone(),
            width,
            height,
            background_url: zone.background_image_url.clone(),
            layers: LayerKind::PAINT_ORDER.map(Layer::new),
        })
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Zone background image, painted by the host underneath the grid.
    pub fn background_url(&self) -> Option<&str> {
        self.background_url.as_deref()
    }

    /// Apply new stage dimensions. Returns whether the size changed.
    pub fn resize(&mut self, dims: StageDimensions) -> bool {
        if dims.width == self.width && dims.height == self.height {
            return false;
        }
        self.width = dims.width;
        self.height = dims.height;
        true
    }

    /// Rebuild the grid from scratch at the given scale.
    pub fn draw_grid(&mut self, scale: f64, theme: &CanvasTheme) {
        let lines = grid_lines(self.width, self.height, scale, theme);
        self.layer_mut(LayerKind::Grid).replace(lines);
    }

    pub fn layer(&self, kind: LayerKind) -> &Layer {
        &self.layers[kind.index()]
    }

    pub fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[kind.index()]
    }

    /// Layers back to front.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Topmost listening table under `point` (surface pixels).
    pub fn table_at(&self, point: Point) -> Option<TableId> {
        hit_test(self.layer(LayerKind::Interactive).shapes(), point).and_then(|shape| shape.table)
    }

    /// Release every shape. The surface cannot be used afterwards.
    pub fn dispose(mut self) {
        for layer in &mut self.layers {
            layer.shapes.clear();
        }
        log::debug!("surface for zone `{}` disposed", self.zone_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::ManualContainer;
    use pretty_assertions::assert_eq;

    fn engine_for(zone: &Zone, width: f64) -> (ScaleEngine, ManualContainer) {
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(width);
        engine.initialize(&container, zone);
        (engine, container)
    }

    #[test]
    fn refuses_unmeasured_container() {
        let zone = Zone::new("z1", "Hall", 10.0, 5.0);
        let (engine, _c) = engine_for(&zone, 0.0);
        assert!(matches!(
            Surface::create(&zone, &engine),
            Err(SurfaceError::ContainerNotReady { .. })
        ));
    }

    #[test]
    fn refuses_zone_without_area() {
        let zone = Zone::new("z1", "Hall", 10.0, 0.0);
        let (engine, _c) = engine_for(&zone, 800.0);
        assert!(Surface::create(&zone, &engine).is_err());
    }

    #[test]
    fn sized_to_zone_aspect_ratio() {
        let zone = Zone::new("z1", "Hall", 10.0, 5.0);
        let (engine, _c) = engine_for(&zone, 1000.0);
        let surface = Surface::create(&zone, &engine).unwrap();
        assert_eq!((surface.width(), surface.height()), (1000.0, 500.0));
        assert_eq!(surface.zone_id(), "z1");
        assert_eq!(
            surface.layers().map(Layer::kind).collect::<Vec<_>>(),
            LayerKind::PAINT_ORDER.to_vec()
        );
    }

    #[test]
    fn resize_reports_changes_only() {
        let zone = Zone::new("z1", "Hall", 10.0, 5.0);
        let (engine, container) = engine_for(&zone, 1000.0);
        let mut surface = Surface::create(&zone, &engine).unwrap();
        assert!(!surface.resize(engine.stage_dimensions(zone.height)));

        container.resize(500.0);
        assert!(surface.resize(engine.stage_dimensions(zone.height)));
        assert_eq!((surface.width(), surface.height()), (500.0, 250.0));
    }

    #[test]
    fn grid_is_rebuilt_not_appended() {
        let zone = Zone::new("z1", "Hall", 4.0, 2.0);
        let (engine, _c) = engine_for(&zone, 400.0);
        let theme = CanvasTheme::light();
        let mut surface = Surface::create(&zone, &engine).unwrap();
        surface.draw_grid(engine.scale_factor(), &theme);
        surface.draw_grid(engine.scale_factor(), &theme);
        let grid = surface.layer(LayerKind::Grid);
        assert_eq!(grid.shapes().len(), 5 + 3);
        assert_eq!(grid.draw_count(), 2);
    }
}
