//! Surface → Vello drawing commands.
//!
//! Walks the layers back to front and emits Vello fills and strokes.
//! The caller presents the scene (wgpu surface, offscreen texture).

use crate::shape::{Geometry, Shape, Stroke};
use crate::surface::Surface;
use crate::theme::CanvasTheme;
use kurbo::{Affine, Cap, Circle, Join, Line, Rect, Stroke as KurboStroke};
use peniko::Fill;
use vello::Scene;

/// Paint the whole surface, background included.
///
/// Call once per frame with a freshly-cleared `Scene`.
pub fn paint_surface(scene: &mut Scene, surface: &Surface, theme: &CanvasTheme) {
    let bounds = Rect::new(0.0, 0.0, surface.width(), surface.height());
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        theme.background.to_peniko(1.0),
        None,
        &bounds,
    );
    for layer in surface.layers() {
        for shape in layer.shapes() {
            paint_shape(scene, shape);
        }
    }
}

pub fn paint_shape(scene: &mut Scene, shape: &Shape) {
    let transform = shape.geometry.local_transform();
    match &shape.geometry {
        Geometry::Line { from, to } => {
            stroke(scene, Affine::IDENTITY, &Line::new(*from, *to), shape);
        }
        Geometry::Circle { radius, .. } => {
            let circle = Circle::new((0.0, 0.0), *radius);
            fill(scene, transform, &circle, shape);
            stroke(scene, transform, &circle, shape);
        }
        Geometry::Rect {
            width,
            height,
            corner_radius,
            ..
        } => {
            let rect = Rect::from_center_size((0.0, 0.0), (*width, *height)).to_rounded_rect(*corner_radius);
            fill(scene, transform, &rect, shape);
            stroke(scene, transform, &rect, shape);
        }
        Geometry::Text { content, anchor, .. } => {
            log::trace!("TEXT {content:?} at ({:.1}, {:.1})", anchor.x, anchor.y);
            // Glyph runs need a font context; text is drawn by the Canvas2D bridge.
        }
    }
    if let Some(label) = &shape.label {
        log::trace!("LABEL {:?}", label.text);
    }
}

// ─── Fill and stroke ─────────────────────────────────────────────────────────

fn fill<S: kurbo::Shape>(scene: &mut Scene, transform: Affine, geometry: &S, shape: &Shape) {
    if let Some(color) = shape.fill {
        scene.fill(Fill::NonZero, transform, color.to_peniko(shape.opacity), None, geometry);
    }
}

fn stroke<S: kurbo::Shape>(scene: &mut Scene, transform: Affine, geometry: &S, shape: &Shape) {
    if let Some(stroke) = &shape.stroke {
        scene.stroke(
            &to_kurbo_stroke(stroke),
            transform,
            stroke.color.to_peniko(shape.opacity),
            None,
            geometry,
        );
    }
}

fn to_kurbo_stroke(stroke: &Stroke) -> KurboStroke {
    let base = KurboStroke::new(stroke.width)
        .with_join(Join::Round)
        .with_caps(Cap::Round);
    if stroke.is_dashed() {
        base.with_caps(Cap::Butt)
            .with_dashes(0.0, stroke.dash.iter().copied())
    } else {
        base
    }
}
