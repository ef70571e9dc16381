//! Canvas2D renderer.
//!
//! Walks a surface's layers back to front and draws every shape to an HTML
//! `<canvas>` via `CanvasRenderingContext2d`, under the host's pan/zoom.

use fp_editor::ViewTransform;
use fp_render::shape::{Geometry, Label, Shape};
use fp_render::{CanvasTheme, Surface};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Clear the element and render the surface.
pub fn render_surface(
    ctx: &CanvasRenderingContext2d,
    surface: &Surface,
    theme: &CanvasTheme,
    view: ViewTransform,
    element_width: f64,
    element_height: f64,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.clear_rect(0.0, 0.0, element_width, element_height);

    ctx.save();
    let zoom = if view.zoom > 0.0 { view.zoom } else { 1.0 };
    let _ = ctx.set_transform(zoom, 0.0, 0.0, zoom, view.pan_x, view.pan_y);

    // Background
    ctx.set_fill_style_str(&theme.background.to_css(1.0));
    ctx.fill_rect(0.0, 0.0, surface.width(), surface.height());

    for layer in surface.layers() {
        for shape in layer.shapes() {
            draw_shape(ctx, shape);
        }
    }
    ctx.restore();
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) {
    ctx.save();
    ctx.set_global_alpha(shape.opacity.clamp(0.0, 1.0));

    match &shape.geometry {
        Geometry::Line { from, to } => {
            ctx.begin_path();
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
            stroke(ctx, shape);
        }
        Geometry::Circle { center, radius } => {
            let _ = ctx.translate(center.x, center.y);
            ctx.begin_path();
            let _ = ctx.arc(0.0, 0.0, *radius, 0.0, std::f64::consts::TAU);
            fill_and_stroke(ctx, shape);
        }
        Geometry::Rect {
            center,
            width,
            height,
            corner_radius,
            rotation_deg,
        } => {
            let _ = ctx.translate(center.x, center.y);
            let _ = ctx.rotate(rotation_deg.to_radians());
            rounded_rect_path(ctx, -width / 2.0, -height / 2.0, *width, *height, *corner_radius);
            fill_and_stroke(ctx, shape);
        }
        Geometry::Text {
            anchor,
            content,
            size,
        } => {
            ctx.set_font(&format!("{size}px Inter, system-ui, sans-serif"));
            ctx.set_fill_style_str(&shape.fill.map_or_else(|| "#111827".to_string(), |c| c.to_css(1.0)));
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            let _ = ctx.fill_text(content, anchor.x, anchor.y);
        }
    }

    // Labels share the shape's local frame, so they rotate with the table.
    if let Some(label) = &shape.label {
        draw_label(ctx, label);
    }
    ctx.restore();
}

fn fill_and_stroke(ctx: &CanvasRenderingContext2d, shape: &Shape) {
    if let Some(fill) = shape.fill {
        ctx.set_fill_style_str(&fill.to_css(1.0));
        ctx.fill();
    }
    stroke(ctx, shape);
}

fn stroke(ctx: &CanvasRenderingContext2d, shape: &Shape) {
    let Some(stroke) = &shape.stroke else {
        return;
    };
    ctx.set_stroke_style_str(&stroke.color.to_css(1.0));
    ctx.set_line_width(stroke.width);
    ctx.set_line_cap(if stroke.is_dashed() { "butt" } else { "round" });
    let dashes = js_sys::Array::new();
    for len in &stroke.dash {
        dashes.push(&JsValue::from_f64(*len));
    }
    let _ = ctx.set_line_dash(&dashes);
    ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, label: &Label) {
    ctx.set_global_alpha(1.0);
    ctx.set_font(&format!("600 {}px Inter, system-ui, sans-serif", label.size));
    ctx.set_fill_style_str(&label.color.to_css(1.0));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(&label.text, 0.0, 0.0);
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
