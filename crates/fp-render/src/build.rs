//! Shape builders for the grid, committed walls and the drawing overlay.
//!
//! Pure functions from model values and a scale factor to pixel-space
//! shapes. Callers replace a layer's contents with the result; nothing here
//! patches existing shapes.

use crate::shape::{Geometry, Shape, Stroke};
use crate::theme::CanvasTheme;
use fp_core::Wall;
use kurbo::Point;

/// Grid lines one meter apart, spanning exactly `width × height` pixels.
///
/// Returns nothing for a non-positive scale.
pub fn grid_lines(width: f64, height: f64, scale: f64, theme: &CanvasTheme) -> Vec<Shape> {
    if scale <= 0.0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let stroke = Stroke::solid(theme.grid, theme.grid_width);
    let line = |from: Point, to: Point| {
        Shape::new(Geometry::Line { from, to }).stroke(stroke.clone())
    };

    let columns = (width / scale + 1e-9).floor() as usize;
    let rows = (height / scale + 1e-9).floor() as usize;
    let mut lines = Vec::with_capacity(columns + rows + 2);
    for i in 0..=columns {
        let x = i as f64 * scale;
        lines.push(line(Point::new(x, 0.0), Point::new(x, height)));
    }
    for j in 0..=rows {
        let y = j as f64 * scale;
        lines.push(line(Point::new(0.0, y), Point::new(width, y)));
    }
    lines
}

/// A committed wall: a solid thick line plus a marker at each endpoint.
pub fn wall_shapes(wall: &Wall, scale: f64, theme: &CanvasTheme) -> [Shape; 3] {
    let from = Point::new(wall.x1 * scale, wall.y1 * scale);
    let to = Point::new(wall.x2 * scale, wall.y2 * scale);
    let marker = |center: Point| {
        Shape::new(Geometry::Circle {
            center,
            radius: theme.wall_marker_radius,
        })
        .fill(theme.wall_marker)
    };
    [
        Shape::new(Geometry::Line { from, to }).stroke(Stroke::solid(theme.wall, theme.wall_thickness)),
        marker(from),
        marker(to),
    ]
}

/// Every wall of a list, in order.
pub fn walls_layer(walls: &[Wall], scale: f64, theme: &CanvasTheme) -> Vec<Shape> {
    walls
        .iter()
        .flat_map(|wall| wall_shapes(wall, scale, theme))
        .collect()
}

/// The start marker shown while a wall is being drawn.
pub fn anchor_marker(at: Point, theme: &CanvasTheme) -> Shape {
    Shape::new(Geometry::Circle {
        center: at,
        radius: theme.anchor_radius,
    })
    .fill(theme.anchor)
    .opacity(theme.anchor_opacity)
}

/// Dashed guide from the start point to the (snapped) pointer position.
pub fn guide_line(from: Point, to: Point, theme: &CanvasTheme) -> Shape {
    Shape::new(Geometry::Line { from, to })
        .stroke(Stroke::dashed(theme.guide, theme.guide_width, &theme.guide_dash))
        .opacity(theme.guide_opacity)
}

/// Floating live-length caption above the guide's midpoint.
pub fn length_label(from: Point, to: Point, meters: f64, theme: &CanvasTheme) -> Shape {
    let mid = from.midpoint(to);
    Shape::new(Geometry::Text {
        anchor: Point::new(mid.x, mid.y - theme.label_offset),
        content: format_length(meters),
        size: theme.label_size,
    })
    .fill(theme.label)
}

/// `1.5` → `"1.50m"`.
pub fn format_length(meters: f64) -> String {
    format!("{meters:.2}m")
}
