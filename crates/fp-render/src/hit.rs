//! Hit testing: point → shape lookup.
//!
//! Walks a layer's shapes in reverse paint order (topmost first). Points are
//! mapped into each shape's local frame, so rotated tables hit-test against
//! their rotated outline.

use crate::shape::{Geometry, Shape};
use kurbo::{Line, ParamCurveNearest, Point, Rect, Shape as _};

/// Find the topmost listening shape containing `point`.
/// Returns `None` when the point is over the background.
pub fn hit_test(shapes: &[Shape], point: Point) -> Option<&Shape> {
    shapes
        .iter()
        .rev()
        .filter(|shape| shape.listening)
        .find(|shape| contains(shape, point))
}

/// Whether `point` (surface pixels) lies on the shape's filled area or
/// within half its stroke width.
pub fn contains(shape: &Shape, point: Point) -> bool {
    let half_stroke = shape.stroke.as_ref().map_or(0.0, |s| s.width / 2.0);
    match shape.geometry {
        Geometry::Line { from, to } => {
            Line::new(from, to).nearest(point, 1e-6).distance_sq <= half_stroke * half_stroke
        }
        Geometry::Circle { center, radius } => center.distance(point) <= radius + half_stroke,
        Geometry::Rect {
            width,
            height,
            corner_radius,
            ..
        } => {
            let local = shape.geometry.local_transform().inverse() * point;
            Rect::from_center_size(Point::ORIGIN, (width, height))
                .inflate(half_stroke, half_stroke)
                .to_rounded_rect(corner_radius + half_stroke)
                .contains(local)
        }
        Geometry::Text { .. } => false,
    }
}
