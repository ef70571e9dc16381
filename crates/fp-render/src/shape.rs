//! Retained drawing primitives held by surface layers.
//!
//! All coordinates are in surface pixels. Shapes carry their own style so a
//! layer can be painted (Vello, Canvas2D, raster preview) without consulting
//! the model again.

use crate::theme::Rgba;
use fp_core::TableId;
use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;

/// Dash pattern in pixels: alternating on/off lengths. Empty means solid.
pub type DashPattern = SmallVec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    pub dash: DashPattern,
}

impl Stroke {
    pub fn solid(color: Rgba, width: f64) -> Self {
        Self {
            color,
            width,
            dash: DashPattern::new(),
        }
    }

    pub fn dashed(color: Rgba, width: f64, pattern: &[f64]) -> Self {
        Self {
            color,
            width,
            dash: pattern.iter().copied().collect(),
        }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Line {
        from: Point,
        to: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    /// A rounded rectangle centered on `center`, rotated about it.
    Rect {
        center: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        rotation_deg: f64,
    },
    /// Text centered horizontally on `anchor`, baseline-middle aligned.
    Text {
        anchor: Point,
        content: String,
        size: f64,
    },
}

impl Geometry {
    /// Transform from the shape's local frame (origin at its center,
    /// unrotated) to surface pixels.
    pub fn local_transform(&self) -> Affine {
        match *self {
            Geometry::Rect {
                center,
                rotation_deg,
                ..
            } => Affine::translate(center.to_vec2()) * Affine::rotate(rotation_deg.to_radians()),
            Geometry::Circle { center, .. } => Affine::translate(center.to_vec2()),
            Geometry::Line { .. } | Geometry::Text { .. } => Affine::IDENTITY,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Geometry::Line { from, to } => {
                *from += delta;
                *to += delta;
            }
            Geometry::Circle { center, .. } | Geometry::Rect { center, .. } => *center += delta,
            Geometry::Text { anchor, .. } => *anchor += delta,
        }
    }

    /// Reference point used when dragging: center for areas, `from` for lines.
    pub fn origin(&self) -> Point {
        match *self {
            Geometry::Line { from, .. } => from,
            Geometry::Circle { center, .. } | Geometry::Rect { center, .. } => center,
            Geometry::Text { anchor, .. } => anchor,
        }
    }
}

/// A styled primitive on a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub geometry: Geometry,
    pub fill: Option<Rgba>,
    pub stroke: Option<Stroke>,
    pub opacity: f64,
    /// Centered caption drawn over the shape (table codes).
    pub label: Option<Label>,
    /// The table this shape represents, if any.
    pub table: Option<TableId>,
    /// Whether pointer events reach this shape.
    pub listening: bool,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: Rgba,
    pub size: f64,
}

impl Shape {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            fill: None,
            stroke: None,
            opacity: 1.0,
            label: None,
            table: None,
            listening: false,
            draggable: false,
        }
    }

    pub fn fill(mut self, color: Rgba) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// The `from → to` endpoints, if this is a line.
    pub fn line_points(&self) -> Option<(Point, Point)> {
        match self.geometry {
            Geometry::Line { from, to } => Some((from, to)),
            _ => None,
        }
    }
}
