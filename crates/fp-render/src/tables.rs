//! Table shapes as a pure function of (tables, mode, occupied, selected, scale).

use crate::shape::{Geometry, Label, Shape, Stroke};
use crate::theme::CanvasTheme;
use fp_core::{Table, TableId, TableShape};
use kurbo::Point;
use std::collections::HashSet;

/// How the table layout behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    /// Furniture editing: tables drag, drops create tables.
    #[default]
    Admin,
    /// Booking: tables are read-only and selectable unless occupied.
    Client,
}

impl LayoutMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Self::Admin),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

/// Visual state of a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableState {
    Default,
    Selected,
    Occupied,
}

/// Everything besides the tables themselves that the shapes depend on.
#[derive(Debug, Clone, Default)]
pub struct TableStyleInputs {
    pub mode: LayoutMode,
    pub occupied: HashSet<TableId>,
    pub selected: HashSet<TableId>,
}

impl TableStyleInputs {
    /// Occupied wins over selected. Admin mode has no states.
    pub fn state_of(&self, id: TableId) -> TableState {
        match self.mode {
            LayoutMode::Admin => TableState::Default,
            LayoutMode::Client if self.occupied.contains(&id) => TableState::Occupied,
            LayoutMode::Client if self.selected.contains(&id) => TableState::Selected,
            LayoutMode::Client => TableState::Default,
        }
    }
}

/// One interactive shape for a table, centered on its position.
pub fn table_shape(table: &Table, inputs: &TableStyleInputs, scale: f64, theme: &CanvasTheme) -> Shape {
    let center = Point::new(table.x * scale, table.y * scale);
    let width = table.width * scale;
    let height = table.height * scale;

    let geometry = match table.shape {
        TableShape::Circle => Geometry::Circle {
            center,
            radius: width / 2.0,
        },
        TableShape::Rect => Geometry::Rect {
            center,
            width,
            height,
            corner_radius: theme.table_corner_radius,
            rotation_deg: table.rotation,
        },
    };

    let state = inputs.state_of(table.id);
    let (fill, opacity) = match state {
        TableState::Occupied => (theme.occupied_fill, theme.occupied_opacity),
        TableState::Selected => (theme.selected_fill, 1.0),
        TableState::Default => (theme.table_fill, 1.0),
    };

    let mut shape = Shape::new(geometry)
        .fill(fill)
        .stroke(Stroke::solid(theme.table_stroke, theme.table_stroke_width))
        .opacity(opacity);
    shape.label = Some(Label {
        text: table.code.clone(),
        color: theme.table_label,
        size: theme.table_label_size,
    });
    shape.table = Some(table.id);
    shape.listening = state != TableState::Occupied;
    shape.draggable = inputs.mode == LayoutMode::Admin;
    shape
}

/// Shapes for every table, in model order.
pub fn table_shapes(
    tables: &[Table],
    inputs: &TableStyleInputs,
    scale: f64,
    theme: &CanvasTheme,
) -> Vec<Shape> {
    tables
        .iter()
        .map(|table| table_shape(table, inputs, scale, theme))
        .collect()
}
