//! Normalized pointer input.
//!
//! Hosts translate platform events (DOM pointer events, winit, test
//! scripts) into `InputEvent`s. Positions are in canvas-element pixels,
//! relative to the element's top-left corner.

use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` code. Unknown codes are treated as
    /// secondary so they never start a gesture.
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Middle,
            _ => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        /// `false` for the second and later touches of a multi-touch gesture.
        is_primary: bool,
    },
    PointerMove {
        x: f64,
        y: f64,
        is_primary: bool,
    },
    PointerUp {
        x: f64,
        y: f64,
        is_primary: bool,
    },
    /// The gesture was abandoned: pointer left the canvas, touch cancelled,
    /// or the host lost focus.
    PointerCancel,
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            is_primary: true,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            is_primary: true,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            is_primary: true,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y, .. } | Self::PointerUp { x, y, .. } => {
                Some(Point::new(x, y))
            }
            Self::PointerCancel => None,
        }
    }

    /// Whether the event comes from the primary pointer with the primary
    /// button. Everything else is ignored by the tools.
    pub fn is_primary(&self) -> bool {
        match *self {
            Self::PointerDown {
                button, is_primary, ..
            } => is_primary && button == PointerButton::Primary,
            Self::PointerMove { is_primary, .. } | Self::PointerUp { is_primary, .. } => is_primary,
            Self::PointerCancel => true,
        }
    }
}
