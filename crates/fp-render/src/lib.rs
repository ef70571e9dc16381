//! Canvas surface, pure shape builders, hit testing and painting for floor plans.
//!
//! Everything here works in surface pixels; meters are converted with the
//! scale factor handed in by the caller.

pub mod build;
pub mod error;
pub mod hit;
pub mod paint;
pub mod preview;
pub mod shape;
pub mod surface;
pub mod tables;
pub mod theme;

pub use error::SurfaceError;
pub use shape::{Geometry, Shape, Stroke};
pub use surface::{Layer, LayerKind, Surface};
pub use tables::{LayoutMode, TableState, TableStyleInputs};
pub use theme::{CanvasTheme, Rgba};
