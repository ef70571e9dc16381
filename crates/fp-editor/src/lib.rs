//! Interactive floor-plan editing: the wall tool, the blueprint editor,
//! the table layout canvas, and host sessions that drive collaborators.

pub mod blueprint;
pub mod canvas;
pub mod input;
pub mod session;
pub mod tools;

pub use blueprint::{BlueprintEditor, DEFAULT_BLUEPRINT_SIZE};
pub use canvas::{TableCanvas, TableEvent, ViewTransform};
pub use input::{InputEvent, PointerButton};
pub use session::{BookingSelection, LayoutSession};
pub use tools::{WallTool, WallToolState};

pub use fp_render::LayoutMode;
