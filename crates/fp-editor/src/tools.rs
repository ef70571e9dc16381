//! Wall drawing tool.
//!
//! A two-state machine, `Idle → Drawing → Idle`. While drawing, the
//! interactive layer holds a start anchor, a dashed guide to the (axis
//! snapped) pointer and a live length label. Pointer-up reads the guide
//! back, discards it if it is too short, and otherwise hands the caller a
//! [`Wall`] in meters. The overlay is cleared on every pointer-up.

use crate::input::InputEvent;
use fp_core::{Point as MeterPoint, ScaleEngine, SnapConfig, Wall, snap_to_axis};
use fp_render::build::{anchor_marker, guide_line, length_label};
use fp_render::{CanvasTheme, LayerKind, Surface};
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WallToolState {
    #[default]
    Idle,
    /// Start point in surface pixels.
    Drawing { start: Point },
}

#[derive(Debug, Clone, Default)]
pub struct WallTool {
    state: WallToolState,
    snap: SnapConfig,
}

impl WallTool {
    pub fn new(snap: SnapConfig) -> Self {
        Self {
            state: WallToolState::Idle,
            snap,
        }
    }

    pub fn state(&self) -> WallToolState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, WallToolState::Drawing { .. })
    }

    /// Feed one pointer event. Returns the wall committed by a pointer-up,
    /// if any.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        surface: &mut Surface,
        engine: &ScaleEngine,
        theme: &CanvasTheme,
    ) -> Option<Wall> {
        if !event.is_primary() {
            return None;
        }
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                let start = Point::new(x, y);
                self.state = WallToolState::Drawing { start };
                surface
                    .layer_mut(LayerKind::Interactive)
                    .replace(vec![anchor_marker(start, theme)]);
                None
            }
            InputEvent::PointerMove { x, y, .. } => {
                let WallToolState::Drawing { start } = self.state else {
                    return None;
                };
                let end = self.snapped_end(start, Point::new(x, y));
                let meters = engine.pixels_to_meters(start.distance(end));
                surface.layer_mut(LayerKind::Interactive).replace(vec![
                    anchor_marker(start, theme),
                    guide_line(start, end, theme),
                    length_label(start, end, meters, theme),
                ]);
                None
            }
            InputEvent::PointerUp { .. } => {
                let drawing = self.is_drawing();
                self.state = WallToolState::Idle;
                let overlay = surface.layer_mut(LayerKind::Interactive);
                let guide = overlay
                    .shapes()
                    .iter()
                    .find(|shape| shape.stroke.as_ref().is_some_and(|s| s.is_dashed()))
                    .and_then(|shape| shape.line_points());
                overlay.clear();

                let (start, end) = guide.filter(|_| drawing)?;
                self.commit(start, end, engine)
            }
            InputEvent::PointerCancel => {
                self.cancel(surface);
                None
            }
        }
    }

    /// Abandon any gesture in progress and clear the overlay.
    pub fn cancel(&mut self, surface: &mut Surface) {
        if self.is_drawing() {
            log::trace!("wall gesture cancelled");
        }
        self.state = WallToolState::Idle;
        surface.layer_mut(LayerKind::Interactive).clear();
    }

    fn snapped_end(&self, start: Point, end: Point) -> Point {
        let snapped = snap_to_axis(
            MeterPoint::new(start.x, start.y),
            MeterPoint::new(end.x, end.y),
            self.snap.axis_tolerance_deg,
        );
        Point::new(snapped.x, snapped.y)
    }

    fn commit(&self, start: Point, end: Point, engine: &ScaleEngine) -> Option<Wall> {
        let length_px = start.distance(end);
        if length_px < self.snap.min_wall_px {
            log::trace!("wall discarded: {length_px:.1}px is below the {}px minimum", self.snap.min_wall_px);
            return None;
        }
        let to_meters = |p: Point| MeterPoint::new(engine.pixels_to_meters(p.x), engine.pixels_to_meters(p.y));
        let wall = Wall::between(to_meters(start), to_meters(end));
        log::debug!(
            "wall committed: ({:.2}, {:.2}) → ({:.2}, {:.2}), {:.2}m at {:.1}°",
            wall.x1,
            wall.y1,
            wall.x2,
            wall.y2,
            wall.length,
            wall.angle
        );
        Some(wall)
    }
}
