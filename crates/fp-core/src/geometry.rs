//! Small geometry helpers: points, grid snapping and axis snapping.

use serde::{Deserialize, Serialize};

/// A point in either pixel space or floor-plan meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Angle of the segment `from → to` in degrees, normalized into [0, 360).
pub fn angle_deg(from: Point, to: Point) -> f64 {
    normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

/// Wrap an angle in degrees into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Snap a value to the nearest multiple of `step`.
///
/// Uses the reciprocal so that decimal steps like 0.1 divide exactly:
/// `snap_to_grid(1.23, 0.1) == 1.2`.
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let inv = 1.0 / step;
    (value * inv).round() / inv
}

/// Force a segment horizontal or vertical when its angle is near an axis.
///
/// If the angle of `start → end` lies within `tolerance_deg` of 0°, 90°,
/// 180° or 270°, the off-axis coordinate of `end` is clamped to the
/// matching coordinate of `start`. Otherwise `end` is returned unchanged.
pub fn snap_to_axis(start: Point, end: Point, tolerance_deg: f64) -> Point {
    let angle = angle_deg(start, end);
    let near = |target: f64| (angle - target).abs() <= tolerance_deg;

    if near(0.0) || near(360.0) || near(180.0) {
        Point::new(end.x, start.y)
    } else if near(90.0) || near(270.0) {
        Point::new(start.x, end.y)
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_snap_rounds_to_nearest_tenth() {
        assert_eq!(snap_to_grid(1.23, 0.1), 1.2);
        assert_eq!(snap_to_grid(4.56, 0.1), 4.6);
        assert_eq!(snap_to_grid(2.34, 0.1), 2.3);
        assert_eq!(snap_to_grid(-0.06, 0.1), -0.1);
    }

    #[test]
    fn grid_snap_ignores_non_positive_step() {
        assert_eq!(snap_to_grid(1.234, 0.0), 1.234);
    }

    #[test]
    fn angle_is_normalized() {
        let o = Point::ORIGIN;
        assert_eq!(angle_deg(o, Point::new(10.0, 0.0)), 0.0);
        assert!((angle_deg(o, Point::new(0.0, 10.0)) - 90.0).abs() < 1e-9);
        assert!((angle_deg(o, Point::new(0.0, -10.0)) - 270.0).abs() < 1e-9);
        assert!((angle_deg(o, Point::new(-10.0, 0.0)) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn near_vertical_snaps_to_vertical() {
        let start = Point::new(100.0, 100.0);
        // 91° in screen space (y grows downward)
        let rad = 91f64.to_radians();
        let end = Point::new(100.0 + 200.0 * rad.cos(), 100.0 + 200.0 * rad.sin());
        let snapped = snap_to_axis(start, end, 15.0);
        assert_eq!(snapped.x, start.x);
        assert_eq!(snapped.y, end.y);
    }

    #[test]
    fn near_horizontal_wraps_around_360() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, -5.0); // ~357°
        let snapped = snap_to_axis(start, end, 10.0);
        assert_eq!(snapped, Point::new(100.0, 0.0));
    }

    #[test]
    fn diagonal_is_left_alone() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 100.0);
        assert_eq!(snap_to_axis(start, end, 10.0), end);
    }
}
