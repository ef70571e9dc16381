//! Colors and fixed pixel metrics for floor-plan rendering.

use peniko::Color;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_peniko(self, opacity: f64) -> Color {
        Color::from_rgba8(self.r, self.g, self.b, scaled_alpha(self.a, opacity))
    }

    /// CSS color string for Canvas2D, e.g. `rgba(55, 65, 81, 0.5)`.
    pub fn to_css(self, opacity: f64) -> String {
        let alpha = f64::from(scaled_alpha(self.a, opacity)) / 255.0;
        format!("rgba({}, {}, {}, {alpha:.3})", self.r, self.g, self.b)
    }
}

fn scaled_alpha(a: u8, opacity: f64) -> u8 {
    (f64::from(a) * opacity.clamp(0.0, 1.0)).round() as u8
}

/// Theme-dependent colors and sizes for the canvas renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasTheme {
    pub background: Rgba,
    pub grid: Rgba,
    pub grid_width: f64,

    pub wall: Rgba,
    pub wall_thickness: f64,
    pub wall_marker: Rgba,
    pub wall_marker_radius: f64,

    pub anchor: Rgba,
    pub anchor_radius: f64,
    pub anchor_opacity: f64,
    pub guide: Rgba,
    pub guide_width: f64,
    pub guide_dash: [f64; 2],
    pub guide_opacity: f64,
    pub label: Rgba,
    pub label_size: f64,
    /// Vertical offset of the live length label above the guide midpoint.
    pub label_offset: f64,

    pub table_fill: Rgba,
    pub table_stroke: Rgba,
    pub table_stroke_width: f64,
    pub table_corner_radius: f64,
    pub table_label: Rgba,
    pub table_label_size: f64,
    pub occupied_fill: Rgba,
    pub occupied_opacity: f64,
    pub selected_fill: Rgba,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl CanvasTheme {
    /// Light theme: gray walls on white, blue drawing affordances.
    pub fn light() -> Self {
        Self {
            background: Rgba::rgb(0xFF, 0xFF, 0xFF),
            grid: Rgba::rgb(0xE5, 0xE7, 0xEB),
            grid_width: 1.0,

            wall: Rgba::rgb(0x37, 0x41, 0x51),
            wall_thickness: 6.0,
            wall_marker: Rgba::rgb(0x9C, 0xA3, 0xAF),
            wall_marker_radius: 3.0,

            anchor: Rgba::rgb(0x25, 0x63, 0xEB),
            anchor_radius: 4.0,
            anchor_opacity: 0.5,
            guide: Rgba::rgb(0x3B, 0x82, 0xF6),
            guide_width: 2.0,
            guide_dash: [10.0, 5.0],
            guide_opacity: 0.7,
            label: Rgba::rgb(0x1F, 0x29, 0x37),
            label_size: 14.0,
            label_offset: 20.0,

            table_fill: Rgba::rgb(0xF3, 0xF4, 0xF6),
            table_stroke: Rgba::rgb(0x6B, 0x72, 0x80),
            table_stroke_width: 2.0,
            table_corner_radius: 4.0,
            table_label: Rgba::rgb(0x11, 0x18, 0x27),
            table_label_size: 12.0,
            occupied_fill: Rgba::rgb(0xEF, 0x44, 0x44),
            occupied_opacity: 0.5,
            selected_fill: Rgba::rgb(0x22, 0xC5, 0x5E),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgba::from_hex("#374151"), Some(Rgba::rgb(0x37, 0x41, 0x51)));
        assert_eq!(Rgba::from_hex("#37415180").map(|c| c.a), Some(0x80));
        assert_eq!(Rgba::from_hex("374151"), None);
        assert_eq!(Rgba::from_hex("#37"), None);
    }

    #[test]
    fn css_applies_opacity() {
        assert_eq!(Rgba::rgb(239, 68, 68).to_css(0.5), "rgba(239, 68, 68, 0.502)");
        assert_eq!(Rgba::rgb(0, 0, 0).to_css(1.0), "rgba(0, 0, 0, 1.000)");
    }
}
