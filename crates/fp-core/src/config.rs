//! Tunable editor behavior: snapping, gesture thresholds, preview encoding.
//!
//! Every field has a sensible default so hosts only override what they need,
//! typically by deserializing a partial JSON object.

use serde::{Deserialize, Serialize};

// ─── Snapping ─────────────────────────────────────────────────────────────

/// Grid, axis and gesture thresholds shared by the wall tool and table layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapConfig {
    /// Table positions snap to multiples of this many meters. Default: **0.1**.
    pub grid_step_m: f64,

    /// A wall whose angle is within this many degrees of 0/90/180/270 is
    /// forced perfectly horizontal or vertical. Default: **10**.
    pub axis_tolerance_deg: f64,

    /// Walls shorter than this (in pixels) are treated as accidental clicks.
    /// Default: **10**.
    pub min_wall_px: f64,

    /// A pointer that travels less than this between down and up is a click,
    /// not a drag. Default: **3**.
    pub click_tolerance_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_step_m: 0.1,
            axis_tolerance_deg: 10.0,
            min_wall_px: 10.0,
            click_tolerance_px: 3.0,
        }
    }
}

// ─── Preview ──────────────────────────────────────────────────────────────

/// Raster preview generated when a blueprint is saved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Output resolution relative to the surface. Default: **0.5**.
    pub pixel_ratio: f64,

    /// JPEG quality, 1..=100. Default: **80**.
    pub jpeg_quality: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 0.5,
            jpeg_quality: 80,
        }
    }
}

// ─── Editor ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub preview: PreviewConfig,
    /// Prefix for host-assigned table codes (`M` → `M-01`).
    pub code_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            preview: PreviewConfig::default(),
            code_prefix: "M".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EditorConfig::from_json(r#"{"snap":{"axisToleranceDeg":15}}"#).unwrap();
        assert_eq!(cfg.snap.axis_tolerance_deg, 15.0);
        assert_eq!(cfg.snap.grid_step_m, 0.1);
        assert_eq!(cfg.preview.jpeg_quality, 80);
        assert_eq!(cfg.code_prefix, "M");
    }
}
