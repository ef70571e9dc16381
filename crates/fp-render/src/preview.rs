//! Downscaled raster snapshot of a surface, encoded as a JPEG data URL.
//!
//! A small CPU rasterizer: every shape is composited over its pixel bounding
//! box with per-pixel coverage tests (no anti-aliasing). Text is not drawn;
//! the preview only needs to convey the floor-plan geometry.

use crate::error::SurfaceError;
use crate::hit::contains;
use crate::shape::{Geometry, Shape};
use crate::surface::Surface;
use crate::theme::{CanvasTheme, Rgba};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use fp_core::PreviewConfig;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use kurbo::{Point, Rect, Shape as _};
use std::io::Cursor;

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Rasterize the surface at `pixel_ratio` of its size.
pub fn rasterize(surface: &Surface, theme: &CanvasTheme, pixel_ratio: f64) -> RgbImage {
    let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
    let width = ((surface.width() * ratio).ceil() as u32).max(1);
    let height = ((surface.height() * ratio).ceil() as u32).max(1);
    let bg = theme.background;
    let mut image = RgbImage::from_pixel(width, height, Rgb([bg.r, bg.g, bg.b]));

    for layer in surface.layers() {
        for shape in layer.shapes() {
            composite(&mut image, shape, ratio);
        }
    }
    image
}

/// Rasterize and JPEG-encode the surface as configured.
pub fn encode_jpeg(surface: &Surface, theme: &CanvasTheme, config: &PreviewConfig) -> Result<Vec<u8>, SurfaceError> {
    let image = rasterize(surface, theme, config.pixel_ratio);
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let encoder = JpegEncoder::new_with_quality(&mut cursor, config.jpeg_quality.clamp(1, 100));
        image.write_with_encoder(encoder)?;
    }
    log::debug!(
        "preview encoded: {}×{} px, {} bytes",
        image.width(),
        image.height(),
        buffer.len()
    );
    Ok(buffer)
}

/// `data:image/jpeg;base64,...` snapshot of the surface.
pub fn snapshot_data_url(
    surface: &Surface,
    theme: &CanvasTheme,
    config: &PreviewConfig,
) -> Result<String, SurfaceError> {
    let jpeg = encode_jpeg(surface, theme, config)?;
    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(jpeg)))
}

// ─── Compositing ─────────────────────────────────────────────────────────────

fn composite(image: &mut RgbImage, shape: &Shape, ratio: f64) {
    let Some(bounds) = pixel_bounds(shape) else {
        return;
    };
    let stroke_color = shape.stroke.as_ref().map(|s| s.color);
    let body = match shape.geometry {
        Geometry::Line { .. } => stroke_color,
        _ => shape.fill.or(stroke_color),
    };
    let Some(body) = body else {
        return;
    };

    let x0 = (bounds.x0 * ratio).floor().max(0.0) as u32;
    let y0 = (bounds.y0 * ratio).floor().max(0.0) as u32;
    let x1 = ((bounds.x1 * ratio).ceil().max(0.0) as u32).min(image.width());
    let y1 = ((bounds.y1 * ratio).ceil().max(0.0) as u32).min(image.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let point = Point::new((f64::from(px) + 0.5) / ratio, (f64::from(py) + 0.5) / ratio);
            if !contains(shape, point) {
                continue;
            }
            let paint = match (stroke_color, on_outline(shape, point)) {
                (Some(stroke), true) => stroke,
                _ => body,
            };
            blend(image.get_pixel_mut(px, py), paint, shape.opacity);
        }
    }
}

/// Whether a contained point lies in the stroke band of an area shape.
fn on_outline(shape: &Shape, point: Point) -> bool {
    let Some(stroke) = &shape.stroke else {
        return false;
    };
    let half = stroke.width / 2.0;
    match shape.geometry {
        Geometry::Circle { center, radius } => center.distance(point) >= radius - half,
        Geometry::Rect { width, height, .. } => {
            let local = shape.geometry.local_transform().inverse() * point;
            !Rect::from_center_size(Point::ORIGIN, (width, height))
                .inflate(-half, -half)
                .contains(local)
        }
        Geometry::Line { .. } | Geometry::Text { .. } => false,
    }
}

fn pixel_bounds(shape: &Shape) -> Option<Rect> {
    let pad = shape.stroke.as_ref().map_or(0.0, |s| s.width / 2.0) + 1.0;
    let bounds = match shape.geometry {
        Geometry::Line { from, to } => Rect::from_points(from, to),
        Geometry::Circle { center, radius } => Rect::from_center_size(center, (radius * 2.0, radius * 2.0)),
        Geometry::Rect {
            width,
            height,
            ..
        } => {
            let local = Rect::from_center_size(Point::ORIGIN, (width, height));
            (shape.geometry.local_transform() * local.to_path(0.1)).bounding_box()
        }
        Geometry::Text { .. } => return None,
    };
    Some(bounds.inflate(pad, pad))
}

fn blend(pixel: &mut Rgb<u8>, color: Rgba, opacity: f64) {
    let alpha = (f64::from(color.a) / 255.0) * opacity.clamp(0.0, 1.0);
    let mix = |dst: u8, src: u8| (f64::from(src) * alpha + f64::from(dst) * (1.0 - alpha)).round() as u8;
    let [r, g, b] = pixel.0;
    pixel.0 = [mix(r, color.r), mix(g, color.g), mix(b, color.b)];
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use fp_core::{ManualContainer, ScaleEngine, Wall, Zone};
    use crate::build::walls_layer;
    use crate::surface::LayerKind;
    use pretty_assertions::assert_eq;

    fn surface_with_wall() -> (Surface, CanvasTheme) {
        let zone = Zone::new("z-preview", "Hall", 10.0, 5.0);
        let engine = ScaleEngine::new();
        let container = ManualContainer::new(400.0);
        engine.initialize(&container, &zone);
        let theme = CanvasTheme::light();
        let mut surface = Surface::create(&zone, &engine).unwrap();
        let wall = Wall::between(fp_core::Point::new(1.0, 2.5), fp_core::Point::new(9.0, 2.5));
        surface
            .layer_mut(LayerKind::Walls)
            .replace(walls_layer(&[wall], engine.scale_factor(), &theme));
        (surface, theme)
    }

    #[test]
    fn downscales_by_pixel_ratio() {
        let (surface, theme) = surface_with_wall();
        let image = rasterize(&surface, &theme, 0.5);
        assert_eq!(image.dimensions(), (200, 100));
    }

    #[test]
    fn walls_are_painted() {
        let (surface, theme) = surface_with_wall();
        let image = rasterize(&surface, &theme, 0.5);
        // wall runs along y = 2.5 m = 100 px → 50 px in the preview
        let on_wall = image.get_pixel(100, 50);
        assert_eq!(on_wall.0, [theme.wall.r, theme.wall.g, theme.wall.b]);
        let empty = image.get_pixel(100, 20);
        assert_eq!(empty.0, [255, 255, 255]);
    }

    #[test]
    fn data_url_is_jpeg() {
        let (surface, theme) = surface_with_wall();
        let url = snapshot_data_url(&surface, &theme, &PreviewConfig::default()).unwrap();
        assert!(url.starts_with(DATA_URL_PREFIX));
        let bytes = STANDARD.decode(&url[DATA_URL_PREFIX.len()..]).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
