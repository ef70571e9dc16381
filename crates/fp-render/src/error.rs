use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The container has not been measured yet, or the zone has no area.
    /// Retry once the container reports a positive width.
    #[error("container not ready: width {container_width}px, zone {zone_width}m × {zone_height}m")]
    ContainerNotReady {
        container_width: f64,
        zone_width: f64,
        zone_height: f64,
    },

    #[error("surface has been disposed")]
    Disposed,

    #[error("preview encoding failed: {0}")]
    PreviewEncode(#[from] image::ImageError),
}
