pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod memory;
pub mod model;
pub mod provider;
pub mod scale;

pub use config::{EditorConfig, PreviewConfig, SnapConfig};
pub use error::{ModelError, ProviderError};
pub use geometry::{Point, angle_deg, normalize_degrees, snap_to_axis, snap_to_grid};
pub use id::TableId;
pub use memory::InMemoryBackend;
pub use model::*;
pub use provider::{BlueprintProvider, ProviderResult, ReservationProvider, ZoneProvider};
pub use scale::{
    ContainerGeometry, ManualContainer, ResizeCallback, ResizeObservation, ScaleAware, ScaleEngine,
    StageDimensions, Subscription, WeakScaleEngine, bind,
};
