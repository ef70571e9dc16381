//! Error types shared across the floor-plan crates.
//!
//! Degenerate gestures (accidental clicks, zero-length walls) are not
//! errors and never show up here; they are silently discarded by the tools.

use thiserror::Error;

/// Invalid domain data handed to the core.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("zone dimensions must be positive, got {width} x {height} m")]
    InvalidZoneDimensions { width: f64, height: f64 },

    #[error("furniture dimensions must be positive, got {width} x {height} m")]
    InvalidFurnitureDimensions { width: f64, height: f64 },

    #[error("furniture must seat at least one person")]
    NoSeats,

    #[error("malformed furniture payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure reported by a collaborator (zone, blueprint, reservation provider).
///
/// The core never handles these; they propagate to the host, which decides
/// on messaging and retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    /// Another editor holds the advisory lock (HTTP 409 equivalent).
    #[error("zone `{zone_id}` is already locked by another editor")]
    AlreadyLocked { zone_id: String },

    #[error("zone `{zone_id}` is not locked by this editor")]
    NotLocked { zone_id: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl ProviderError {
    /// True for the distinct lock-conflict condition.
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, Self::AlreadyLocked { .. })
    }
}
