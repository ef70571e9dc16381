//! Collaborator contracts.
//!
//! The core never performs network I/O. Hosts implement these traits over
//! their REST client (or use [`InMemoryBackend`](crate::memory::InMemoryBackend))
//! and call them in response to events emitted by the editor components.
//! Failures are returned untouched for the host to surface.

use crate::error::ProviderError;
use crate::id::TableId;
use crate::model::{Blueprint, BlueprintDraft, BlueprintLayout, Booking, Reservation, Table, Zone};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Zones: dimensions, walls and tables, plus advisory edit locks.
pub trait ZoneProvider {
    fn get_zone(&self, id: &str) -> ProviderResult<Zone>;

    fn zones_by_branch(&self, branch_id: &str) -> ProviderResult<Vec<Zone>>;

    /// Full replace of the zone's tables.
    fn save_layout(&self, id: &str, tables: Vec<Table>) -> ProviderResult<Zone>;

    /// Take the exclusive-edit token.
    ///
    /// Fails with [`ProviderError::AlreadyLocked`] when another editor holds it.
    fn lock_zone(&self, id: &str) -> ProviderResult<()>;

    fn unlock_zone(&self, id: &str) -> ProviderResult<()>;

    /// Create a zone in `branch_id` from a blueprint's walls and dimensions.
    fn instantiate_blueprint(
        &self,
        blueprint_id: &str,
        branch_id: &str,
        name: &str,
    ) -> ProviderResult<Zone>;
}

pub trait BlueprintProvider {
    fn get_all(&self) -> ProviderResult<Vec<Blueprint>>;

    fn get_one(&self, id: &str) -> ProviderResult<Blueprint>;

    fn create(&self, draft: BlueprintDraft) -> ProviderResult<Blueprint>;

    /// Store the wall list and preview produced by the blueprint editor.
    fn update_layout(&self, id: &str, layout: &BlueprintLayout) -> ProviderResult<Blueprint>;

    fn delete(&self, id: &str) -> ProviderResult<()>;
}

pub trait ReservationProvider {
    /// Ids of the tables in `zone_id` that are occupied at `datetime`
    /// (`YYYY-MM-DDTHH:mm`).
    fn availability(&self, zone_id: &str, datetime: &str) -> ProviderResult<Vec<TableId>>;

    fn create(&self, booking: &Booking) -> ProviderResult<Reservation>;
}
