//! Host-side helpers that turn canvas events into collaborator calls.
//!
//! [`LayoutSession`] backs the admin furniture editor: it holds the zone's
//! edit lock, assigns table codes, and saves the layout as a full replace.
//! [`BookingSelection`] backs the client booking screen: occupied tables,
//! the customer's picks, and the booking request.

use crate::canvas::TableEvent;
use fp_core::{
    Booking, ProviderError, ProviderResult, Reservation, ReservationProvider, Table, TableId, Zone,
    ZoneProvider,
};
use std::collections::HashSet;

// ─── Layout session ──────────────────────────────────────────────────────

pub struct LayoutSession {
    zone: Zone,
    code_prefix: String,
    selected: Option<TableId>,
    dirty: bool,
}

impl LayoutSession {
    /// A session over already-loaded zone data, without taking the lock.
    pub fn new(zone: Zone, code_prefix: impl Into<String>) -> Self {
        Self {
            zone,
            code_prefix: code_prefix.into(),
            selected: None,
            dirty: false,
        }
    }

    /// Lock the zone for editing, then load it.
    ///
    /// A lock held by someone else surfaces as
    /// [`ProviderError::AlreadyLocked`].
    pub fn open(provider: &dyn ZoneProvider, zone_id: &str, code_prefix: impl Into<String>) -> ProviderResult<Self> {
        provider.lock_zone(zone_id)?;
        match provider.get_zone(zone_id) {
            Ok(zone) => Ok(Self::new(zone, code_prefix)),
            Err(err) => {
                if let Err(unlock) = provider.unlock_zone(zone_id) {
                    log::warn!("failed to release lock on `{zone_id}`: {unlock}");
                }
                Err(err)
            }
        }
    }

    /// Release the edit lock.
    pub fn close(self, provider: &dyn ZoneProvider) -> ProviderResult<()> {
        provider.unlock_zone(&self.zone.id)
    }

    /// Fold a canvas event into the local layout. Returns the stored table.
    pub fn apply(&mut self, event: &TableEvent) -> Option<&Table> {
        match event {
            TableEvent::Added(table) => {
                let code = self.zone.next_table_code(&self.code_prefix);
                self.zone.tables.push(Table {
                    code,
                    ..table.clone()
                });
                self.dirty = true;
                self.zone.tables.last()
            }
            TableEvent::Updated(table) => {
                let slot = self.zone.tables.iter_mut().find(|t| t.id == table.id)?;
                *slot = table.clone();
                self.dirty = true;
                Some(&*slot)
            }
            TableEvent::Selected(table) => {
                self.selected = Some(table.id);
                self.zone.table(table.id)
            }
        }
    }

    /// Remove a table. Returns whether it existed.
    pub fn delete(&mut self, id: TableId) -> bool {
        let before = self.zone.tables.len();
        self.zone.tables.retain(|t| t.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        let removed = self.zone.tables.len() != before;
        self.dirty |= removed;
        removed
    }

    /// Persist every table as a full replace and adopt the stored zone.
    pub fn save(&mut self, provider: &dyn ZoneProvider) -> ProviderResult<&Zone> {
        let saved = provider.save_layout(&self.zone.id, self.zone.tables.clone())?;
        self.zone = saved;
        self.dirty = false;
        Ok(&self.zone)
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn tables(&self) -> &[Table] {
        &self.zone.tables
    }

    pub fn selected(&self) -> Option<&Table> {
        self.zone.table(self.selected?)
    }

    /// Whether there are changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// ─── Booking selection ───────────────────────────────────────────────────

pub struct BookingSelection {
    zone_id: String,
    tables: Vec<Table>,
    datetime: Option<String>,
    occupied: HashSet<TableId>,
    selected: Vec<TableId>,
}

impl BookingSelection {
    pub fn new(zone: &Zone) -> Self {
        Self {
            zone_id: zone.id.clone(),
            tables: zone.tables.clone(),
            datetime: None,
            occupied: HashSet::new(),
            selected: Vec::new(),
        }
    }

    /// Fetch the occupied set for `datetime`. Clears the current picks.
    pub fn refresh(&mut self, provider: &dyn ReservationProvider, datetime: &str) -> ProviderResult<()> {
        let occupied = provider.availability(&self.zone_id, datetime)?;
        self.datetime = Some(datetime.to_string());
        self.set_occupied(occupied);
        Ok(())
    }

    /// Replace the occupied set. Clears the current picks.
    pub fn set_occupied(&mut self, ids: impl IntoIterator<Item = TableId>) {
        self.occupied = ids.into_iter().collect();
        self.selected.clear();
    }

    /// Toggle a table in or out of the selection. Occupied tables are
    /// never selected. Returns whether the table is now selected.
    pub fn toggle(&mut self, id: TableId) -> bool {
        if self.occupied.contains(&id) {
            return false;
        }
        match self.selected.iter().position(|s| *s == id) {
            Some(pos) => {
                self.selected.remove(pos);
                false
            }
            None => {
                self.selected.push(id);
                true
            }
        }
    }

    /// Fold a canvas event in: selections toggle, everything else is ignored.
    pub fn apply(&mut self, event: &TableEvent) -> bool {
        match event {
            TableEvent::Selected(table) => self.toggle(table.id),
            TableEvent::Added(_) | TableEvent::Updated(_) => false,
        }
    }

    pub fn occupied(&self) -> &HashSet<TableId> {
        &self.occupied
    }

    pub fn selected(&self) -> &[TableId] {
        &self.selected
    }

    /// Sum of seats over the selected tables.
    pub fn total_capacity(&self) -> u32 {
        self.tables
            .iter()
            .filter(|t| self.selected.contains(&t.id))
            .map(|t| t.seats)
            .sum()
    }

    /// Build the booking request for the current selection.
    pub fn booking(&self, customer_name: &str, customer_email: &str) -> ProviderResult<Booking> {
        if self.selected.is_empty() {
            return Err(ProviderError::Rejected("select at least one table".into()));
        }
        let datetime = self
            .datetime
            .clone()
            .ok_or_else(|| ProviderError::Rejected("pick a date and time first".into()))?;
        Ok(Booking {
            zone_id: self.zone_id.clone(),
            table_ids: self.selected.clone(),
            datetime,
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
        })
    }

    /// Create the reservation, then refresh availability so the booked
    /// tables show as occupied.
    pub fn submit(
        &mut self,
        provider: &dyn ReservationProvider,
        customer_name: &str,
        customer_email: &str,
    ) -> ProviderResult<Reservation> {
        let booking = self.booking(customer_name, customer_email)?;
        let reservation = provider.create(&booking)?;
        self.refresh(provider, &booking.datetime)?;
        Ok(reservation)
    }
}
