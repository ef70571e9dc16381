//! In-memory reference backend for the collaborator traits.
//!
//! Implements the same observable contract as the REST service: full-replace
//! layout saves, advisory zone locks with a distinct conflict error, blueprint
//! CRUD, and availability computed from stored reservations. Cloning a
//! backend shares the store; [`InMemoryBackend::as_editor`] gives a handle
//! acting on behalf of a different editor, which is how lock conflicts are
//! exercised.

use crate::error::ProviderError;
use crate::id::TableId;
use crate::model::{
    Blueprint, BlueprintDraft, BlueprintLayout, Booking, Reservation, ReservationStatus, Table,
    Zone,
};
use crate::provider::{BlueprintProvider, ProviderResult, ReservationProvider, ZoneProvider};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Length of a reservation slot when the booking does not say otherwise.
pub const DEFAULT_RESERVATION_MINUTES: u32 = 120;

#[derive(Default)]
struct Store {
    /// zone id → (branch id, zone)
    zones: BTreeMap<String, (String, Zone)>,
    blueprints: BTreeMap<String, Blueprint>,
    /// zone id → editor holding the lock
    locks: HashMap<String, String>,
    /// (zone id, reservation)
    reservations: Vec<(String, Reservation)>,
}

#[derive(Clone)]
pub struct InMemoryBackend {
    store: Rc<RefCell<Store>>,
    editor: String,
}

impl InMemoryBackend {
    pub fn new(editor: impl Into<String>) -> Self {
        Self {
            store: Rc::new(RefCell::new(Store::default())),
            editor: editor.into(),
        }
    }

    /// A handle on the same store acting as another editor.
    pub fn as_editor(&self, editor: impl Into<String>) -> Self {
        Self {
            store: Rc::clone(&self.store),
            editor: editor.into(),
        }
    }

    pub fn editor(&self) -> &str {
        &self.editor
    }

    pub fn insert_zone(&self, branch_id: impl Into<String>, zone: Zone) {
        self.store
            .borrow_mut()
            .zones
            .insert(zone.id.clone(), (branch_id.into(), zone));
    }

    pub fn insert_blueprint(&self, blueprint: Blueprint) {
        self.store
            .borrow_mut()
            .blueprints
            .insert(blueprint.id.clone(), blueprint);
    }

    fn ensure_not_locked_by_other(store: &Store, zone_id: &str, editor: &str) -> ProviderResult<()> {
        match store.locks.get(zone_id) {
            Some(holder) if holder != editor => Err(ProviderError::AlreadyLocked {
                zone_id: zone_id.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn zone_not_found(id: &str) -> ProviderError {
    ProviderError::NotFound {
        kind: "zone",
        id: id.to_string(),
    }
}

fn blueprint_not_found(id: &str) -> ProviderError {
    ProviderError::NotFound {
        kind: "blueprint",
        id: id.to_string(),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

// ─── Zones ────────────────────────────────────────────────────────────────

impl ZoneProvider for InMemoryBackend {
    fn get_zone(&self, id: &str) -> ProviderResult<Zone> {
        self.store
            .borrow()
            .zones
            .get(id)
            .map(|(_, zone)| zone.clone())
            .ok_or_else(|| zone_not_found(id))
    }

    fn zones_by_branch(&self, branch_id: &str) -> ProviderResult<Vec<Zone>> {
        Ok(self
            .store
            .borrow()
            .zones
            .values()
            .filter(|(branch, _)| branch == branch_id)
            .map(|(_, zone)| zone.clone())
            .collect())
    }

    fn save_layout(&self, id: &str, tables: Vec<Table>) -> ProviderResult<Zone> {
        let mut store = self.store.borrow_mut();
        Self::ensure_not_locked_by_other(&store, id, &self.editor)?;
        let (_, zone) = store.zones.get_mut(id).ok_or_else(|| zone_not_found(id))?;
        zone.replace_tables(tables);
        log::debug!("zone `{id}` layout saved ({} tables)", zone.tables.len());
        Ok(zone.clone())
    }

    fn lock_zone(&self, id: &str) -> ProviderResult<()> {
        let mut store = self.store.borrow_mut();
        if !store.zones.contains_key(id) {
            return Err(zone_not_found(id));
        }
        Self::ensure_not_locked_by_other(&store, id, &self.editor)?;
        store.locks.insert(id.to_string(), self.editor.clone());
        Ok(())
    }

    fn unlock_zone(&self, id: &str) -> ProviderResult<()> {
        let mut store = self.store.borrow_mut();
        match store.locks.get(id) {
            Some(holder) if *holder == self.editor => {
                store.locks.remove(id);
                Ok(())
            }
            _ => Err(ProviderError::NotLocked {
                zone_id: id.to_string(),
            }),
        }
    }

    fn instantiate_blueprint(
        &self,
        blueprint_id: &str,
        branch_id: &str,
        name: &str,
    ) -> ProviderResult<Zone> {
        if name.trim().is_empty() {
            return Err(ProviderError::Rejected("zone name is required".into()));
        }
        let mut store = self.store.borrow_mut();
        let blueprint = store
            .blueprints
            .get(blueprint_id)
            .ok_or_else(|| blueprint_not_found(blueprint_id))?;

        let mut zone = Zone::new(
            uuid::Uuid::new_v4().to_string(),
            name.trim(),
            blueprint.width,
            blueprint.height,
        );
        zone.walls = blueprint.walls.clone();
        zone.tables = blueprint
            .furniture_layout
            .iter()
            .map(|t| Table {
                id: TableId::generate(),
                ..t.clone()
            })
            .collect();

        store
            .zones
            .insert(zone.id.clone(), (branch_id.to_string(), zone.clone()));
        Ok(zone)
    }
}

// ─── Blueprints ───────────────────────────────────────────────────────────

impl BlueprintProvider for InMemoryBackend {
    fn get_all(&self) -> ProviderResult<Vec<Blueprint>> {
        Ok(self.store.borrow().blueprints.values().cloned().collect())
    }

    fn get_one(&self, id: &str) -> ProviderResult<Blueprint> {
        self.store
            .borrow()
            .blueprints
            .get(id)
            .cloned()
            .ok_or_else(|| blueprint_not_found(id))
    }

    fn create(&self, draft: BlueprintDraft) -> ProviderResult<Blueprint> {
        if draft.name.trim().is_empty() {
            return Err(ProviderError::Rejected("blueprint name is required".into()));
        }
        if !(draft.width > 0.0 && draft.height > 0.0) {
            return Err(ProviderError::Rejected(format!(
                "blueprint dimensions must be positive, got {} x {}",
                draft.width, draft.height
            )));
        }
        let stamp = now();
        let blueprint = Blueprint {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            width: draft.width,
            height: draft.height,
            walls: Vec::new(),
            furniture_layout: Vec::new(),
            preview_image_url: None,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        self.insert_blueprint(blueprint.clone());
        Ok(blueprint)
    }

    fn update_layout(&self, id: &str, layout: &BlueprintLayout) -> ProviderResult<Blueprint> {
        let mut store = self.store.borrow_mut();
        let blueprint = store
            .blueprints
            .get_mut(id)
            .ok_or_else(|| blueprint_not_found(id))?;
        blueprint.walls = layout.walls.clone();
        blueprint.preview_image_url = Some(layout.preview_image.clone());
        blueprint.updated_at = now();
        Ok(blueprint.clone())
    }

    fn delete(&self, id: &str) -> ProviderResult<()> {
        self.store
            .borrow_mut()
            .blueprints
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| blueprint_not_found(id))
    }
}

// ─── Reservations ─────────────────────────────────────────────────────────

/// Parse the datetime formats hosts send: RFC 3339 (`...Z`), or a naive
/// `YYYY-MM-DDTHH:mm[:ss]`.
fn parse_datetime(value: &str) -> ProviderResult<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ProviderError::Rejected(format!("invalid datetime `{value}`")))
}

fn reservation_window(r: &Reservation) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDateTime::parse_from_str(
        &format!("{}T{}", r.reservation_date, r.start_time),
        "%Y-%m-%dT%H:%M",
    )
    .ok()?;
    let end = start + chrono::Duration::minutes(i64::from(r.duration_minutes));
    Some((start, end))
}

impl InMemoryBackend {
    /// Tables of live reservations in `zone_id` whose window satisfies `hits`.
    fn reserved_tables(
        store: &Store,
        zone_id: &str,
        hits: impl Fn(NaiveDateTime, NaiveDateTime) -> bool,
    ) -> Vec<TableId> {
        let mut reserved: Vec<TableId> = Vec::new();
        for (zone, reservation) in &store.reservations {
            if zone != zone_id || reservation.status == ReservationStatus::Cancelled {
                continue;
            }
            let Some((start, end)) = reservation_window(reservation) else {
                continue;
            };
            if hits(start, end) {
                for id in &reservation.table_ids {
                    if !reserved.contains(id) {
                        reserved.push(*id);
                    }
                }
            }
        }
        reserved
    }

    fn occupied_at(store: &Store, zone_id: &str, at: NaiveDateTime) -> Vec<TableId> {
        Self::reserved_tables(store, zone_id, |start, end| start <= at && at < end)
    }

    /// Tables held by any reservation overlapping `[from, to)`.
    fn booked_during(store: &Store, zone_id: &str, from: NaiveDateTime, to: NaiveDateTime) -> Vec<TableId> {
        Self::reserved_tables(store, zone_id, |start, end| start < to && from < end)
    }
}

impl ReservationProvider for InMemoryBackend {
    fn availability(&self, zone_id: &str, datetime: &str) -> ProviderResult<Vec<TableId>> {
        let at = parse_datetime(datetime)?;
        let store = self.store.borrow();
        if !store.zones.contains_key(zone_id) {
            return Err(zone_not_found(zone_id));
        }
        Ok(Self::occupied_at(&store, zone_id, at))
    }

    fn create(&self, booking: &Booking) -> ProviderResult<Reservation> {
        if booking.table_ids.is_empty() {
            return Err(ProviderError::Rejected("select at least one table".into()));
        }
        if booking.customer_name.trim().is_empty() || booking.customer_email.trim().is_empty() {
            return Err(ProviderError::Rejected(
                "customer name and email are required".into(),
            ));
        }
        let at = parse_datetime(&booking.datetime)?;

        let mut store = self.store.borrow_mut();
        let (_, zone) = store
            .zones
            .get(&booking.zone_id)
            .ok_or_else(|| zone_not_found(&booking.zone_id))?;
        if let Some(unknown) = booking.table_ids.iter().find(|id| zone.table(**id).is_none()) {
            return Err(ProviderError::NotFound {
                kind: "table",
                id: unknown.to_string(),
            });
        }
        let until = at + chrono::Duration::minutes(i64::from(DEFAULT_RESERVATION_MINUTES));
        let booked = Self::booked_during(&store, &booking.zone_id, at, until);
        if let Some(taken) = booking.table_ids.iter().find(|id| booked.contains(id)) {
            return Err(ProviderError::Rejected(format!(
                "table `{taken}` is already reserved"
            )));
        }

        let reservation = Reservation {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: booking.customer_name.trim().to_string(),
            reservation_date: at.format("%Y-%m-%d").to_string(),
            start_time: at.format("%H:%M").to_string(),
            duration_minutes: DEFAULT_RESERVATION_MINUTES,
            table_ids: booking.table_ids.clone(),
            status: ReservationStatus::Confirmed,
        };
        store
            .reservations
            .push((booking.zone_id.clone(), reservation.clone()));
        Ok(reservation)
    }
}
