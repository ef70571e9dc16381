//! Floor-plan data model.
//!
//! Everything physical is expressed in meters: zone extents, wall
//! endpoints, table positions and sizes. Pixels only exist on the far side
//! of the [`ScaleEngine`](crate::scale::ScaleEngine). Field names serialize
//! in camelCase to match the REST collaborators.

use crate::error::ModelError;
use crate::geometry::{Point, angle_deg, normalize_degrees};
use crate::id::TableId;
use serde::{Deserialize, Serialize};

// ─── Walls ────────────────────────────────────────────────────────────────

/// A straight wall segment in meters.
///
/// `length` and `angle` are derived from the endpoints when the wall is
/// built with [`Wall::between`]; they are stored so the persisted form is
/// self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub length: f64,
    /// Degrees in [0, 360).
    pub angle: f64,
}

impl Wall {
    pub fn between(start: Point, end: Point) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            length: start.distance(end),
            angle: angle_deg(start, end),
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

// ─── Tables ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Rect,
    Circle,
}

/// A placeable table. `(x, y)` is the shape's center, not its top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    /// Human code such as `M-01`, assigned by the host.
    pub code: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees in [0, 360).
    #[serde(default)]
    pub rotation: f64,
    pub seats: u32,
    #[serde(default)]
    pub shape: TableShape,
}

impl Table {
    /// Code carried by drop-created tables until the host assigns one.
    pub const PLACEHOLDER_CODE: &'static str = "NEW";

    /// Copy of this table moved to a new center position.
    pub fn with_position(&self, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// Copy of this table rotated by `delta_deg`, normalized into [0, 360).
    pub fn rotated_by(&self, delta_deg: f64) -> Self {
        Self {
            rotation: normalize_degrees(self.rotation + delta_deg),
            ..self.clone()
        }
    }
}

/// Descriptor carried by an external palette drag into the table canvas.
///
/// Wire form: `{"shape":"circle","seats":4,"width":1,"height":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FurnitureDescriptor {
    pub shape: TableShape,
    pub seats: u32,
    pub width: f64,
    pub height: f64,
}

impl FurnitureDescriptor {
    /// Parse and validate a JSON drag payload.
    pub fn from_json(payload: &str) -> Result<Self, ModelError> {
        let descriptor: Self = serde_json::from_str(payload)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ModelError::InvalidFurnitureDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.seats == 0 {
            return Err(ModelError::NoSeats);
        }
        Ok(())
    }

    /// Instantiate a table centered at `(x, y)` meters with a fresh id,
    /// a placeholder code and no rotation.
    pub fn place_at(&self, x: f64, y: f64) -> Table {
        Table {
            id: TableId::generate(),
            code: Table::PLACEHOLDER_CODE.to_string(),
            x,
            y,
            width: self.width,
            height: self.height,
            rotation: 0.0,
            seats: self.seats,
            shape: self.shape,
        }
    }
}

// ─── Zones ────────────────────────────────────────────────────────────────

/// A physical area (room, terrace) with real-world dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            height,
            background_image_url: None,
            tables: Vec::new(),
            walls: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            Err(ModelError::InvalidZoneDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Full replace of the table collection.
    pub fn replace_tables(&mut self, tables: Vec<Table>) {
        self.tables = tables;
    }

    /// Full replace of the wall collection.
    pub fn replace_walls(&mut self, walls: Vec<Wall>) {
        self.walls = walls;
    }

    /// Next sequential code for this zone: one past the highest numeric
    /// suffix among codes with the given prefix, zero-padded to two digits.
    pub fn next_table_code(&self, prefix: &str) -> String {
        let lead = format!("{prefix}-");
        let highest = self
            .tables
            .iter()
            .filter_map(|t| t.code.strip_prefix(&lead))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{prefix}-{:02}", highest + 1)
    }
}

// ─── Blueprints ───────────────────────────────────────────────────────────

/// A reusable wall layout from which zones are instantiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub furniture_layout: Vec<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Fields required to create a blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub width: f64,
    pub height: f64,
}

/// Save payload produced by the blueprint editor: walls plus a preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintLayout {
    pub walls: Vec<Wall>,
    /// `data:image/jpeg;base64,...`
    pub preview_image: String,
}

// ─── Reservations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Pending,
}

/// A reservation blocks one or more tables for a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub client_name: String,
    /// ISO date (`YYYY-MM-DD`).
    pub reservation_date: String,
    /// `HH:mm`.
    pub start_time: String,
    pub duration_minutes: u32,
    pub table_ids: Vec<TableId>,
    pub status: ReservationStatus,
}

/// Booking request sent by the client screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub zone_id: String,
    pub table_ids: Vec<TableId>,
    /// ISO date-time (`YYYY-MM-DDTHH:mm`).
    pub datetime: String,
    pub customer_name: String,
    pub customer_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(code: &str) -> Table {
        Table {
            id: TableId::generate(),
            code: code.to_string(),
            x: 1.0,
            y: 1.0,
            width: 1.0,
            height: 1.0,
            rotation: 0.0,
            seats: 4,
            shape: TableShape::Rect,
        }
    }

    #[test]
    fn wall_derives_length_and_angle() {
        let wall = Wall::between(Point::new(0.0, 0.0), Point::new(0.0, 3.0));
        assert_eq!(wall.length, 3.0);
        assert!((wall.angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_is_normalized() {
        let mut t = table("M-01");
        for _ in 0..9 {
            t = t.rotated_by(45.0);
        }
        assert!((t.rotation - 45.0).abs() < 1e-9);
        assert!((t.rotated_by(-90.0).rotation - 315.0).abs() < 1e-9);
    }

    #[test]
    fn zone_rejects_non_positive_dimensions() {
        assert!(Zone::new("z", "Terrace", 10.0, 0.0).validate().is_err());
        assert!(Zone::new("z", "Terrace", 10.0, 8.0).validate().is_ok());
    }

    #[test]
    fn next_code_follows_highest_suffix() {
        let mut zone = Zone::new("z", "Hall", 10.0, 10.0);
        assert_eq!(zone.next_table_code("M"), "M-01");
        zone.tables = vec![table("M-01"), table("M-07"), table("VIP")];
        assert_eq!(zone.next_table_code("M"), "M-08");
    }

    #[test]
    fn descriptor_parses_palette_payload() {
        let d = FurnitureDescriptor::from_json(r#"{"shape":"circle","seats":4,"width":1,"height":1}"#)
            .unwrap();
        assert_eq!(d.shape, TableShape::Circle);
        assert_eq!(d.seats, 4);

        let t = d.place_at(2.3, 2.3);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.code, Table::PLACEHOLDER_CODE);
        assert_eq!((t.x, t.y), (2.3, 2.3));
    }

    #[test]
    fn descriptor_rejects_bad_payloads() {
        assert!(matches!(
            FurnitureDescriptor::from_json("not json"),
            Err(ModelError::Payload(_))
        ));
        assert!(matches!(
            FurnitureDescriptor::from_json(r#"{"shape":"rect","seats":2,"width":0,"height":1}"#),
            Err(ModelError::InvalidFurnitureDimensions { .. })
        ));
        assert!(matches!(
            FurnitureDescriptor::from_json(r#"{"shape":"rect","seats":0,"width":1,"height":1}"#),
            Err(ModelError::NoSeats)
        ));
    }

    #[test]
    fn zone_json_uses_camel_case() {
        let json = r#"{
            "id": "zone-1", "name": "Salon", "width": 15, "height": 10,
            "backgroundImageUrl": "https://cdn/x.png",
            "tables": [{"id":"t1","code":"M-01","x":1,"y":1,"width":1,"height":1,"rotation":0,"seats":4,"shape":"rect"}]
        }"#;
        let zone: Zone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.background_image_url.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(zone.tables[0].id, TableId::intern("t1"));
        assert!(zone.walls.is_empty());
    }
}
