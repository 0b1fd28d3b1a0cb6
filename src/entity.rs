//! Entity types, their collection names and search fields.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Hostel,
    Floor,
    Room,
    Amenity,
    Occupant,
    Booking,
    Payment,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Hostel,
        EntityType::Floor,
        EntityType::Room,
        EntityType::Amenity,
        EntityType::Occupant,
        EntityType::Booking,
        EntityType::Payment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Hostel => "hostel",
            EntityType::Floor => "floor",
            EntityType::Room => "room",
            EntityType::Amenity => "amenity",
            EntityType::Occupant => "occupant",
            EntityType::Booking => "booking",
            EntityType::Payment => "payment",
        }
    }

    /// Collection key: the pluralized type name.
    pub fn collection(self) -> &'static str {
        match self {
            EntityType::Hostel => "hostels",
            EntityType::Floor => "floors",
            EntityType::Room => "rooms",
            EntityType::Amenity => "amenities",
            EntityType::Occupant => "occupants",
            EntityType::Booking => "bookings",
            EntityType::Payment => "payments",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.collection() == name)
    }

    /// Schema checked on create/update. Occupants, bookings and payments are unvalidated.
    pub fn schema_name(self) -> Option<&'static str> {
        match self {
            EntityType::Hostel | EntityType::Floor | EntityType::Room | EntityType::Amenity => Some(self.as_str()),
            EntityType::Occupant | EntityType::Booking | EntityType::Payment => None,
        }
    }

    /// Fields matched by free-text search.
    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            EntityType::Hostel => &["name", "description", "location.city", "location.state", "location.address"],
            EntityType::Floor => &["name", "description"],
            EntityType::Room => &["roomNumber", "type", "description"],
            EntityType::Amenity => &["name", "category", "type", "description"],
            EntityType::Occupant => &["name", "email", "phone"],
            EntityType::Booking => &["id", "status", "occupantId", "roomId"],
            EntityType::Payment => &["id", "status", "method", "bookingId"],
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = StoreError;

    /// Accepts the singular name or the collection name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower || t.collection() == lower)
            .ok_or_else(|| StoreError::InvalidQuery(format!("unknown entity type: {}", s)))
    }
}
