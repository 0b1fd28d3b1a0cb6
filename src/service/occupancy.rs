//! Resident check-in / check-out. The store never derives counters, so these
//! operations update the room's occupancy, bed and availability fields themselves.

use crate::entity::EntityType;
use crate::error::StoreError;
use crate::store::EntityStore;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OccupancyChange {
    pub occupant: Value,
    pub room: Value,
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn counter(room: &Value, pointer: &str) -> u64 {
    room.pointer(pointer).and_then(Value::as_u64).unwrap_or(0)
}

/// Copy of an object-valued room field; absent or null reads as empty.
fn nested_object(room: &Value, key: &str, room_id: &str) -> Result<Map<String, Value>, StoreError> {
    match room.get(key) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(fields)) => Ok(fields.clone()),
        Some(_) => Err(StoreError::InvalidRecord(format!(
            "room {} has a non-object {} field",
            room_id, key
        ))),
    }
}

fn unavailable(room_id: &str, reason: &str) -> StoreError {
    StoreError::RoomUnavailable {
        room_id: room_id.to_string(),
        reason: reason.to_string(),
    }
}

pub fn check_in(store: &mut EntityStore, room_id: &str, occupant: Value) -> Result<OccupancyChange, StoreError> {
    let Value::Object(mut occupant) = occupant else {
        return Err(StoreError::InvalidRecord("occupant must be a JSON object".into()));
    };
    let room = store.read(EntityType::Room, room_id)?;
    if room.pointer("/availability/status").and_then(Value::as_str) == Some("maintenance") {
        return Err(unavailable(room_id, "room is under maintenance"));
    }
    let current = counter(&room, "/occupancy/currentOccupancy");
    let max = counter(&room, "/occupancy/maxOccupancy");
    if current >= max {
        return Err(unavailable(room_id, "room is full"));
    }

    let mut beds = room.get("beds").cloned();
    let bed_slot = beds
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|b| b.iter().position(|bed| bed.get("status").and_then(Value::as_str) == Some("available")));

    occupant.insert("roomId".into(), Value::String(room_id.to_string()));
    for key in ["hostelId", "floorId"] {
        if let Some(v) = room.get(key) {
            occupant.insert(key.into(), v.clone());
        }
    }
    occupant.insert("status".into(), json!("active"));
    occupant.entry("checkInDate").or_insert_with(|| Value::String(today()));
    if let (Some(slot), Some(Value::Array(list))) = (bed_slot, beds.as_ref()) {
        if let Some(number) = list[slot].get("bedNumber") {
            occupant.insert("bedNumber".into(), number.clone());
        }
    }
    let mut occupancy = nested_object(&room, "occupancy", room_id)?;
    let mut availability = nested_object(&room, "availability", room_id)?;

    let occupant = store.create(EntityType::Occupant, Value::Object(occupant))?;
    let occupant_id = occupant["id"].as_str().unwrap_or_default().to_string();

    occupancy.insert("currentOccupancy".into(), json!(current + 1));
    let mut patch = Map::new();
    patch.insert("occupancy".into(), Value::Object(occupancy));
    if let (Some(slot), Some(Value::Array(list))) = (bed_slot, beds.as_mut()) {
        if let Some(Value::Object(bed)) = list.get_mut(slot) {
            bed.insert("status".into(), json!("occupied"));
            bed.insert("occupantId".into(), json!(occupant_id));
        }
        patch.insert("beds".into(), Value::Array(list.clone()));
    }
    if current + 1 >= max {
        availability.insert("status".into(), json!("occupied"));
        patch.insert("availability".into(), Value::Object(availability));
    }
    let patch = Value::Object(patch);

    let room = match store.update(EntityType::Room, room_id, patch) {
        Ok(room) => room,
        Err(e) => {
            // Keep collections consistent: the occupant only exists if the room took them.
            let _ = store.delete(EntityType::Occupant, &occupant_id);
            return Err(e);
        }
    };
    tracing::info!(room_id = %room_id, occupant_id = %occupant_id, "checked in");
    Ok(OccupancyChange { occupant, room })
}

pub fn check_out(store: &mut EntityStore, occupant_id: &str) -> Result<OccupancyChange, StoreError> {
    let occupant = store.read(EntityType::Occupant, occupant_id)?;
    if occupant.get("status").and_then(Value::as_str) == Some("checked-out") {
        return Err(StoreError::InvalidRecord(format!(
            "occupant {} is already checked out",
            occupant_id
        )));
    }
    let room_id = occupant
        .get("roomId")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidRecord(format!("occupant {} has no room", occupant_id)))?
        .to_string();
    let room = store.read(EntityType::Room, &room_id)?;

    let current = counter(&room, "/occupancy/currentOccupancy");
    let mut occupancy = nested_object(&room, "occupancy", &room_id)?;
    let mut availability = nested_object(&room, "availability", &room_id)?;
    occupancy.insert("currentOccupancy".into(), json!(current.saturating_sub(1)));
    let mut patch = Map::new();
    patch.insert("occupancy".into(), Value::Object(occupancy));
    if let Some(Value::Array(mut beds)) = room.get("beds").cloned() {
        for bed in beds.iter_mut() {
            if let Value::Object(fields) = bed {
                if fields.get("occupantId").and_then(Value::as_str) == Some(occupant_id) {
                    fields.insert("status".into(), json!("available"));
                    fields.insert("occupantId".into(), Value::Null);
                }
            }
        }
        patch.insert("beds".into(), Value::Array(beds));
    }
    if availability.get("status").and_then(Value::as_str) == Some("occupied") {
        availability.insert("status".into(), json!("available"));
        patch.insert("availability".into(), Value::Object(availability));
    }
    let patch = Value::Object(patch);
    let room = store.update(EntityType::Room, &room_id, patch)?;
    let occupant = store.update(
        EntityType::Occupant,
        occupant_id,
        json!({ "status": "checked-out", "checkOutDate": today() }),
    )?;
    tracing::info!(room_id = %room_id, occupant_id = %occupant_id, "checked out");
    Ok(OccupancyChange { occupant, room })
}
