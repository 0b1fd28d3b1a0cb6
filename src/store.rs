//! In-memory entity store: named collections of JSON records with CRUD, queries,
//! bulk update, statistics and export. Owned by the caller; no global instance.

use crate::entity::EntityType;
use crate::error::{ErrorDetail, StoreError};
use crate::export::{self, ExportFile, ExportFormat};
use crate::query::{self, ListOptions, ListResult};
use crate::schema::{ResolvedSchema, SchemaRegistry};
use crate::service::RecordValidator;
use crate::stats::{self, HostelStatistics};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys the store manages itself; patches cannot overwrite them.
const MANAGED_KEYS: &[&str] = &["id", "timestamps"];

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BulkUpdateItem {
    pub id: String,
    pub data: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkItemResult {
    pub id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Outcome of a best-effort bulk update. Items are applied in order and
/// successful ones stay committed even when a later item fails.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkUpdateReport {
    pub success: bool,
    pub results: Vec<BulkItemResult>,
}

impl BulkUpdateReport {
    pub fn failed(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

#[derive(Clone, Debug)]
pub struct EntityStore {
    registry: SchemaRegistry,
    collections: BTreeMap<EntityType, Vec<Value>>,
}

impl EntityStore {
    /// Empty store validating against `registry`.
    pub fn new(registry: SchemaRegistry) -> Self {
        EntityStore {
            registry,
            collections: BTreeMap::new(),
        }
    }

    /// Empty store using the bundled schema descriptors.
    pub fn with_builtin_schemas() -> Result<Self, StoreError> {
        Ok(Self::new(crate::schema::builtin()?))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn schema(&self, entity_type: EntityType) -> Result<Option<&ResolvedSchema>, StoreError> {
        match entity_type.schema_name() {
            Some(name) => Ok(Some(self.registry.require(name)?)),
            None => Ok(None),
        }
    }

    pub fn collection(&self, entity_type: EntityType) -> &[Value] {
        self.collections
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self, entity_type: EntityType) -> usize {
        self.collection(entity_type).len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Append a record without validation or stamping (seed data).
    pub fn insert_raw(&mut self, entity_type: EntityType, record: Value) -> Result<(), StoreError> {
        if !record.is_object() {
            return Err(StoreError::InvalidRecord(format!(
                "{} record must be a JSON object",
                entity_type
            )));
        }
        self.collections.entry(entity_type).or_default().push(record);
        Ok(())
    }

    pub fn get(&self, entity_type: EntityType, id: &str) -> Option<&Value> {
        self.collection(entity_type).iter().find(|r| record_id(r) == Some(id))
    }

    pub fn create(&mut self, entity_type: EntityType, record: Value) -> Result<Value, StoreError> {
        if !record.is_object() {
            return Err(StoreError::InvalidRecord(format!(
                "{} record must be a JSON object",
                entity_type
            )));
        }
        if let Some(schema) = self.schema(entity_type)? {
            let errors = RecordValidator::validate(&record, schema);
            if !errors.is_empty() {
                tracing::debug!(entity_type = %entity_type, errors = errors.len(), "create rejected");
                return Err(StoreError::ValidationFailed(errors));
            }
        }

        let Value::Object(mut fields) = record else {
            return Err(StoreError::InvalidRecord("record must be a JSON object".into()));
        };
        let id = match fields.remove("id") {
            None | Some(Value::Null) => uuid::Uuid::new_v4().to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => uuid::Uuid::new_v4().to_string(),
            Some(Value::String(s)) => s,
            Some(_) => return Err(StoreError::InvalidRecord("id must be a string".into())),
        };
        let now = format_timestamp(Utc::now());
        fields.insert(
            "timestamps".into(),
            serde_json::json!({ "createdAt": now, "updatedAt": now }),
        );
        let mut stored = Map::with_capacity(fields.len() + 1);
        stored.insert("id".into(), Value::String(id.clone()));
        stored.extend(fields);
        let stored = Value::Object(stored);

        self.collections
            .entry(entity_type)
            .or_default()
            .push(stored.clone());
        tracing::debug!(entity_type = %entity_type, id = %id, "created");
        Ok(stored)
    }

    pub fn read(&self, entity_type: EntityType, id: &str) -> Result<Value, StoreError> {
        self.get(entity_type, id)
            .cloned()
            .ok_or_else(|| not_found(entity_type, id))
    }

    /// Shallow merge: each top-level key in `patch` replaces the stored value.
    pub fn update(&mut self, entity_type: EntityType, id: &str, patch: Value) -> Result<Value, StoreError> {
        if !patch.is_object() {
            return Err(StoreError::InvalidRecord("patch must be a JSON object".into()));
        }
        let schema = self.schema(entity_type)?;
        if let Some(schema) = schema {
            let errors = RecordValidator::validate_partial(&patch, schema);
            if !errors.is_empty() {
                return Err(StoreError::ValidationFailed(errors));
            }
        }

        let position = self
            .collection(entity_type)
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| not_found(entity_type, id))?;
        let existing = &self.collection(entity_type)[position];

        let mut merged = existing.as_object().cloned().unwrap_or_default();
        if let Value::Object(patch_fields) = patch {
            for (k, v) in patch_fields {
                if MANAGED_KEYS.contains(&k.as_str()) {
                    continue;
                }
                merged.insert(k, v);
            }
        }
        let mut merged = Value::Object(merged);
        if let Some(schema) = schema {
            let errors = RecordValidator::check_cross_fields(&merged, schema);
            if !errors.is_empty() {
                return Err(StoreError::ValidationFailed(errors));
            }
        }

        let previous = merged
            .pointer("/timestamps/updatedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));
        let stamp = format_timestamp(next_stamp(previous));
        match merged.get_mut("timestamps") {
            Some(Value::Object(ts)) => {
                ts.insert("updatedAt".into(), Value::String(stamp));
            }
            _ => {
                merged["timestamps"] = serde_json::json!({ "createdAt": stamp, "updatedAt": stamp });
            }
        }

        if let Some(slot) = self
            .collections
            .get_mut(&entity_type)
            .and_then(|c| c.get_mut(position))
        {
            *slot = merged.clone();
        }
        tracing::debug!(entity_type = %entity_type, id = %id, "updated");
        Ok(merged)
    }

    pub fn delete(&mut self, entity_type: EntityType, id: &str) -> Result<Value, StoreError> {
        let collection = self
            .collections
            .get_mut(&entity_type)
            .ok_or_else(|| not_found(entity_type, id))?;
        let position = collection
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| not_found(entity_type, id))?;
        let removed = collection.remove(position);
        tracing::debug!(entity_type = %entity_type, id = %id, "deleted");
        Ok(removed)
    }

    pub fn list(&self, entity_type: EntityType, options: &ListOptions) -> Result<ListResult, StoreError> {
        let schema = self.schema(entity_type)?;
        query::run(self.collection(entity_type), entity_type, schema, options)
    }

    /// Apply updates one by one. Not transactional: see [`BulkUpdateReport`].
    pub fn bulk_update(&mut self, entity_type: EntityType, items: Vec<BulkUpdateItem>) -> BulkUpdateReport {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = match self.update(entity_type, &item.id, item.data) {
                Ok(data) => BulkItemResult {
                    id: item.id,
                    success: true,
                    data: Some(data),
                    error: None,
                },
                Err(e) => {
                    tracing::debug!(entity_type = %entity_type, id = %item.id, error = %e, "bulk item failed");
                    BulkItemResult {
                        id: item.id,
                        success: false,
                        data: None,
                        error: Some(ErrorDetail::from(&e)),
                    }
                }
            };
            results.push(result);
        }
        BulkUpdateReport {
            success: results.iter().all(|r| r.success),
            results,
        }
    }

    pub fn hostel_statistics(&self, hostel_id: &str) -> HostelStatistics {
        stats::hostel_statistics(
            hostel_id,
            self.collection(EntityType::Floor),
            self.collection(EntityType::Room),
            self.collection(EntityType::Amenity),
        )
    }

    pub fn export(&self, entity_type: EntityType, format: ExportFormat) -> Result<ExportFile, StoreError> {
        export::export(
            entity_type,
            self.collection(entity_type),
            format,
            Utc::now().date_naive(),
        )
    }

    /// Export with the format given as text (`json` / `csv`).
    pub fn export_as(&self, entity_type: EntityType, format: &str) -> Result<ExportFile, StoreError> {
        self.export(entity_type, format.parse()?)
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn not_found(entity_type: EntityType, id: &str) -> StoreError {
    StoreError::NotFound {
        entity_type: entity_type.to_string(),
        id: id.to_string(),
    }
}

fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time, bumped past `previous` so successive updates always move forward.
fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + Duration::milliseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> EntityStore {
        EntityStore::with_builtin_schemas().unwrap()
    }

    fn room(number: &str) -> Value {
        json!({
            "hostelId": "h1",
            "floorId": "f1",
            "roomNumber": number,
            "type": "double",
            "occupancy": { "currentOccupancy": 0, "maxOccupancy": 2 },
            "availability": { "status": "available" }
        })
    }

    #[test]
    fn create_assigns_id_first_and_equal_timestamps() {
        let mut s = store();
        let created = s.create(EntityType::Room, room("101")).unwrap();
        let keys: Vec<&String> = created.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "id");
        assert!(uuid::Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
        assert_eq!(created["timestamps"]["createdAt"], created["timestamps"]["updatedAt"]);
    }

    #[test]
    fn create_keeps_caller_id() {
        let mut s = store();
        let mut r = room("101");
        r["id"] = json!("room-101");
        let created = s.create(EntityType::Room, r).unwrap();
        assert_eq!(created["id"], "room-101");
        assert!(s.get(EntityType::Room, "room-101").is_some());
    }

    #[test]
    fn invalid_create_does_not_mutate() {
        let mut s = store();
        let err = s.create(EntityType::Room, json!({ "roomNumber": "1" })).unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(ref e) if e.contains(&"Hostel ID is required".to_string())));
        assert_eq!(s.len(EntityType::Room), 0);
        assert!(matches!(
            s.create(EntityType::Room, json!([1, 2])),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn update_ignores_managed_keys_and_checks_merged_invariants() {
        let mut s = store();
        let created = s.create(EntityType::Room, room("101")).unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = s
            .update(EntityType::Room, &id, json!({ "id": "hijack", "timestamps": null, "roomNumber": "101A" }))
            .unwrap();
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["roomNumber"], "101A");
        assert_eq!(updated["timestamps"]["createdAt"], created["timestamps"]["createdAt"]);

        let err = s
            .update(EntityType::Room, &id, json!({ "occupancy": { "currentOccupancy": 3, "maxOccupancy": 2 } }))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::ValidationFailed(vec!["Current occupancy cannot exceed maximum occupancy".into()])
        );
        assert_eq!(s.read(EntityType::Room, &id).unwrap()["occupancy"]["currentOccupancy"], 0);
    }

    #[test]
    fn patch_validation_runs_before_lookup() {
        let mut s = store();
        let err = s
            .update(EntityType::Room, "missing", json!({ "type": "penthouse" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(_)));
        let err = s.update(EntityType::Room, "missing", json!({ "type": "single" })).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn unvalidated_collections_accept_any_object() {
        let mut s = store();
        let p = s.create(EntityType::Payment, json!({ "amount": "lots" })).unwrap();
        assert_eq!(s.read(EntityType::Payment, p["id"].as_str().unwrap()).unwrap()["amount"], "lots");
    }

    #[test]
    fn delete_twice_is_not_found() {
        let mut s = store();
        let id = s.create(EntityType::Room, room("1")).unwrap()["id"].as_str().unwrap().to_string();
        assert!(s.delete(EntityType::Room, &id).is_ok());
        assert!(matches!(s.delete(EntityType::Room, &id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn stamps_move_forward_even_within_one_millisecond() {
        let prev = Utc::now() + Duration::seconds(5);
        assert!(next_stamp(Some(prev)) > prev);
        assert!(next_stamp(None) <= Utc::now());
    }
}
