//! Seed datasets: collection name -> records, loaded as-is into a store.

use crate::entity::EntityType;
use crate::error::StoreError;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

const SAMPLE: &str = include_str!("../data/sample.json");

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub collections: BTreeMap<String, Vec<Value>>,
}

/// The bundled demo dataset.
pub fn sample() -> Result<Dataset, StoreError> {
    Ok(serde_json::from_str(SAMPLE)?)
}

pub fn load_from_path(path: &Path) -> Result<Dataset, StoreError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

/// Insert every record without validation, keeping ids and timestamps.
/// Unknown collection names are skipped. Returns the number of records inserted.
pub fn populate(store: &mut EntityStore, dataset: Dataset) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for (name, records) in dataset.collections {
        let Some(entity_type) = EntityType::from_collection(&name) else {
            tracing::warn!(collection = %name, "unknown collection in dataset, skipping");
            continue;
        };
        for record in records {
            store.insert_raw(entity_type, record)?;
            inserted += 1;
        }
    }
    tracing::debug!(inserted, "dataset loaded");
    Ok(inserted)
}

impl EntityStore {
    /// Store using the bundled schemas, seeded from `dataset`.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, StoreError> {
        let mut store = EntityStore::with_builtin_schemas()?;
        populate(&mut store, dataset)?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;
    use crate::service::RecordValidator;

    #[test]
    fn sample_loads_every_collection() {
        let store = EntityStore::from_dataset(sample().unwrap()).unwrap();
        for t in [EntityType::Hostel, EntityType::Floor, EntityType::Room, EntityType::Amenity, EntityType::Occupant] {
            assert!(store.len(t) > 0, "{} empty", t);
        }
    }

    #[test]
    fn sample_records_satisfy_their_schemas() {
        let reg = builtin().unwrap();
        let data = sample().unwrap();
        for (name, records) in &data.collections {
            let Some(schema) = EntityType::from_collection(name).and_then(|t| t.schema_name()) else {
                continue;
            };
            let schema = reg.require(schema).unwrap();
            for r in records {
                let errors = RecordValidator::validate(r, schema);
                assert!(errors.is_empty(), "{} {}: {:?}", name, r["id"], errors);
            }
        }
    }

    #[test]
    fn unknown_collections_are_skipped() {
        let data: Dataset = serde_json::from_str(r#"{ "guests": [{ "id": "g1" }], "payments": [{ "id": "p1" }] }"#).unwrap();
        let mut store = EntityStore::with_builtin_schemas().unwrap();
        assert_eq!(populate(&mut store, data).unwrap(), 1);
        assert_eq!(store.len(EntityType::Payment), 1);
    }

    #[test]
    fn non_object_records_are_rejected() {
        let data: Dataset = serde_json::from_str(r#"{ "rooms": [42] }"#).unwrap();
        let mut store = EntityStore::with_builtin_schemas().unwrap();
        assert!(matches!(populate(&mut store, data), Err(StoreError::InvalidRecord(_))));
    }
}
