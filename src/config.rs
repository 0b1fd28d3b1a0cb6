//! Runtime settings from the environment (and `.env`), and the store they describe.

use crate::error::StoreError;
use crate::schema::{self, SchemaRegistry};
use crate::seed::{self, Dataset};
use crate::store::EntityStore;
use std::path::PathBuf;

pub const SEED_PATH_VAR: &str = "HOSTEL_SEED_PATH";
pub const SCHEMA_DIR_VAR: &str = "HOSTEL_SCHEMA_DIR";
pub const EXPORT_DIR_VAR: &str = "HOSTEL_EXPORT_DIR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Dataset file; the bundled sample when unset.
    pub seed_path: Option<PathBuf>,
    /// Directory of schema descriptors; the bundled ones when unset.
    pub schema_dir: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            seed_path: None,
            schema_dir: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl StoreConfig {
    /// Read settings from the process environment after loading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        StoreConfig {
            seed_path: get(SEED_PATH_VAR),
            schema_dir: get(SCHEMA_DIR_VAR),
            export_dir: get(EXPORT_DIR_VAR).unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn load_registry(&self) -> Result<SchemaRegistry, StoreError> {
        let registry = match &self.schema_dir {
            Some(dir) => schema::resolve(&schema::load_from_dir(dir)?)?,
            None => schema::builtin()?,
        };
        Ok(registry)
    }

    pub fn load_dataset(&self) -> Result<Dataset, StoreError> {
        match &self.seed_path {
            Some(path) => seed::load_from_path(path),
            None => seed::sample(),
        }
    }

    /// Registry plus seeded collections.
    pub fn build_store(&self) -> Result<EntityStore, StoreError> {
        let mut store = EntityStore::new(self.load_registry()?);
        let inserted = seed::populate(&mut store, self.load_dataset()?)?;
        tracing::info!(
            inserted,
            schemas = store.registry().names().len(),
            "store ready"
        );
        Ok(store)
    }
}
