//! Async facade over a shared store. Every call returns an [`OperationResult`]
//! envelope with the notices a dashboard shows; no call propagates an error.

use crate::entity::EntityType;
use crate::error::StoreError;
use crate::export::{ExportFile, ExportFormat};
use crate::query::ListOptions;
use crate::response::{Notice, OperationResult};
use crate::service::occupancy::{self, OccupancyChange};
use crate::stats::HostelStatistics;
use crate::store::{BulkUpdateItem, BulkUpdateReport, EntityStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct DataService {
    store: Arc<RwLock<EntityStore>>,
}

fn title(entity_type: EntityType) -> String {
    let name = entity_type.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn outcome<T>(result: Result<T, StoreError>, message: impl FnOnce() -> String) -> OperationResult<T> {
    match result {
        Ok(data) => OperationResult::ok(data, message()),
        Err(e) => {
            tracing::warn!(code = e.code(), error = %e, "operation failed");
            OperationResult::failed(&e)
        }
    }
}

impl DataService {
    pub fn new(store: EntityStore) -> Self {
        DataService {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<RwLock<EntityStore>> {
        Arc::clone(&self.store)
    }

    pub async fn create(&self, entity_type: EntityType, record: Value) -> OperationResult<Value> {
        let result = self.store.write().await.create(entity_type, record);
        outcome(result, || format!("{} created successfully", title(entity_type)))
    }

    pub async fn read(&self, entity_type: EntityType, id: &str) -> OperationResult<Value> {
        let result = self.store.read().await.read(entity_type, id);
        outcome(result, || format!("{} loaded", title(entity_type)))
    }

    pub async fn update(&self, entity_type: EntityType, id: &str, patch: Value) -> OperationResult<Value> {
        let result = self.store.write().await.update(entity_type, id, patch);
        outcome(result, || format!("{} updated successfully", title(entity_type)))
    }

    pub async fn delete(&self, entity_type: EntityType, id: &str) -> OperationResult<Value> {
        let result = self.store.write().await.delete(entity_type, id);
        outcome(result, || format!("{} deleted successfully", title(entity_type)))
    }

    pub async fn list(&self, entity_type: EntityType, options: &ListOptions) -> OperationResult<Vec<Value>> {
        let (items, pagination) = match self.store.read().await.list(entity_type, options) {
            Ok(r) => (Ok(r.items), Some(r.pagination)),
            Err(e) => (Err(e), None),
        };
        let count = items.as_ref().map(Vec::len).unwrap_or(0);
        let mut result = outcome(items, || format!("Loaded {} {}", count, entity_type.collection()));
        result.pagination = pagination;
        result
    }

    /// Best-effort: successful items stay applied when others fail.
    pub async fn bulk_update(&self, entity_type: EntityType, items: Vec<BulkUpdateItem>) -> OperationResult<BulkUpdateReport> {
        let report = self.store.write().await.bulk_update(entity_type, items);
        let total = report.results.len();
        let failed = report.failed().count();
        let notice = if failed == 0 {
            Notice::success(format!("Updated {} {}", total, entity_type.collection()))
        } else {
            Notice::error(format!(
                "Updated {} of {} {}; {} failed",
                total - failed,
                total,
                entity_type.collection(),
                failed
            ))
        };
        OperationResult {
            success: report.success,
            data: Some(report),
            error: None,
            errors: Vec::new(),
            pagination: None,
            notices: vec![notice],
        }
    }

    pub async fn hostel_statistics(&self, hostel_id: &str) -> OperationResult<HostelStatistics> {
        let stats = self.store.read().await.hostel_statistics(hostel_id);
        OperationResult::ok(stats, "Statistics loaded")
    }

    pub async fn export(&self, entity_type: EntityType, format: &str) -> OperationResult<ExportFile> {
        let result = self.store.read().await.export_as(entity_type, format);
        outcome(result, || format!("Exported {}", entity_type.collection()))
    }

    /// Export and write the file into `dir`, returning the written path.
    pub async fn export_to_dir(&self, entity_type: EntityType, format: ExportFormat, dir: &Path) -> OperationResult<PathBuf> {
        let exported = self.store.read().await.export(entity_type, format);
        let written = async {
            let file = exported?;
            let path = dir.join(&file.file_name);
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, file.content.as_bytes()).await?;
            Ok::<_, StoreError>(path)
        }
        .await;
        outcome(written, || format!("Exported {} to {}", entity_type.collection(), dir.display()))
    }

    pub async fn check_in(&self, room_id: &str, occupant: Value) -> OperationResult<OccupancyChange> {
        let result = occupancy::check_in(&mut *self.store.write().await, room_id, occupant);
        outcome(result, || "Resident checked in".to_string())
    }

    pub async fn check_out(&self, occupant_id: &str) -> OperationResult<OccupancyChange> {
        let result = occupancy::check_out(&mut *self.store.write().await, occupant_id);
        outcome(result, || "Resident checked out".to_string())
    }
}
