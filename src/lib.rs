//! Hostel store: in-memory data layer for hostels, floors, rooms and amenities
//! with schema-driven validation, queries, statistics and export.

pub mod config;
pub mod entity;
pub mod error;
pub mod export;
pub mod path;
pub mod query;
pub mod response;
pub mod schema;
pub mod seed;
pub mod service;
pub mod stats;
pub mod store;

pub use config::StoreConfig;
pub use entity::EntityType;
pub use error::{ErrorBody, ErrorDetail, SchemaError, StoreError};
pub use export::{ExportFile, ExportFormat};
pub use path::FieldPath;
pub use query::{FilterOperator, FilterValue, ListOptions, ListResult, Pagination, SortOrder};
pub use response::{Notice, NoticeLevel, OperationResult};
pub use schema::{SchemaDescriptor, SchemaRegistry};
pub use seed::Dataset;
pub use service::{check_in, check_out, validate_data, DataService, OccupancyChange, RecordValidator};
pub use stats::HostelStatistics;
pub use store::{BulkItemResult, BulkUpdateItem, BulkUpdateReport, EntityStore};
