//! Typed errors and envelope mapping.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown schema: {0}")]
    UnknownSchema(String),
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),
    #[error("invalid rule: schema {schema} field {field}: {reason}")]
    InvalidRule {
        schema: String,
        field: String,
        reason: String,
    },
    #[error("schema load: {0}")]
    Load(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("invalid field path: '{0}'")]
    InvalidFieldPath(String),
    #[error("unknown field '{field}' for {entity_type}")]
    UnknownField { entity_type: String, field: String },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("room {room_id} unavailable: {reason}")]
    RoomUnavailable { room_id: String, reason: String },
    #[error("io: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidRecord(e.to_string())
    }
}

impl StoreError {
    /// Stable machine-readable code for the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Schema(_) => "schema_error",
            StoreError::ValidationFailed(_) => "validation_failed",
            StoreError::NotFound { .. } => "not_found",
            StoreError::UnsupportedFormat(_) => "unsupported_format",
            StoreError::InvalidRecord(_) => "invalid_record",
            StoreError::InvalidFieldPath(_) => "invalid_field_path",
            StoreError::UnknownField { .. } => "unknown_field",
            StoreError::InvalidQuery(_) => "invalid_query",
            StoreError::RoomUnavailable { .. } => "room_unavailable",
            StoreError::Io(_) => "io_error",
        }
    }

    /// Violation messages when this is a validation failure, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            StoreError::ValidationFailed(errors) => errors,
            _ => &[],
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&StoreError> for ErrorDetail {
    fn from(e: &StoreError) -> Self {
        let details = match e {
            StoreError::ValidationFailed(errors) => Some(serde_json::json!({ "errors": errors })),
            StoreError::NotFound { entity_type, id } => {
                Some(serde_json::json!({ "entityType": entity_type, "id": id }))
            }
            _ => None,
        };
        ErrorDetail {
            code: e.code().to_string(),
            message: e.to_string(),
            details,
        }
    }
}

impl From<&StoreError> for ErrorBody {
    fn from(e: &StoreError) -> Self {
        ErrorBody { error: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_messages_in_order() {
        let e = StoreError::ValidationFailed(vec!["a is required".into(), "b is required".into()]);
        assert_eq!(e.code(), "validation_failed");
        assert_eq!(e.violations(), &["a is required".to_string(), "b is required".to_string()]);
        assert_eq!(e.to_string(), "validation failed: a is required; b is required");
    }

    #[test]
    fn not_found_detail_names_entity_and_id() {
        let e = StoreError::NotFound {
            entity_type: "room".into(),
            id: "r-9".into(),
        };
        let body = ErrorBody::from(&e);
        assert_eq!(body.error.code, "not_found");
        assert_eq!(body.error.message, "room not found: r-9");
        assert_eq!(
            body.error.details,
            Some(serde_json::json!({ "entityType": "room", "id": "r-9" }))
        );
    }
}
