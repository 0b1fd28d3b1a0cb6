//! Standard result envelope and the user-facing notices that go with it.

use crate::error::{ErrorDetail, StoreError};
use crate::query::Pagination;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One transient notification. Validation failures produce one per violated rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    /// Violation messages, in rule order, when validation failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip)]
    pub notices: Vec<Notice>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        OperationResult {
            success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
            pagination: None,
            notices: vec![Notice::success(message)],
        }
    }

    pub fn failed(err: &StoreError) -> Self {
        OperationResult {
            success: false,
            data: None,
            error: Some(ErrorDetail::from(err)),
            errors: err.violations().to_vec(),
            pagination: None,
            notices: notices_for(err),
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Data on success; the error detail otherwise.
    pub fn into_result(self) -> Result<T, ErrorDetail> {
        match (self.data, self.error) {
            (Some(data), _) if self.success => Ok(data),
            (_, Some(error)) => Err(error),
            _ => Err(ErrorDetail {
                code: "empty_result".into(),
                message: "operation returned no data".into(),
                details: None,
            }),
        }
    }
}

/// One error notice per operation, except validation failures which get one per message.
pub fn notices_for(err: &StoreError) -> Vec<Notice> {
    match err {
        StoreError::ValidationFailed(errors) => errors.iter().map(Notice::error).collect(),
        other => vec![Notice::error(other.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_yields_one_notice_per_rule() {
        let err = StoreError::ValidationFailed(vec!["Location is required".into(), "Contact is required".into()]);
        let r: OperationResult<()> = OperationResult::failed(&err);
        assert!(!r.success);
        assert_eq!(r.errors.len(), 2);
        assert_eq!(
            r.notices,
            vec![Notice::error("Location is required"), Notice::error("Contact is required")]
        );
    }

    #[test]
    fn envelope_serializes_without_empty_parts() {
        let r = OperationResult::ok(serde_json::json!({ "id": "h1" }), "Hostel created successfully");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, serde_json::json!({ "success": true, "data": { "id": "h1" } }));
        assert_eq!(r.into_result().unwrap()["id"], "h1");
    }
}
