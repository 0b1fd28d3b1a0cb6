//! Dotted field paths (`location.city`) resolved against nested JSON records.

use crate::error::StoreError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed, non-empty dotted path. Segments are object keys; a numeric
/// segment also indexes into arrays.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StoreError::InvalidFieldPath(s.to_string()));
        }
        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(StoreError::InvalidFieldPath(s.to_string()));
        }
        Ok(FieldPath { segments })
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path without its last segment; `None` for a top-level path.
    pub fn parent(&self) -> Option<FieldPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(FieldPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Sequential key lookup. Any missing step yields `None`.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        let mut current = record;
        for seg in &self.segments {
            current = match current {
                Value::Object(map) => map.get(seg)?,
                Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Like [`resolve`](Self::resolve) but missing paths read as `null`.
    pub fn resolve_or_null<'a>(&self, record: &'a Value) -> &'a Value {
        self.resolve(record).unwrap_or(&Value::Null)
    }
}

impl FromStr for FieldPath {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
