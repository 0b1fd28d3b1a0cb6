//! Raw descriptor types matching the bundled `schemas/*.json` files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declarative description of one entity schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    /// Schema name as used by callers: `hostel`, `floor`, `room`, `amenity`.
    pub name: String,
    /// Top-level keys a record of this schema may carry. Queries on other roots are rejected.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Short field names mapped to dotted paths, e.g. `status` -> `availability.status`.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
    #[serde(default)]
    pub cross_field: Vec<CrossFieldRule>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub path: String,
    /// Human label used in messages ("Hostel name").
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub format: Option<FieldFormat>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Message used when `pattern` does not match; defaults to "{label} has an invalid format".
    #[serde(default)]
    pub pattern_message: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Object,
    Array,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFormat {
    Email,
    Phone,
    Pincode,
    Time,
    Uuid,
}

impl FieldFormat {
    pub fn describe(self) -> &'static str {
        match self {
            FieldFormat::Email => "a valid email address",
            FieldFormat::Phone => "a valid phone number",
            FieldFormat::Pincode => "a valid 6-digit pincode",
            FieldFormat::Time => "a valid time in HH:MM format",
            FieldFormat::Uuid => "a valid UUID",
        }
    }
}

/// `path` must not exceed `not_greater_than` when both are numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossFieldRule {
    pub path: String,
    pub not_greater_than: String,
    pub message: String,
}
