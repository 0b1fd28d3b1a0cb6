//! Resolved schemas: descriptors validated, paths parsed and patterns compiled for runtime use.

use crate::error::{SchemaError, StoreError};
use crate::path::FieldPath;
use crate::schema::{FieldFormat, FieldKind};
use regex::Regex;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct ResolvedRule {
    pub path: FieldPath,
    pub label: String,
    pub required: bool,
    /// Declared kind, or the kind implied by the other constraints.
    pub kind: Option<FieldKind>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub format: Option<FieldFormat>,
    /// Compiled matcher for `format` (absent for `uuid`, which is parsed instead).
    pub format_regex: Option<Regex>,
    pub pattern: Option<Regex>,
    pub pattern_message: Option<String>,
    pub allowed: Option<Vec<serde_json::Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ResolvedCrossRule {
    pub path: FieldPath,
    pub limit: FieldPath,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedSchema {
    pub name: String,
    pub fields: HashSet<String>,
    pub aliases: HashMap<String, FieldPath>,
    pub rules: Vec<ResolvedRule>,
    pub cross_field: Vec<ResolvedCrossRule>,
}

impl ResolvedSchema {
    /// Turn a caller-supplied field name into a path: aliases first, then a
    /// dotted path whose root must be a known top-level field.
    pub fn field_path(&self, name: &str) -> Result<FieldPath, StoreError> {
        if let Some(p) = self.aliases.get(name.trim()) {
            return Ok(p.clone());
        }
        let path = FieldPath::parse(name)?;
        if !self.fields.contains(path.root()) {
            return Err(StoreError::UnknownField {
                entity_type: self.name.clone(),
                field: name.to_string(),
            });
        }
        Ok(path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    by_name: HashMap<String, ResolvedSchema>,
}

impl SchemaRegistry {
    pub(crate) fn from_schemas(schemas: Vec<ResolvedSchema>) -> Result<Self, SchemaError> {
        let mut by_name = HashMap::new();
        for s in schemas {
            if by_name.contains_key(&s.name) {
                return Err(SchemaError::DuplicateSchema(s.name));
            }
            by_name.insert(s.name.clone(), s);
        }
        Ok(SchemaRegistry { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedSchema> {
        self.by_name.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&ResolvedSchema, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
