//! Descriptor validation: well-formed paths, compilable patterns, consistent bounds.

use crate::error::SchemaError;
use crate::path::FieldPath;
use crate::schema::SchemaDescriptor;
use regex::Regex;
use std::collections::HashSet;

fn invalid(schema: &str, field: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidRule {
        schema: schema.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn rooted_path(desc: &SchemaDescriptor, roots: &HashSet<&str>, raw: &str) -> Result<FieldPath, SchemaError> {
    let path = FieldPath::parse(raw).map_err(|_| invalid(&desc.name, raw, "malformed path"))?;
    if !roots.contains(path.root()) {
        return Err(invalid(&desc.name, raw, format!("root '{}' is not a declared field", path.root())));
    }
    Ok(path)
}

pub fn validate(descriptors: &[SchemaDescriptor]) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for desc in descriptors {
        if desc.name.trim().is_empty() {
            return Err(SchemaError::Load("schema name must not be empty".into()));
        }
        if !names.insert(desc.name.as_str()) {
            return Err(SchemaError::DuplicateSchema(desc.name.clone()));
        }
        validate_one(desc)?;
    }
    Ok(())
}

fn validate_one(desc: &SchemaDescriptor) -> Result<(), SchemaError> {
    let roots: HashSet<&str> = desc.fields.iter().map(String::as_str).collect();
    if roots.is_empty() {
        return Err(invalid(&desc.name, "*", "schema declares no fields"));
    }

    for rule in &desc.rules {
        rooted_path(desc, &roots, &rule.path)?;
        if rule.label.trim().is_empty() {
            return Err(invalid(&desc.name, &rule.path, "label must not be empty"));
        }
        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min > max {
                return Err(invalid(&desc.name, &rule.path, "minLength exceeds maxLength"));
            }
        }
        if let (Some(min), Some(max)) = (rule.minimum, rule.maximum) {
            if min > max {
                return Err(invalid(&desc.name, &rule.path, "minimum exceeds maximum"));
            }
        }
        if let Some(pattern) = &rule.pattern {
            Regex::new(pattern).map_err(|e| invalid(&desc.name, &rule.path, e.to_string()))?;
        }
        if matches!(&rule.allowed, Some(a) if a.is_empty()) {
            return Err(invalid(&desc.name, &rule.path, "allowed list is empty"));
        }
    }

    for (alias, target) in &desc.aliases {
        if alias.contains('.') {
            return Err(invalid(&desc.name, alias, "alias must be a plain name"));
        }
        rooted_path(desc, &roots, target)?;
    }

    for cross in &desc.cross_field {
        rooted_path(desc, &roots, &cross.path)?;
        rooted_path(desc, &roots, &cross.not_greater_than)?;
    }

    Ok(())
}
