//! Load descriptors from the bundled JSON files or a directory, and resolve them.

use crate::error::SchemaError;
use crate::path::FieldPath;
use crate::schema::resolved::{ResolvedCrossRule, ResolvedRule, ResolvedSchema, SchemaRegistry};
use crate::schema::types::*;
use crate::schema::validate;
use regex::Regex;
use std::path::Path;

const BUILTIN: &[(&str, &str)] = &[
    ("hostel.json", include_str!("../../schemas/hostel.json")),
    ("floor.json", include_str!("../../schemas/floor.json")),
    ("room.json", include_str!("../../schemas/room.json")),
    ("amenity.json", include_str!("../../schemas/amenity.json")),
];

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[0-9][0-9 ()-]{8,18}[0-9]$";
const PINCODE_PATTERN: &str = r"^[1-9][0-9]{5}$";
const TIME_PATTERN: &str = r"^([01][0-9]|2[0-3]):[0-5][0-9]$";

/// Parse the descriptors shipped with the crate.
pub fn builtin_descriptors() -> Result<Vec<SchemaDescriptor>, SchemaError> {
    BUILTIN
        .iter()
        .map(|(file, text)| {
            serde_json::from_str(text).map_err(|e| SchemaError::Load(format!("{}: {}", file, e)))
        })
        .collect()
}

/// Registry built from the bundled descriptors.
pub fn builtin() -> Result<SchemaRegistry, SchemaError> {
    resolve(&builtin_descriptors()?)
}

/// Read every `*.json` file in `dir` as one descriptor, in file-name order.
pub fn load_from_dir(dir: &Path) -> Result<Vec<SchemaDescriptor>, SchemaError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::Load(format!("{}: {}", dir.display(), e)))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SchemaError::Load(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    let mut out = Vec::with_capacity(files.len());
    for path in files {
        tracing::debug!(path = %path.display(), "loading schema descriptor");
        let text = std::fs::read_to_string(&path)
            .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
        let desc: SchemaDescriptor = serde_json::from_str(&text)
            .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
        out.push(desc);
    }
    Ok(out)
}

/// Build the runtime registry from descriptors (validates them first).
pub fn resolve(descriptors: &[SchemaDescriptor]) -> Result<SchemaRegistry, SchemaError> {
    validate(descriptors)?;
    let mut schemas = Vec::with_capacity(descriptors.len());
    for desc in descriptors {
        schemas.push(resolve_one(desc)?);
    }
    SchemaRegistry::from_schemas(schemas)
}

fn resolve_one(desc: &SchemaDescriptor) -> Result<ResolvedSchema, SchemaError> {
    let load_err = |field: &str, reason: String| SchemaError::InvalidRule {
        schema: desc.name.clone(),
        field: field.to_string(),
        reason,
    };
    let parse = |raw: &str| FieldPath::parse(raw).map_err(|e| load_err(raw, e.to_string()));

    let mut rules = Vec::with_capacity(desc.rules.len());
    for rule in &desc.rules {
        let pattern = match &rule.pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| load_err(&rule.path, e.to_string()))?),
            None => None,
        };
        let format_regex = match rule.format {
            Some(f) => format_pattern(f)
                .map(|p| Regex::new(p).map_err(|e| load_err(&rule.path, e.to_string())))
                .transpose()?,
            None => None,
        };
        rules.push(ResolvedRule {
            path: parse(&rule.path)?,
            label: rule.label.clone(),
            required: rule.required,
            kind: rule.kind.or_else(|| implied_kind(rule)),
            min_length: rule.min_length,
            max_length: rule.max_length,
            format: rule.format,
            format_regex,
            pattern,
            pattern_message: rule.pattern_message.clone(),
            allowed: rule.allowed.clone(),
            minimum: rule.minimum,
            maximum: rule.maximum,
        });
    }

    let mut cross_field = Vec::with_capacity(desc.cross_field.len());
    for cross in &desc.cross_field {
        cross_field.push(ResolvedCrossRule {
            path: parse(&cross.path)?,
            limit: parse(&cross.not_greater_than)?,
            message: cross.message.clone(),
        });
    }

    let mut aliases = std::collections::HashMap::new();
    for (alias, target) in &desc.aliases {
        aliases.insert(alias.clone(), parse(target)?);
    }

    Ok(ResolvedSchema {
        name: desc.name.clone(),
        fields: desc.fields.iter().cloned().collect(),
        aliases,
        rules,
        cross_field,
    })
}

fn format_pattern(format: FieldFormat) -> Option<&'static str> {
    match format {
        FieldFormat::Email => Some(EMAIL_PATTERN),
        FieldFormat::Phone => Some(PHONE_PATTERN),
        FieldFormat::Pincode => Some(PINCODE_PATTERN),
        FieldFormat::Time => Some(TIME_PATTERN),
        FieldFormat::Uuid => None,
    }
}

fn implied_kind(rule: &FieldRule) -> Option<FieldKind> {
    if rule.min_length.is_some() || rule.max_length.is_some() || rule.format.is_some() || rule.pattern.is_some() {
        Some(FieldKind::String)
    } else if rule.minimum.is_some() || rule.maximum.is_some() {
        Some(FieldKind::Number)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_four_schemas() {
        let reg = builtin().unwrap();
        assert_eq!(reg.names(), vec!["amenity", "floor", "hostel", "room"]);
    }

    #[test]
    fn room_status_alias_points_into_availability() {
        let reg = builtin().unwrap();
        let room = reg.require("room").unwrap();
        assert_eq!(room.field_path("status").unwrap().to_string(), "availability.status");
        assert_eq!(room.field_path("pricing.baseRent").unwrap().to_string(), "pricing.baseRent");
        assert!(room.field_path("colour").is_err());
    }

    #[test]
    fn kinds_are_implied_from_constraints() {
        let reg = builtin().unwrap();
        let hostel = reg.require("hostel").unwrap();
        let name = hostel.rules.iter().find(|r| r.path.to_string() == "name").unwrap();
        assert_eq!(name.kind, Some(FieldKind::String));
        let beds = hostel
            .rules
            .iter()
            .find(|r| r.path.to_string() == "capacity.totalBeds")
            .unwrap();
        assert_eq!(beds.kind, Some(FieldKind::Number));
    }

    #[test]
    fn loads_descriptors_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("guest.json"),
            r#"{ "name": "guest", "fields": ["name"], "rules": [{ "path": "name", "label": "Guest name", "required": true }] }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let descs = load_from_dir(dir.path()).unwrap();
        assert_eq!(descs.len(), 1);
        let reg = resolve(&descs).unwrap();
        assert!(reg.get("guest").is_some());
    }
}
