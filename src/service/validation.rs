//! Record validation from resolved schema rules.

use crate::error::SchemaError;
use crate::query::{values_equal, value_text};
use crate::schema::{FieldFormat, FieldKind, ResolvedRule, ResolvedSchema, SchemaRegistry};
use serde_json::Value;

pub struct RecordValidator;

impl RecordValidator {
    /// Check every rule, then every cross-field rule. Messages come back in
    /// rule order; each field reports at most one message.
    pub fn validate(record: &Value, schema: &ResolvedSchema) -> Vec<String> {
        let mut errors: Vec<String> = schema
            .rules
            .iter()
            .filter_map(|rule| check_rule(record, rule))
            .collect();
        errors.extend(Self::check_cross_fields(record, schema));
        errors
    }

    /// Check only rules whose top-level key is present in the patch (for updates).
    /// Cross-field rules are left to the caller, which sees the merged record.
    pub fn validate_partial(patch: &Value, schema: &ResolvedSchema) -> Vec<String> {
        let Some(keys) = patch.as_object() else {
            return Vec::new();
        };
        schema
            .rules
            .iter()
            .filter(|rule| keys.contains_key(rule.path.root()))
            .filter_map(|rule| check_rule(patch, rule))
            .collect()
    }

    pub fn check_cross_fields(record: &Value, schema: &ResolvedSchema) -> Vec<String> {
        let mut errors = Vec::new();
        for cross in &schema.cross_field {
            let value = cross.path.resolve(record).and_then(Value::as_f64);
            let limit = cross.limit.resolve(record).and_then(Value::as_f64);
            if let (Some(v), Some(l)) = (value, limit) {
                if v > l {
                    errors.push(cross.message.clone());
                }
            }
        }
        errors
    }
}

/// Validate `record` against the schema registered as `schema_name`.
pub fn validate_data(registry: &SchemaRegistry, record: &Value, schema_name: &str) -> Result<Vec<String>, SchemaError> {
    let schema = registry.require(schema_name)?;
    Ok(RecordValidator::validate(record, schema))
}

fn check_rule(record: &Value, rule: &ResolvedRule) -> Option<String> {
    if let Some(parent) = rule.path.parent() {
        if !matches!(parent.resolve(record), Some(Value::Object(_))) {
            return None;
        }
    }
    let label = &rule.label;
    let value = match rule.path.resolve(record) {
        None | Some(Value::Null) => {
            return rule.required.then(|| format!("{} is required", label));
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            return rule.required.then(|| format!("{} is required", label));
        }
        Some(v) => v,
    };

    if let Some(kind) = rule.kind {
        if !kind_matches(kind, value) {
            return Some(kind_message(label, kind));
        }
    }

    if let Value::String(s) = value {
        let len = s.trim().chars().count();
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Some(format!("{} must be at least {} characters long", label, min));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Some(format!("{} must not exceed {} characters", label, max));
            }
        }
        if let Some(format) = rule.format {
            let ok = match (&rule.format_regex, format) {
                (_, FieldFormat::Uuid) => uuid::Uuid::parse_str(s.trim()).is_ok(),
                (Some(re), _) => re.is_match(s.trim()),
                (None, _) => true,
            };
            if !ok {
                return Some(format!("{} must be {}", label, format.describe()));
            }
        }
        if let Some(re) = &rule.pattern {
            if !re.is_match(s) {
                return Some(
                    rule.pattern_message
                        .clone()
                        .unwrap_or_else(|| format!("{} has an invalid format", label)),
                );
            }
        }
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| values_equal(value, a)) {
            let options: Vec<String> = allowed.iter().map(value_text).collect();
            return Some(format!("{} must be one of: {}", label, options.join(", ")));
        }
    }

    if let Some(n) = value.as_f64() {
        let out_of_range = match (rule.minimum, rule.maximum) {
            (Some(min), Some(max)) if n < min || n > max => {
                Some(format!("{} must be between {} and {}", label, min, max))
            }
            (Some(min), None) if n < min => Some(format!("{} must be at least {}", label, min)),
            (None, Some(max)) if n > max => Some(format!("{} must be at most {}", label, max)),
            _ => None,
        };
        if out_of_range.is_some() {
            return out_of_range;
        }
    }

    None
}

fn kind_matches(kind: FieldKind, v: &Value) -> bool {
    match kind {
        FieldKind::String => v.is_string(),
        FieldKind::Number => v.is_number(),
        FieldKind::Object => v.is_object(),
        FieldKind::Array => v.is_array(),
        FieldKind::Boolean => v.is_boolean(),
    }
}

fn kind_message(label: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::String => format!("{} must be text", label),
        FieldKind::Number => format!("{} must be a number", label),
        FieldKind::Object => format!("{} must be an object", label),
        FieldKind::Array => format!("{} must be a list", label),
        FieldKind::Boolean => format!("{} must be true or false", label),
    }
}
