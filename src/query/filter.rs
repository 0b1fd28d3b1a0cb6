//! Filter conditions: a literal (equality) or an `{operator, value}` pair.

use crate::query::compare::{partial_compare, value_text, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    /// Does `field` satisfy `self` against `target`?
    pub fn apply(self, field: &Value, target: &Value) -> bool {
        match self {
            FilterOperator::Eq => values_equal(field, target),
            FilterOperator::Ne => !values_equal(field, target),
            FilterOperator::Gt => partial_compare(field, target) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                partial_compare(field, target),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => partial_compare(field, target) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                partial_compare(field, target),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::In => candidates(target).iter().any(|c| values_equal(field, c)),
            FilterOperator::Nin => !candidates(target).iter().any(|c| values_equal(field, c)),
            FilterOperator::Contains => lower_text(field).contains(&lower_text(target)),
            FilterOperator::StartsWith => lower_text(field).starts_with(&lower_text(target)),
            FilterOperator::EndsWith => lower_text(field).ends_with(&lower_text(target)),
        }
    }
}

/// A non-array target is treated as a one-element candidate list.
fn candidates(target: &Value) -> &[Value] {
    match target {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    }
}

fn lower_text(v: &Value) -> String {
    value_text(v).to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Condition { operator: FilterOperator, value: Value },
    Literal(Value),
}

impl FilterValue {
    pub fn eq(value: impl Into<Value>) -> Self {
        FilterValue::Literal(value.into())
    }

    pub fn op(operator: FilterOperator, value: impl Into<Value>) -> Self {
        FilterValue::Condition {
            operator,
            value: value.into(),
        }
    }

    fn target(&self) -> &Value {
        match self {
            FilterValue::Condition { value, .. } => value,
            FilterValue::Literal(value) => value,
        }
    }

    /// `null` and `""` mean "no constraint" so filter forms can be built up field by field.
    pub fn is_unconstrained(&self) -> bool {
        match self.target() {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn matches(&self, field: &Value) -> bool {
        match self {
            FilterValue::Condition { operator, value } => operator.apply(field, value),
            FilterValue::Literal(value) => values_equal(field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_literal_and_condition() {
        let lit: FilterValue = serde_json::from_value(json!("available")).unwrap();
        assert_eq!(lit, FilterValue::eq("available"));
        let cond: FilterValue = serde_json::from_value(json!({ "operator": "startsWith", "value": "Pu" })).unwrap();
        assert_eq!(cond, FilterValue::op(FilterOperator::StartsWith, "Pu"));
    }

    #[test]
    fn empty_values_are_unconstrained() {
        assert!(FilterValue::eq(Value::Null).is_unconstrained());
        assert!(FilterValue::op(FilterOperator::Contains, "").is_unconstrained());
        assert!(!FilterValue::eq(0).is_unconstrained());
    }

    #[test]
    fn comparison_operators_do_not_coerce() {
        assert!(FilterOperator::Gte.apply(&json!(5000), &json!(4500)));
        assert!(!FilterOperator::Gt.apply(&json!("5000"), &json!(4500)));
        assert!(FilterOperator::Lte.apply(&json!(4500), &json!(4500)));
        assert!(!FilterOperator::Lt.apply(&Value::Null, &json!(1)));
    }

    #[test]
    fn membership_and_text_operators() {
        let set = json!(["single", "double"]);
        assert!(FilterOperator::In.apply(&json!("double"), &set));
        assert!(FilterOperator::Nin.apply(&json!("quad"), &set));
        assert!(FilterOperator::Contains.apply(&json!("Sunrise Residency"), &json!("RESID")));
        assert!(FilterOperator::EndsWith.apply(&json!(411001), &json!("001")));
        assert!(!FilterOperator::StartsWith.apply(&Value::Null, &json!("a")));
    }
}
