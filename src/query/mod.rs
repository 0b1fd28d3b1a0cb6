//! List queries: filter, search, sort and paginate over one collection.

mod compare;
mod filter;

pub use compare::{compare_values, partial_compare, value_text, values_equal};
pub use filter::{FilterOperator, FilterValue};

use crate::entity::EntityType;
use crate::error::StoreError;
use crate::path::FieldPath;
use crate::schema::ResolvedSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Every part is optional and independent. Pagination applies only when both
/// `page` (1-indexed) and `limit` are set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(field.into(), value);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn paginate(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Matching records before pagination.
    pub total: usize,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub total_pages: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListResult {
    pub items: Vec<Value>,
    pub pagination: Pagination,
}

/// Resolve a caller field name for this entity type. Schema'd types go
/// through aliases and the known-field check; others accept any dotted path.
pub fn resolve_field(schema: Option<&ResolvedSchema>, name: &str) -> Result<FieldPath, StoreError> {
    match schema {
        Some(s) => s.field_path(name),
        None => FieldPath::parse(name),
    }
}

pub(crate) fn run(
    records: &[Value],
    entity_type: EntityType,
    schema: Option<&ResolvedSchema>,
    options: &ListOptions,
) -> Result<ListResult, StoreError> {
    let mut filters = Vec::with_capacity(options.filters.len());
    for (name, cond) in &options.filters {
        let path = resolve_field(schema, name)?;
        if !cond.is_unconstrained() {
            filters.push((path, cond));
        }
    }
    let sort_path = options
        .sort_by
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| resolve_field(schema, s))
        .transpose()?;
    let needle = options
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let search_paths = match needle {
        Some(_) => entity_type
            .search_fields()
            .iter()
            .map(|f| FieldPath::parse(f))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let page_window = match (options.page, options.limit) {
        (Some(page), Some(limit)) => {
            if page == 0 {
                return Err(StoreError::InvalidQuery("page must be at least 1".into()));
            }
            if limit == 0 {
                return Err(StoreError::InvalidQuery("limit must be at least 1".into()));
            }
            Some((page, limit))
        }
        _ => None,
    };

    let mut matched: Vec<&Value> = records
        .iter()
        .filter(|rec| {
            filters
                .iter()
                .all(|(path, cond)| cond.matches(path.resolve_or_null(rec)))
        })
        .filter(|rec| match &needle {
            Some(n) => search_paths.iter().any(|p| match p.resolve(rec) {
                None | Some(Value::Null) => false,
                Some(v) => value_text(v).to_lowercase().contains(n.as_str()),
            }),
            None => true,
        })
        .collect();

    if let Some(path) = &sort_path {
        matched.sort_by(|a, b| {
            let o = compare_values(path.resolve_or_null(a), path.resolve_or_null(b));
            match options.sort_order {
                SortOrder::Asc => o,
                SortOrder::Desc => o.reverse(),
            }
        });
    }

    let total = matched.len();
    let (items, pagination) = match page_window {
        Some((page, limit)) => {
            let start = (page as usize - 1).saturating_mul(limit as usize);
            let items: Vec<Value> = matched
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .cloned()
                .collect();
            let total_pages = total.div_ceil(limit as usize);
            (
                items,
                Pagination {
                    total,
                    page: Some(page),
                    limit: Some(limit),
                    total_pages,
                },
            )
        }
        None => (
            matched.into_iter().cloned().collect(),
            Pagination {
                total,
                page: None,
                limit: None,
                total_pages: 1,
            },
        ),
    };

    tracing::debug!(
        entity_type = %entity_type,
        total,
        returned = items.len(),
        "list query"
    );
    Ok(ListResult { items, pagination })
}
