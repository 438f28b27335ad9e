//! Per-endpoint list configuration
//!
//! A [`ListQueryConfig`] is built once when a route is defined and shared by
//! every request to it. It has no mutation path, so sharing it across threads
//! needs no coordination.

use crate::core::coerce::CoerceFn;
use crate::core::error::ConfigError;
use crate::core::field::FieldValue;
use crate::core::operator::FilterOp;
use crate::core::predicate::{Column, Predicate, SortDirection};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Page size used when the request does not ask for one
pub const DEFAULT_LIMIT: u64 = 20;

/// Upper bound on the page size when the config does not set one
pub const DEFAULT_MAX_LIMIT: u64 = 100;

pub const SORT_PARAM: &str = "sort";
pub const ORDER_PARAM: &str = "order";
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

/// Parameter names that are never treated as filters
pub const RESERVED_PARAMS: [&str; 4] = [SORT_PARAM, ORDER_PARAM, LIMIT_PARAM, OFFSET_PARAM];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_PARAMS.contains(&name)
}

/// Comparison of one query parameter against one column
#[derive(Clone)]
pub struct ColumnFilter {
    column: Column,
    op: FilterOp,
    coerce: Option<CoerceFn>,
}

impl ColumnFilter {
    /// Equality filter on `column` using the raw string value
    pub fn new(column: Column) -> Self {
        Self {
            column,
            op: FilterOp::Eq,
            coerce: None,
        }
    }

    pub fn op(mut self, op: FilterOp) -> Self {
        self.op = op;
        self
    }

    pub fn coerce<F>(mut self, coerce: F) -> Self
    where
        F: Fn(&str) -> FieldValue + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(coerce));
        self
    }

    pub(crate) fn with_coerce_fn(mut self, coerce: CoerceFn) -> Self {
        self.coerce = Some(coerce);
        self
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn operator(&self) -> FilterOp {
        self.op
    }

    /// Apply the coercion, or keep the string when none is set
    pub fn coerce_value(&self, raw: &str) -> FieldValue {
        match &self.coerce {
            Some(coerce) => coerce(raw),
            None => FieldValue::String(raw.to_string()),
        }
    }
}

impl fmt::Debug for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnFilter")
            .field("column", &self.column)
            .field("op", &self.op)
            .field("coerce", &self.coerce.is_some())
            .finish()
    }
}

/// Filter logic that is not a single column comparison
///
/// Receives the raw value; returning `None` skips the parameter.
#[derive(Clone)]
pub struct CustomFilter(Arc<dyn Fn(&str) -> Option<Predicate> + Send + Sync>);

impl CustomFilter {
    pub fn new<F>(filter: F) -> Self
    where
        F: Fn(&str) -> Option<Predicate> + Send + Sync + 'static,
    {
        Self(Arc::new(filter))
    }

    pub fn call(&self, raw: &str) -> Option<Predicate> {
        (self.0)(raw)
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFilter(..)")
    }
}

/// Sort applied when the request does not pick a valid one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDefault {
    pub key: String,
    pub direction: SortDirection,
}

/// Allowlist of filters and sort keys plus pagination bounds for one endpoint
///
/// Built through [`ListQueryConfig::builder`], which resolves every default
/// and rejects configurations the translator could not honor.
#[derive(Debug, Clone)]
pub struct ListQueryConfig {
    filters: IndexMap<String, ColumnFilter>,
    custom_filters: IndexMap<String, CustomFilter>,
    sortable: IndexMap<String, Column>,
    default_sort: SortDefault,
    default_sort_column: Column,
    default_limit: u64,
    max_limit: u64,
}

impl ListQueryConfig {
    pub fn builder(
        default_sort_key: impl Into<String>,
        direction: SortDirection,
    ) -> ListQueryConfigBuilder {
        ListQueryConfigBuilder {
            filters: IndexMap::new(),
            custom_filters: IndexMap::new(),
            sortable: IndexMap::new(),
            default_sort: SortDefault {
                key: default_sort_key.into(),
                direction,
            },
            default_limit: None,
            max_limit: None,
        }
    }

    pub fn filter(&self, name: &str) -> Option<&ColumnFilter> {
        self.filters.get(name)
    }

    pub fn custom_filter(&self, name: &str) -> Option<&CustomFilter> {
        self.custom_filters.get(name)
    }

    pub fn sortable_column(&self, key: &str) -> Option<&Column> {
        self.sortable.get(key)
    }

    pub fn sortable_keys(&self) -> impl Iterator<Item = &str> {
        self.sortable.keys().map(String::as_str)
    }

    pub fn default_sort(&self) -> &SortDefault {
        &self.default_sort
    }

    pub fn default_sort_column(&self) -> &Column {
        &self.default_sort_column
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }
}

/// Builder for [`ListQueryConfig`]
#[derive(Debug, Clone)]
pub struct ListQueryConfigBuilder {
    filters: IndexMap<String, ColumnFilter>,
    custom_filters: IndexMap<String, CustomFilter>,
    sortable: IndexMap<String, Column>,
    default_sort: SortDefault,
    default_limit: Option<u64>,
    max_limit: Option<u64>,
}

impl ListQueryConfigBuilder {
    pub fn filter(mut self, name: impl Into<String>, filter: ColumnFilter) -> Self {
        self.filters.insert(name.into(), filter);
        self
    }

    pub fn custom_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&str) -> Option<Predicate> + Send + Sync + 'static,
    {
        self.custom_filters
            .insert(name.into(), CustomFilter::new(filter));
        self
    }

    pub fn sortable(mut self, key: impl Into<String>, column: Column) -> Self {
        self.sortable.insert(key.into(), column);
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Self {
        self.default_limit = Some(limit);
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Self {
        self.max_limit = Some(limit);
        self
    }

    /// Resolve defaults and validate.
    ///
    /// Fails when the default sort key is not sortable, when a limit is zero,
    /// or when the default limit exceeds the maximum.
    pub fn build(self) -> Result<ListQueryConfig, ConfigError> {
        let max_limit = self.max_limit.unwrap_or(DEFAULT_MAX_LIMIT);
        // an unset default follows a max_limit lowered below it
        let default_limit = self
            .default_limit
            .unwrap_or_else(|| DEFAULT_LIMIT.min(max_limit));

        if max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_limit".to_string(),
                value: max_limit.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if default_limit == 0 || default_limit > max_limit {
            return Err(ConfigError::InvalidValue {
                field: "default_limit".to_string(),
                value: default_limit.to_string(),
                message: format!("must be between 1 and max_limit ({max_limit})"),
            });
        }

        let default_sort_column = self
            .sortable
            .get(&self.default_sort.key)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownDefaultSort {
                key: self.default_sort.key.clone(),
            })?;

        for name in self.filters.keys().chain(self.custom_filters.keys()) {
            if is_reserved(name) {
                tracing::warn!(filter = %name, "filter name is reserved and will never match");
            }
        }
        for name in self.filters.keys() {
            if self.custom_filters.contains_key(name) {
                tracing::warn!(filter = %name, "column filter shadows custom filter of the same name");
            }
        }

        Ok(ListQueryConfig {
            filters: self.filters,
            custom_filters: self.custom_filters,
            sortable: self.sortable,
            default_sort: self.default_sort,
            default_sort_column,
            default_limit,
            max_limit,
        })
    }
}
