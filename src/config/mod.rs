//! Declarative list endpoint configuration
//!
//! Endpoints can be described in YAML instead of code:
//!
//! ```yaml
//! endpoints:
//!   listings:
//!     filters:
//!       status: { column: status }
//!       min_price: { column: price, op: gte, coerce: integer }
//!       tags: { column: tag, op: in }
//!     sortable:
//!       created_at: created_at
//!       price: price
//!     default_sort: { key: created_at, direction: desc }
//!     max_limit: 50
//! ```
//!
//! Custom filters are functions and cannot be written in YAML; attach them
//! with [`ListEndpoint::to_builder`] before building.

use crate::core::coerce::{self, CoerceFn};
use crate::core::error::ConfigError;
use crate::core::list_config::{ColumnFilter, ListQueryConfig, ListQueryConfigBuilder};
use crate::core::operator::FilterOp;
use crate::core::predicate::{Column, SortDirection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Named coercions available to descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    Identity,
    Integer,
    Float,
    Boolean,
    Uuid,
    Datetime,
    Trimmed,
    Lowercase,
    Uppercase,
}

impl CoercionKind {
    pub fn to_fn(self) -> CoerceFn {
        match self {
            CoercionKind::Identity => Arc::new(coerce::identity()),
            CoercionKind::Integer => Arc::new(coerce::integer()),
            CoercionKind::Float => Arc::new(coerce::float()),
            CoercionKind::Boolean => Arc::new(coerce::boolean()),
            CoercionKind::Uuid => Arc::new(coerce::uuid()),
            CoercionKind::Datetime => Arc::new(coerce::datetime()),
            CoercionKind::Trimmed => Arc::new(coerce::trimmed()),
            CoercionKind::Lowercase => Arc::new(coerce::lowercase()),
            CoercionKind::Uppercase => Arc::new(coerce::uppercase()),
        }
    }
}

/// Column filter as written in a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Target column
    pub column: String,

    /// Operator (defaults to `eq`)
    #[serde(default)]
    pub op: FilterOp,

    /// Optional coercion applied to the raw value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coerce: Option<CoercionKind>,
}

/// Default sort as written in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub key: String,
    pub direction: SortDirection,
}

/// One list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEndpoint {
    #[serde(default)]
    pub filters: IndexMap<String, FilterDescriptor>,

    /// Sort key -> column name
    #[serde(default)]
    pub sortable: IndexMap<String, String>,

    pub default_sort: SortDescriptor,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u64>,
}

impl ListEndpoint {
    /// Builder pre-filled with this descriptor, ready for custom filters
    pub fn to_builder(&self) -> ListQueryConfigBuilder {
        let mut builder =
            ListQueryConfig::builder(self.default_sort.key.clone(), self.default_sort.direction);

        for (name, descriptor) in &self.filters {
            let mut filter = ColumnFilter::new(Column::new(&descriptor.column)).op(descriptor.op);
            if let Some(kind) = descriptor.coerce {
                filter = filter.with_coerce_fn(kind.to_fn());
            }
            builder = builder.filter(name.clone(), filter);
        }
        for (key, column) in &self.sortable {
            builder = builder.sortable(key.clone(), Column::new(column));
        }
        if let Some(limit) = self.default_limit {
            builder = builder.default_limit(limit);
        }
        if let Some(limit) = self.max_limit {
            builder = builder.max_limit(limit);
        }

        builder
    }

    pub fn build(&self) -> Result<ListQueryConfig, ConfigError> {
        self.to_builder().build()
    }
}

/// Complete set of list endpoint descriptors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEndpointsConfig {
    #[serde(default)]
    pub endpoints: IndexMap<String, ListEndpoint>,
}

impl ListEndpointsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Merge several descriptor sets; a later endpoint replaces an earlier one
    /// with the same name
    pub fn merge(configs: Vec<Self>) -> Self {
        let mut merged = Self::default();
        for config in configs {
            for (name, endpoint) in config.endpoints {
                if merged.endpoints.contains_key(&name) {
                    tracing::debug!(endpoint = %name, "list endpoint overridden during merge");
                }
                merged.endpoints.insert(name, endpoint);
            }
        }
        merged
    }

    pub fn endpoint(&self, name: &str) -> Option<&ListEndpoint> {
        self.endpoints.get(name)
    }

    /// Build the validated config of endpoint `name`
    pub fn build(&self, name: &str) -> Result<ListQueryConfig, ConfigError> {
        self.endpoint(name)
            .ok_or_else(|| ConfigError::UnknownEndpoint {
                name: name.to_string(),
            })?
            .build()
    }
}
