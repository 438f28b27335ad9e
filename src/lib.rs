//! # list-query
//!
//! Turns untrusted query-string parameters into a safe, bounded list query:
//! allowlisted filters, allowlisted sorting and clamped pagination.
//!
//! ## Features
//!
//! - **Allowlist-only filtering**: a parameter becomes a condition only when the
//!   endpoint config names it
//! - **Total translation**: malformed input degrades to defaults, it never errors
//! - **Clamped pagination**: `limit` always lands in `1..=max_limit`
//! - **Base conditions**: authorization scopes are ANDed in and cannot be widened
//! - **Exact or heuristic totals**: concurrent count query, or a cheap lower bound
//! - **Configuration-Based**: describe endpoints in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use list_query::prelude::*;
//!
//! let config = ListQueryConfig::builder("created_at", SortDirection::Desc)
//!     .filter("status", ColumnFilter::new(Column::new("status")))
//!     .filter(
//!         "min_price",
//!         ColumnFilter::new(Column::new("price"))
//!             .op(FilterOp::Gte)
//!             .coerce(coerce::integer()),
//!     )
//!     .sortable("created_at", Column::new("created_at"))
//!     .sortable("price", Column::new("price"))
//!     .max_limit(50)
//!     .build()?;
//!
//! let parsed = config.parse(QueryPairs::from_query_str("status=LISTED&sort=price&limit=500"));
//! assert_eq!(parsed.limit(), 50);
//!
//! let scope = Column::new("owner_id").eq(user_id);
//! let page = run_list_envelope(&store, "listings", parsed, Some(scope), true).await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Query model ===
    pub use crate::core::{
        coerce,
        error::{ConfigError, ListQueryError},
        field::FieldValue,
        list_config::{ColumnFilter, CustomFilter, ListQueryConfig, SortDefault},
        operator::{FilterOp, FilterValue},
        params::{QueryInput, QueryPairs},
        predicate::{Column, OrderBy, Predicate, SortDirection},
        query::{ItemEnvelope, ListEnvelope, ListMeta, build_item_envelope, build_list_envelope},
        translate::{ParsedListQuery, translate},
    };

    // === Execution ===
    pub use crate::core::{
        execute::{
            ListOutput, ListRows, ListSource, OutputMode, RunOptions, execute, run_list_envelope,
            run_list_query,
        },
        store::{DataStore, SelectQuery},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryStore, Record};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::{CoercionKind, FilterDescriptor, ListEndpoint, ListEndpointsConfig};

    // === Server ===
    pub use crate::server::{ListParams, ListRoute};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
}
