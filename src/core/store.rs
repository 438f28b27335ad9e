//! Data store boundary used by the execution helper

use crate::core::predicate::{OrderBy, Predicate};
use anyhow::Result;
use async_trait::async_trait;

/// A filtered, ordered, paginated row query over one table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub filter: Option<Predicate>,
    pub order_by: OrderBy,
    pub limit: u64,
    pub offset: u64,
}

/// Trait for stores that can run list queries
///
/// Implementations turn [`Predicate`]s and [`OrderBy`]s into whatever their
/// backend executes. Errors are returned to the caller unchanged; retries and
/// timeouts are the store's own business.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Row type returned by [`DataStore::select`]
    type Row: Send;

    /// Fetch the rows selected by `query` from `table`
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Self::Row>>;

    /// Count rows of `table` matching `filter`.
    ///
    /// `None` means the count query produced no row.
    async fn count(&self, table: &str, filter: Option<&Predicate>) -> Result<Option<u64>>;
}
