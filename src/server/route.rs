//! Shared state for list handlers

use std::sync::Arc;

use crate::core::error::ListQueryError;
use crate::core::execute::run_list_envelope;
use crate::core::list_config::ListQueryConfig;
use crate::core::params::QueryPairs;
use crate::core::predicate::Predicate;
use crate::core::query::ListEnvelope;
use crate::core::store::DataStore;
use crate::core::translate::translate;

/// A list endpoint: one table of one store, behind one config
///
/// Cheap to clone; meant to live in axum router state.
pub struct ListRoute<S: DataStore> {
    store: Arc<S>,
    table: String,
    config: Arc<ListQueryConfig>,
    count: bool,
}

impl<S: DataStore> Clone for ListRoute<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            table: self.table.clone(),
            config: Arc::clone(&self.config),
            count: self.count,
        }
    }
}

impl<S: DataStore> ListRoute<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>, config: ListQueryConfig) -> Self {
        Self {
            store,
            table: table.into(),
            config: Arc::new(config),
            count: true,
        }
    }

    /// Report a lower-bound total instead of running a count query
    pub fn without_count(mut self) -> Self {
        self.count = false;
        self
    }

    pub fn config(&self) -> &ListQueryConfig {
        &self.config
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Translate `params` and fetch the page, scoped by `base` when given
    pub async fn list(
        &self,
        params: &QueryPairs,
        base: Option<Predicate>,
    ) -> Result<ListEnvelope<S::Row>, ListQueryError> {
        let parsed = translate(params, &self.config);
        let envelope =
            run_list_envelope(self.store.as_ref(), &self.table, parsed, base, self.count).await?;
        Ok(envelope)
    }
}
