//! Axum extractor for list query parameters

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::ops::Deref;

use crate::core::params::{QueryInput, QueryPairs};

/// Query parameters of the request, normalized for translation
///
/// Never rejects: a missing or malformed query string yields whatever pairs
/// could be decoded, possibly none.
///
/// # Example
/// ```rust,ignore
/// async fn list_items(
///     State(app): State<AppState>,
///     ListParams(params): ListParams,
/// ) -> Result<ListEnvelope<Record>, ListQueryError> {
///     let parsed = translate(&params, &app.config);
///     Ok(run_list_envelope(&app.store, "items", parsed, None, true).await?)
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams(pub QueryPairs);

impl Deref for ListParams {
    type Target = QueryPairs;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ListParams(QueryInput::from(&*parts).normalize()))
    }
}
