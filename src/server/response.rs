//! HTTP responses for envelopes

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::core::query::{ItemEnvelope, ListEnvelope};

impl<T: Serialize> IntoResponse for ListEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> IntoResponse for ItemEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
