//! Reusable value coercions
//!
//! A coercion turns one raw query-string value into a [`FieldValue`] before
//! it reaches the operator. Coercions never fail: a value that cannot be
//! read as the requested kind becomes [`FieldValue::Null`], which matches
//! nothing under SQL comparison semantics.

use crate::core::field::FieldValue;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Shared, type-erased coercion stored in filter configuration
pub type CoerceFn = Arc<dyn Fn(&str) -> FieldValue + Send + Sync>;

/// Coercion: keep the raw string
pub fn identity() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| FieldValue::String(raw.to_string())
}

/// Coercion: parse a signed 64-bit integer
pub fn integer() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| {
        raw.trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or(FieldValue::Null)
    }
}

/// Coercion: parse a finite float
pub fn float() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| match raw.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => FieldValue::Float(f),
        _ => FieldValue::Null,
    }
}

/// Coercion: `true`/`false`/`1`/`0`, case-insensitive
pub fn boolean() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => FieldValue::Boolean(true),
        "false" | "0" => FieldValue::Boolean(false),
        _ => FieldValue::Null,
    }
}

/// Coercion: parse a UUID in any textual form `uuid` accepts
pub fn uuid() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| {
        Uuid::parse_str(raw.trim())
            .map(FieldValue::Uuid)
            .unwrap_or(FieldValue::Null)
    }
}

/// Coercion: RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC
pub fn datetime() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return FieldValue::DateTime(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| FieldValue::DateTime(naive.and_utc()))
            .unwrap_or(FieldValue::Null)
    }
}

/// Coercion: trim surrounding whitespace
pub fn trimmed() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| FieldValue::String(raw.trim().to_string())
}

/// Coercion: convert to lowercase
pub fn lowercase() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| FieldValue::String(raw.to_lowercase())
}

/// Coercion: convert to uppercase
pub fn uppercase() -> impl Fn(&str) -> FieldValue + Send + Sync + Clone {
    |raw: &str| FieldValue::String(raw.to_uppercase())
}
