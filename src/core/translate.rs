//! Translation of query parameters into a [`ParsedListQuery`]
//!
//! Translation is total: every input, however malformed, produces a
//! well-formed result. Unknown parameters are ignored, bad sort requests
//! fall back to the configured default, and pagination values are clamped.

use crate::core::list_config::{
    LIMIT_PARAM, ListQueryConfig, OFFSET_PARAM, ORDER_PARAM, SORT_PARAM, is_reserved,
};
use crate::core::operator::FilterValue;
use crate::core::params::{QueryInput, QueryPairs};
use crate::core::predicate::{OrderBy, Predicate, SortDirection};

/// Filter, ordering and page bounds for one list request
///
/// `limit` is always within `1..=max_limit` of the config it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedListQuery {
    filter: Option<Predicate>,
    order_by: OrderBy,
    limit: u64,
    offset: u64,
}

impl ParsedListQuery {
    /// Combined filter, or `None` when no filter parameter applied
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The condition to run: `base` AND the translated filter.
    ///
    /// Either side may be absent; a present `base` is never dropped.
    pub fn filter_with(&self, base: Option<&Predicate>) -> Option<Predicate> {
        Predicate::and_opt(base.cloned(), self.filter.clone())
    }

    pub fn into_parts(self) -> (Option<Predicate>, OrderBy, u64, u64) {
        (self.filter, self.order_by, self.limit, self.offset)
    }
}

impl ListQueryConfig {
    /// Normalize `input` and translate it against this config
    pub fn parse(&self, input: impl Into<QueryInput>) -> ParsedListQuery {
        translate(&input.into().normalize(), self)
    }
}

pub fn translate(params: &QueryPairs, config: &ListQueryConfig) -> ParsedListQuery {
    ParsedListQuery {
        filter: resolve_filter(params, config),
        order_by: resolve_order(params, config),
        limit: resolve_limit(params.get(LIMIT_PARAM), config),
        offset: resolve_offset(params.get(OFFSET_PARAM)),
    }
}

fn resolve_filter(params: &QueryPairs, config: &ListQueryConfig) -> Option<Predicate> {
    let mut conditions = Vec::new();

    for (name, raw) in params.iter() {
        if is_reserved(name) || raw.is_empty() {
            continue;
        }

        if let Some(filter) = config.filter(name) {
            let op = filter.operator();
            let value = if op.takes_list() {
                FilterValue::Many(raw.split(',').map(|part| filter.coerce_value(part)).collect())
            } else {
                FilterValue::Single(filter.coerce_value(raw))
            };
            conditions.push(op.apply(filter.column(), value));
        } else if let Some(custom) = config.custom_filter(name) {
            match custom.call(raw) {
                Some(predicate) => conditions.push(predicate),
                None => tracing::trace!(param = %name, "custom filter produced no condition"),
            }
        } else {
            tracing::trace!(param = %name, "ignoring parameter outside the allowlist");
        }
    }

    Predicate::and(conditions)
}

fn resolve_order(params: &QueryPairs, config: &ListQueryConfig) -> OrderBy {
    let default = config.default_sort();

    let column = match params.get(SORT_PARAM).filter(|key| !key.is_empty()) {
        Some(key) => match config.sortable_column(key) {
            Some(column) => column,
            None => {
                tracing::debug!(sort = %key, fallback = %default.key, "unknown sort key");
                config.default_sort_column()
            }
        },
        None => config.default_sort_column(),
    };

    let direction = match params.get(ORDER_PARAM) {
        Some(raw) => SortDirection::parse(raw).unwrap_or_else(|| {
            if !raw.is_empty() {
                tracing::debug!(order = %raw, fallback = %default.direction, "invalid sort order");
            }
            default.direction
        }),
        None => default.direction,
    };

    OrderBy::new(column.clone(), direction)
}

fn resolve_limit(raw: Option<&str>, config: &ListQueryConfig) -> u64 {
    match raw.and_then(parse_leading_int) {
        Some(requested) => (requested.max(1) as u64).min(config.max_limit()),
        None => {
            if raw.is_some_and(|r| !r.is_empty()) {
                tracing::debug!(limit = ?raw, "unparseable limit, using default");
            }
            config.default_limit()
        }
    }
}

fn resolve_offset(raw: Option<&str>) -> u64 {
    raw.and_then(parse_leading_int)
        .map(|offset| offset.max(0) as u64)
        .unwrap_or(0)
}

/// Parse the leading integer of `raw`.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit, so `"12.9"` is 12 and `"7px"` is 7. Out-of-range values
/// saturate. `None` when no digit follows the optional sign.
pub(crate) fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        let digit = i64::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }

    seen_digit.then_some(value)
}
