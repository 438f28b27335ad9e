//! Comparison operators for column filters

use crate::core::error::ConfigError;
use crate::core::field::FieldValue;
use crate::core::predicate::{Column, Predicate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Comparison applied by a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    #[default]
    Eq,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

/// Coerced operand handed to an operator
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Single(FieldValue),
    Many(Vec<FieldValue>),
}

impl FilterValue {
    /// Scalar view. A sequence contributes its first element.
    fn into_single(self) -> FieldValue {
        match self {
            FilterValue::Single(value) => value,
            FilterValue::Many(values) => values.into_iter().next().unwrap_or(FieldValue::Null),
        }
    }

    /// Sequence view. A scalar becomes a one-element sequence.
    fn into_many(self) -> Vec<FieldValue> {
        match self {
            FilterValue::Single(value) => vec![value],
            FilterValue::Many(values) => values,
        }
    }
}

impl From<FieldValue> for FilterValue {
    fn from(value: FieldValue) -> Self {
        FilterValue::Single(value)
    }
}

impl From<Vec<FieldValue>> for FilterValue {
    fn from(values: Vec<FieldValue>) -> Self {
        FilterValue::Many(values)
    }
}

impl FilterOp {
    /// Build the predicate comparing `column` against `value`.
    ///
    /// `Contains` wraps the value as `%value%` without escaping, so `%` and
    /// `_` supplied by the caller keep their wildcard meaning. A `Null`
    /// operand yields an equality against `Null`, which matches no row.
    pub fn apply(self, column: &Column, value: impl Into<FilterValue>) -> Predicate {
        let value = value.into();
        match self {
            FilterOp::Eq => column.eq(value.into_single()),
            FilterOp::Gt => column.gt(value.into_single()),
            FilterOp::Gte => column.gte(value.into_single()),
            FilterOp::Lt => column.lt(value.into_single()),
            FilterOp::Lte => column.lte(value.into_single()),
            FilterOp::Contains => {
                let operand = value.into_single();
                match operand.as_text() {
                    Some(needle) => column.like(format!("%{needle}%")),
                    // no text form: compare against NULL so nothing matches
                    None => column.eq(FieldValue::Null),
                }
            }
            FilterOp::In => column.is_in(value.into_many()),
        }
    }

    /// Whether raw input is split on commas before coercion
    pub fn takes_list(self) -> bool {
        matches!(self, FilterOp::In)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Contains => "contains",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
        }
    }
}

impl FromStr for FilterOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(FilterOp::Eq),
            "contains" => Ok(FilterOp::Contains),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            "in" => Ok(FilterOp::In),
            other => Err(ConfigError::InvalidValue {
                field: "op".to_string(),
                value: other.to_string(),
                message: "expected one of eq, contains, gt, gte, lt, lte, in".to_string(),
            }),
        }
    }
}
