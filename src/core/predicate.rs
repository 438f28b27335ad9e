//! Column references, predicates and ordering expressions
//!
//! This is the expression vocabulary shared by the translator and the data
//! stores. The translator only builds and composes predicates; evaluating or
//! rendering them is the job of a [`DataStore`](crate::core::store::DataStore).

use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a column of the target table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Column {
    name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eq(&self, value: impl Into<FieldValue>) -> Predicate {
        Predicate::Eq {
            column: self.clone(),
            value: value.into(),
        }
    }

    pub fn gt(&self, value: impl Into<FieldValue>) -> Predicate {
        Predicate::Gt {
            column: self.clone(),
            value: value.into(),
        }
    }

    pub fn gte(&self, value: impl Into<FieldValue>) -> Predicate {
        Predicate::Gte {
            column: self.clone(),
            value: value.into(),
        }
    }

    pub fn lt(&self, value: impl Into<FieldValue>) -> Predicate {
        Predicate::Lt {
            column: self.clone(),
            value: value.into(),
        }
    }

    pub fn lte(&self, value: impl Into<FieldValue>) -> Predicate {
        Predicate::Lte {
            column: self.clone(),
            value: value.into(),
        }
    }

    /// Pattern match with SQL `LIKE` wildcards (`%`, `_`). The pattern is
    /// used verbatim.
    pub fn like(&self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            column: self.clone(),
            pattern: pattern.into(),
        }
    }

    pub fn is_in(&self, values: Vec<FieldValue>) -> Predicate {
        Predicate::In {
            column: self.clone(),
            values,
        }
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.clone(), SortDirection::Asc)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.clone(), SortDirection::Desc)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A boolean condition over a row
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: Column, value: FieldValue },
    Gt { column: Column, value: FieldValue },
    Gte { column: Column, value: FieldValue },
    Lt { column: Column, value: FieldValue },
    Lte { column: Column, value: FieldValue },
    Like { column: Column, pattern: String },
    In { column: Column, values: Vec<FieldValue> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Conjunction of `conditions`.
    ///
    /// Zero conditions yield `None` rather than an always-true predicate, so
    /// the result can be AND-ed onto another condition without replacing it.
    /// A single condition is returned as-is.
    pub fn and(mut conditions: Vec<Predicate>) -> Option<Predicate> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Predicate::And(conditions)),
        }
    }

    /// Disjunction of `conditions`, with the same empty/single rules as [`Predicate::and`].
    pub fn or(mut conditions: Vec<Predicate>) -> Option<Predicate> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Predicate::Or(conditions)),
        }
    }

    /// AND two optional conditions. If only one is present it is returned
    /// unchanged; if neither is, the result is `None`.
    pub fn and_opt(left: Option<Predicate>, right: Option<Predicate>) -> Option<Predicate> {
        match (left, right) {
            (Some(left), Some(right)) => Some(Predicate::And(vec![left, right])),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Sort direction of an ordering expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts exactly `asc` or `desc`; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering over a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}
