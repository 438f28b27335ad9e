//! In-memory implementation of DataStore for testing and development

use crate::core::field::FieldValue;
use crate::core::predicate::{Column, OrderBy, Predicate, SortDirection};
use crate::core::store::{DataStore, SelectQuery};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// One stored row: column name to value
pub type Record = IndexMap<String, FieldValue>;

/// In-memory table store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Predicates follow SQL semantics: comparisons involving a missing column or
/// `Null` are false, and `LIKE` patterns honor `%` and `_`.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `table` if it does not exist yet
    pub fn create_table(&self, table: &str) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables.entry(table.to_string()).or_default();

        Ok(())
    }

    /// Append a row, creating the table on first use
    pub fn insert(&self, table: &str, record: Record) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables.entry(table.to_string()).or_default().push(record);

        Ok(())
    }

    /// Append a row given as a JSON object
    pub fn insert_json(&self, table: &str, row: serde_json::Value) -> Result<()> {
        let record: Record = serde_json::from_value(row)
            .map_err(|e| anyhow!("Failed to convert row into a record: {}", e))?;
        self.insert(table, record)
    }

    /// Number of rows in `table` (0 if it does not exist)
    pub fn len(&self, table: &str) -> Result<usize> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.get(table).map_or(0, Vec::len))
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    type Row = Record;

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let rows = tables
            .get(table)
            .ok_or_else(|| anyhow!("Table '{}' not found", table))?;

        let mut matched: Vec<&Record> = rows
            .iter()
            .filter(|record| query.filter.as_ref().is_none_or(|p| evaluate(p, record)))
            .collect();

        matched.sort_by(|a, b| compare_rows(a, b, &query.order_by));

        Ok(matched
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, table: &str, filter: Option<&Predicate>) -> Result<Option<u64>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let rows = tables
            .get(table)
            .ok_or_else(|| anyhow!("Table '{}' not found", table))?;

        let count = rows
            .iter()
            .filter(|record| filter.is_none_or(|p| evaluate(p, record)))
            .count();

        Ok(Some(count as u64))
    }
}

/// Evaluate `predicate` against one record
pub fn evaluate(predicate: &Predicate, record: &Record) -> bool {
    let compare = |column: &Column, value: &FieldValue| {
        record
            .get(column.name())
            .and_then(|stored| stored.compare(value))
    };

    match predicate {
        Predicate::Eq { column, value } => compare(column, value) == Some(Ordering::Equal),
        Predicate::Gt { column, value } => compare(column, value) == Some(Ordering::Greater),
        Predicate::Gte { column, value } => matches!(
            compare(column, value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Predicate::Lt { column, value } => compare(column, value) == Some(Ordering::Less),
        Predicate::Lte { column, value } => matches!(
            compare(column, value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Predicate::Like { column, pattern } => record
            .get(column.name())
            .and_then(FieldValue::as_text)
            .is_some_and(|text| like_matches(&text, pattern)),
        Predicate::In { column, values } => record
            .get(column.name())
            .is_some_and(|stored| values.iter().any(|v| stored.sql_eq(v))),
        Predicate::And(conditions) => conditions.iter().all(|p| evaluate(p, record)),
        Predicate::Or(conditions) => conditions.iter().any(|p| evaluate(p, record)),
        Predicate::Not(inner) => !evaluate(inner, record),
    }
}

/// SQL `LIKE` matching: `%` is any run of characters, `_` exactly one
fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut t, mut p) = (0, 0);
    // position of the last `%` seen and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('_') => {
                t += 1;
                p += 1;
            }
            Some(c) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, mark)) => {
                    p = star + 1;
                    t = mark + 1;
                    backtrack = Some((star, mark + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

/// Nulls sort last ascending and first descending
fn compare_rows(a: &Record, b: &Record, order_by: &OrderBy) -> Ordering {
    let left = a.get(order_by.column.name()).filter(|v| !v.is_null());
    let right = b.get(order_by.column.name()).filter(|v| !v.is_null());

    let ordering = match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => l
            .compare(r)
            .unwrap_or_else(|| kind_rank(l).cmp(&kind_rank(r))),
    };

    match order_by.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Fixed order between kinds that do not compare with each other.
///
/// Kinds that do compare share a rank, so the ordering stays total.
fn kind_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Boolean(_) => 0,
        FieldValue::Integer(_) | FieldValue::Float(_) => 1,
        FieldValue::Uuid(_) | FieldValue::String(_) => 2,
        FieldValue::DateTime(_) => 3,
        FieldValue::Null => 4,
    }
}
