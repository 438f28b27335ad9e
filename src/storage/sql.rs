//! SQL rendering for list queries
//!
//! Turns a [`SelectQuery`] (or a count) into parameterized PostgreSQL text.
//! Every non-null value is bound as a `$n` parameter; only identifiers are
//! written into the text, and those are validated and quoted first. `LIKE`
//! patterns are bound as given, so wildcards inside a `contains` value keep
//! working.
//!
//! `Null` operands are written as the literal `NULL`. A bound null would be
//! typed as text and fail against non-text columns; the literal compares to
//! unknown instead, so the condition matches nothing.

use crate::core::field::FieldValue;
use crate::core::predicate::{Column, OrderBy, Predicate};
use crate::core::store::SelectQuery;
use anyhow::{Result, anyhow};
use regex::Regex;
use std::sync::OnceLock;

/// Rendered SQL with its bind parameters in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

pub fn render_select(table: &str, query: &SelectQuery) -> Result<SqlStatement> {
    let mut writer = SqlWriter::new();
    writer.sql.push_str("SELECT * FROM ");
    writer.push_identifier(table)?;
    if let Some(filter) = &query.filter {
        writer.sql.push_str(" WHERE ");
        writer.push_predicate(filter)?;
    }
    writer.push_order_by(&query.order_by)?;
    writer
        .sql
        .push_str(&format!(" LIMIT {} OFFSET {}", query.limit, query.offset));
    Ok(writer.finish())
}

pub fn render_count(table: &str, filter: Option<&Predicate>) -> Result<SqlStatement> {
    let mut writer = SqlWriter::new();
    writer.sql.push_str("SELECT COUNT(*) FROM ");
    writer.push_identifier(table)?;
    if let Some(filter) = filter {
        writer.sql.push_str(" WHERE ");
        writer.push_predicate(filter)?;
    }
    Ok(writer.finish())
}

fn is_valid_identifier(name: &str) -> bool {
    static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = IDENTIFIER_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("identifier regex is valid")
    });
    regex.is_match(name)
}

struct SqlWriter {
    sql: String,
    params: Vec<FieldValue>,
}

impl SqlWriter {
    fn new() -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn finish(self) -> SqlStatement {
        SqlStatement {
            sql: self.sql,
            params: self.params,
        }
    }

    fn push_identifier(&mut self, name: &str) -> Result<()> {
        if !is_valid_identifier(name) {
            return Err(anyhow!("Invalid SQL identifier: {:?}", name));
        }
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                self.sql.push('.');
            }
            self.sql.push('"');
            self.sql.push_str(part);
            self.sql.push('"');
        }
        Ok(())
    }

    fn push_param(&mut self, value: FieldValue) {
        if value.is_null() {
            self.sql.push_str("NULL");
            return;
        }
        self.params.push(value);
        self.sql.push_str(&format!("${}", self.params.len()));
    }

    fn push_comparison(&mut self, column: &Column, op: &str, value: &FieldValue) -> Result<()> {
        self.push_identifier(column.name())?;
        self.sql.push(' ');
        self.sql.push_str(op);
        self.sql.push(' ');
        self.push_param(value.clone());
        Ok(())
    }

    fn push_group(&mut self, conditions: &[Predicate], joiner: &str, empty: &str) -> Result<()> {
        if conditions.is_empty() {
            self.sql.push_str(empty);
            return Ok(());
        }
        self.sql.push('(');
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(joiner);
            }
            self.push_predicate(condition)?;
        }
        self.sql.push(')');
        Ok(())
    }

    fn push_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        match predicate {
            Predicate::Eq { column, value } => self.push_comparison(column, "=", value),
            Predicate::Gt { column, value } => self.push_comparison(column, ">", value),
            Predicate::Gte { column, value } => self.push_comparison(column, ">=", value),
            Predicate::Lt { column, value } => self.push_comparison(column, "<", value),
            Predicate::Lte { column, value } => self.push_comparison(column, "<=", value),
            Predicate::Like { column, pattern } => {
                self.push_comparison(column, "LIKE", &FieldValue::String(pattern.clone()))
            }
            Predicate::In { column, values } => {
                if values.is_empty() {
                    self.sql.push_str("1 = 0");
                    return Ok(());
                }
                self.push_identifier(column.name())?;
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.push_param(value.clone());
                }
                self.sql.push(')');
                Ok(())
            }
            Predicate::And(conditions) => self.push_group(conditions, " AND ", "1 = 1"),
            Predicate::Or(conditions) => self.push_group(conditions, " OR ", "1 = 0"),
            Predicate::Not(inner) => {
                self.sql.push_str("NOT (");
                self.push_predicate(inner)?;
                self.sql.push(')');
                Ok(())
            }
        }
    }

    fn push_order_by(&mut self, order_by: &OrderBy) -> Result<()> {
        self.sql.push_str(" ORDER BY ");
        self.push_identifier(order_by.column.name())?;
        self.sql.push(' ');
        self.sql
            .push_str(&order_by.direction.as_str().to_ascii_uppercase());
        Ok(())
    }
}
