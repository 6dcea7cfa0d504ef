use thiserror::Error as ThisError;

use super::field::SqlValue;
use super::resolve::{ChangeSet, Identity};
use crate::db::models::{Column, EntityShape};

/// Misuse of the statement builder. These never come from client input.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BuildError {
    #[error("empty change-set for table {table}")]
    EmptyChangeSet { table: &'static str },

    #[error("column `{column}` is not part of table {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("identity column `{column}` of table {table} cannot be updated")]
    KeyInChangeSet {
        table: &'static str,
        column: &'static str,
    },

    #[error("insert into {table} is missing key column `{column}`")]
    MissingKey {
        table: &'static str,
        column: &'static str,
    },
}

/// Rendered SQL with its positional parameters. Values are always bound,
/// never spliced into the SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// `UPDATE <table> SET c1 = ?, ... WHERE k1 = ? [AND k2 = ?]`
    pub fn update(
        shape: &EntityShape,
        changes: &ChangeSet,
        identity: &Identity,
    ) -> Result<Self, BuildError> {
        if changes.is_empty() {
            return Err(BuildError::EmptyChangeSet { table: shape.table });
        }
        check_identity(shape, identity)?;

        let mut assignments = Vec::with_capacity(changes.len());
        let mut params = Vec::with_capacity(changes.len() + identity.pairs().len());
        for (column, value) in changes.iter() {
            let known = known_column(shape, column)?;
            if known.key {
                return Err(BuildError::KeyInChangeSet {
                    table: shape.table,
                    column: known.name,
                });
            }
            assignments.push(format!("{column} = ?"));
            params.push(value.clone());
        }

        let mut sql = format!("UPDATE {} SET {}", shape.table, assignments.join(", "));
        push_predicate(&mut sql, &mut params, identity.pairs());
        Ok(Self { sql, params })
    }

    /// `INSERT INTO <table> (c1, ...) VALUES (?, ...)`
    pub fn insert(shape: &EntityShape, changes: &ChangeSet) -> Result<Self, BuildError> {
        if changes.is_empty() {
            return Err(BuildError::EmptyChangeSet { table: shape.table });
        }
        for column in changes.columns() {
            known_column(shape, column)?;
        }
        if let Some(key) = shape
            .key_columns()
            .find(|k| changes.get(k.name).is_none())
        {
            return Err(BuildError::MissingKey {
                table: shape.table,
                column: key.name,
            });
        }

        let columns: Vec<_> = changes.columns().collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            shape.table,
            columns.join(", "),
            placeholders
        );
        let params = changes.iter().map(|(_, v)| v.clone()).collect();
        Ok(Self { sql, params })
    }

    /// Select every declared column, optionally filtered by equality on
    /// `filter`, in the shape's read order.
    pub fn select(shape: &EntityShape, filter: &[(&'static str, i64)]) -> Result<Self, BuildError> {
        for (column, _) in filter {
            known_column(shape, column)?;
        }

        let projection: Vec<_> = shape.columns.iter().map(|c| c.name).collect();
        let mut sql = format!("SELECT {} FROM {}", projection.join(", "), shape.table);
        let mut params = Vec::with_capacity(filter.len());
        push_predicate(&mut sql, &mut params, filter);
        if !shape.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&shape.order_by.join(", "));
        }
        Ok(Self { sql, params })
    }

    /// `DELETE FROM <table> WHERE k1 = ? [AND k2 = ?]`
    pub fn delete(shape: &EntityShape, identity: &Identity) -> Result<Self, BuildError> {
        check_identity(shape, identity)?;
        let mut sql = format!("DELETE FROM {}", shape.table);
        let mut params = Vec::with_capacity(identity.pairs().len());
        push_predicate(&mut sql, &mut params, identity.pairs());
        Ok(Self { sql, params })
    }
}

fn known_column<'s>(shape: &'s EntityShape, column: &str) -> Result<&'s Column, BuildError> {
    shape.column(column).ok_or_else(|| BuildError::UnknownColumn {
        table: shape.table,
        column: column.to_string(),
    })
}

fn check_identity(shape: &EntityShape, identity: &Identity) -> Result<(), BuildError> {
    let expected = shape.key_columns().map(|c| c.name);
    let supplied = identity.pairs().iter().map(|(c, _)| *c);
    if expected.eq(supplied) {
        return Ok(());
    }
    let column = identity
        .pairs()
        .iter()
        .find(|(c, _)| !shape.key_columns().any(|k| k.name == *c))
        .map(|(c, _)| c.to_string())
        .unwrap_or_else(|| "<identity>".to_string());
    Err(BuildError::UnknownColumn {
        table: shape.table,
        column,
    })
}

fn push_predicate(sql: &mut String, params: &mut Vec<SqlValue>, pairs: &[(&'static str, i64)]) {
    for (i, (column, value)) in pairs.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(column);
        sql.push_str(" = ?");
        params.push(SqlValue::Integer(*value));
    }
}
