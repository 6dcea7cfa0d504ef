use std::fmt;

use thiserror::Error as ThisError;
use tracing::debug;

use super::field::{Field, SparseFields, SqlValue};
use crate::db::models::EntityShape;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum InvalidPatchError {
    #[error("{entity} identity is incomplete: missing `{column}`")]
    IncompleteIdentity {
        entity: &'static str,
        column: &'static str,
    },

    #[error("`{column}` is not an identity column of {entity}")]
    UnknownKey { entity: &'static str, column: String },

    #[error("identity column `{column}` supplied more than once")]
    DuplicateKey { column: &'static str },

    #[error("field `{column}` is required to create a {entity}")]
    MissingField {
        entity: &'static str,
        column: &'static str,
    },
}

/// Key column/value pairs selecting exactly one row, in the shape's key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pairs: Vec<(&'static str, i64)>,
}

impl Identity {
    /// Validate the key parts taken from a route against `shape`.
    ///
    /// Every key column must be supplied exactly once and nothing else may
    /// be supplied. The order of `supplied` does not matter.
    pub fn resolve(shape: &EntityShape, supplied: &[(&str, i64)]) -> Result<Self, InvalidPatchError> {
        if let Some((column, _)) = supplied
            .iter()
            .find(|(name, _)| !shape.key_columns().any(|c| c.name == *name))
        {
            return Err(InvalidPatchError::UnknownKey {
                entity: shape.entity,
                column: column.to_string(),
            });
        }

        let mut pairs = Vec::new();
        for key in shape.key_columns() {
            let mut matching = supplied.iter().filter(|(name, _)| *name == key.name);
            let Some((_, value)) = matching.next() else {
                return Err(InvalidPatchError::IncompleteIdentity {
                    entity: shape.entity,
                    column: key.name,
                });
            };
            if matching.next().is_some() {
                return Err(InvalidPatchError::DuplicateKey { column: key.name });
            }
            pairs.push((key.name, *value));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(&'static str, i64)] {
        &self.pairs
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}={value}")?;
        }
        Ok(())
    }
}

/// Ordered `(column, value)` pairs to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<(&'static str, SqlValue)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &'static str, value: SqlValue) {
        self.entries.push((column, value));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, SqlValue)> {
        self.entries.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }
}

impl FromIterator<(&'static str, SqlValue)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (&'static str, SqlValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of resolving a PATCH payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPatch {
    /// Nothing to write; the caller reports the stored row as-is.
    NoOp(Identity),
    Update {
        changes: ChangeSet,
        identity: Identity,
    },
}

/// Decide which columns a PATCH writes.
///
/// Walks the shape's non-key columns in declaration order and keeps those the
/// payload carried a value for. Absent and `null` fields are both left
/// untouched; there is no way to clear a column through PATCH.
pub fn resolve_patch(
    shape: &EntityShape,
    fields: &SparseFields,
    key: &[(&str, i64)],
) -> Result<ResolvedPatch, InvalidPatchError> {
    let identity = Identity::resolve(shape, key)?;

    let mut changes = ChangeSet::new();
    for column in shape.patchable() {
        match fields.get(column.name) {
            Field::Present(value) => changes.push(column.name, value.clone()),
            Field::Null => debug!(column = column.name, "null field treated as absent"),
            Field::Absent => {}
        }
    }

    if changes.is_empty() {
        debug!(table = shape.table, %identity, "patch resolved to no-op");
        return Ok(ResolvedPatch::NoOp(identity));
    }
    Ok(ResolvedPatch::Update { changes, identity })
}

/// Resolve a create payload into a full-column change-set.
///
/// Every column appears in declaration order; fields left out take the
/// column default. Key columns and columns without a default must be sent.
pub fn resolve_create(
    shape: &EntityShape,
    fields: &SparseFields,
) -> Result<(ChangeSet, Identity), InvalidPatchError> {
    let mut changes = ChangeSet::new();
    let mut key = Vec::new();

    for column in shape.columns {
        let value = match (fields.get(column.name), column.default) {
            (Field::Present(value), _) => value.clone(),
            (_, Some(default)) if !column.key => default.to_value(),
            _ if column.key => {
                return Err(InvalidPatchError::IncompleteIdentity {
                    entity: shape.entity,
                    column: column.name,
                });
            }
            _ => {
                return Err(InvalidPatchError::MissingField {
                    entity: shape.entity,
                    column: column.name,
                });
            }
        };
        if column.key {
            let SqlValue::Integer(id) = value else {
                return Err(InvalidPatchError::IncompleteIdentity {
                    entity: shape.entity,
                    column: column.name,
                });
            };
            key.push((column.name, id));
        }
        changes.push(column.name, value);
    }

    let identity = Identity::resolve(shape, &key)?;
    Ok((changes, identity))
}
