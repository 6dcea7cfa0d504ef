use std::collections::HashMap;
use std::fmt;

/// A literal bound into a statement. Flags travel as `Integer` 0/1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "{s:?}"),
            SqlValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// Presence of one field in a partial payload.
///
/// `Absent` (key not sent) and `Null` (key sent as `null`) are kept apart so
/// callers can decide what each means instead of collapsing them into a
/// sentinel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Field<T> {
    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(v),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

/// Per-column tri-state decoded from a partial payload.
///
/// Only the columns handed to the decoder are recorded; looking up any other
/// name yields `Field::Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseFields {
    fields: HashMap<&'static str, Field<SqlValue>>,
}

impl SparseFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &'static str, field: Field<SqlValue>) {
        self.fields.insert(column, field);
    }

    /// Builder-style insert, mostly handy for assembling fields by hand.
    pub fn with(mut self, column: &'static str, field: Field<SqlValue>) -> Self {
        self.insert(column, field);
        self
    }

    pub fn get(&self, column: &str) -> Field<&SqlValue> {
        self.fields
            .get(column)
            .map(Field::as_ref)
            .unwrap_or(Field::Absent)
    }

    pub fn present_count(&self) -> usize {
        self.fields
            .values()
            .filter(|f| matches!(f, Field::Present(_)))
            .count()
    }
}
