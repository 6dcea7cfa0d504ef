use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

use crate::patch::SqlValue;

/// Semantic type of a persisted column, as seen by the payload decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    /// Boolean stored as INTEGER 0/1.
    Flag,
}

/// Value used for a column when a create payload leaves it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    Text(&'static str),
    Integer(i64),
}

impl ColumnDefault {
    pub fn to_value(self) -> SqlValue {
        match self {
            ColumnDefault::Text(s) => SqlValue::Text(s.to_string()),
            ColumnDefault::Integer(i) => SqlValue::Integer(i),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Part of the identity predicate. Key columns are never patchable.
    pub key: bool,
    pub default: Option<ColumnDefault>,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            key: false,
            default: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn flag(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Flag)
    }

    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub const fn or_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Static description of one table: its columns in declaration order,
/// which of them form the identity, and how reads are ordered.
///
/// Declaration order is load-bearing: change-sets, INSERT column lists and
/// SELECT projections all follow it, and key columns appear in the
/// identity predicate in the order they are declared here.
#[derive(Debug)]
pub struct EntityShape {
    /// Human readable name used in error messages.
    pub entity: &'static str,
    pub table: &'static str,
    pub columns: &'static [Column],
    pub order_by: &'static [&'static str],
}

impl EntityShape {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.key)
    }

    /// Columns a PATCH may touch: everything outside the identity.
    pub fn patchable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.key)
    }
}

pub static LIST_SHAPE: EntityShape = EntityShape {
    entity: "list",
    table: "list",
    columns: &[
        Column::integer("id").key(),
        Column::text("title").or_default(ColumnDefault::Text("")),
    ],
    order_by: &["id"],
};

pub static GROCERY_ITEM_SHAPE: EntityShape = EntityShape {
    entity: "grocery item",
    table: "grocery_item",
    columns: &[
        Column::integer("id").key(),
        Column::text("name"),
        Column::integer("current").or_default(ColumnDefault::Integer(0)),
        Column::integer("minimum").or_default(ColumnDefault::Integer(0)),
    ],
    order_by: &["id"],
};

pub static LIST_ITEM_SHAPE: EntityShape = EntityShape {
    entity: "list item",
    table: "list_item",
    columns: &[
        Column::integer("on_list").key(),
        Column::integer("grocery_item_id").key(),
        Column::integer("quantity").or_default(ColumnDefault::Integer(0)),
        Column::flag("checked").or_default(ColumnDefault::Integer(0)),
        Column::integer("position").or_default(ColumnDefault::Integer(0)),
    ],
    order_by: &["on_list", "position", "grocery_item_id"],
};

/// A row type that can be read back through the persistence gateway.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin + 'static {
    const SHAPE: &'static EntityShape;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct List {
    pub id: i64,
    pub title: String,
}

impl Entity for List {
    const SHAPE: &'static EntityShape = &LIST_SHAPE;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct GroceryItem {
    pub id: i64,
    pub name: String,
    pub current: i64,
    pub minimum: i64,
}

impl Entity for GroceryItem {
    const SHAPE: &'static EntityShape = &GROCERY_ITEM_SHAPE;
}

/// Association of a grocery item with a list, keyed by `(on_list, grocery_item_id)`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, FromRow)]
pub struct ListItem {
    pub on_list: i64,
    pub grocery_item_id: i64,
    pub quantity: i64,
    #[serde(serialize_with = "flag_as_int")]
    pub checked: bool,
    pub position: i64,
}

impl Entity for ListItem {
    const SHAPE: &'static EntityShape = &LIST_ITEM_SHAPE;
}

fn flag_as_int<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}
