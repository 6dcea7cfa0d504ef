//! Database module: entity models, schema and the SQLite gateway.
//!
//! Layout:
//! - `models.rs`: row structs and the static shape of each table
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: pool handling and statement execution

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Entity, EntityShape, GroceryItem, List, ListItem};
pub use schema::SQLITE_INIT;
pub use sqlite::{GroceryStorage, SqlitePool};
