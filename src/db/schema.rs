//! SQL DDL bundled with the binary for bootstrapping the store.
//! A `schema_path` in the config replaces it with a file read at startup.

/// SQLite schema with:
/// - `list.id` and `grocery_item.id` client-supplied INTEGER primary keys
/// - `list_item` keyed by `(on_list, grocery_item_id)`, both foreign keys,
///   removed together with the list or grocery item they point at
/// - `checked` stored as INTEGER 0/1
/// - stock counters guarded by CHECK constraints
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS list (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS grocery_item (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    current INTEGER NOT NULL DEFAULT 0 CHECK (current >= 0),
    minimum INTEGER NOT NULL DEFAULT 0 CHECK (minimum >= 0)
);

CREATE TABLE IF NOT EXISTS list_item (
    on_list INTEGER NOT NULL REFERENCES list(id) ON DELETE CASCADE,
    grocery_item_id INTEGER NOT NULL REFERENCES grocery_item(id) ON DELETE CASCADE,
    quantity INTEGER NOT NULL DEFAULT 0,
    checked INTEGER NOT NULL DEFAULT 0 CHECK (checked IN (0, 1)),
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (on_list, grocery_item_id)
);

CREATE INDEX IF NOT EXISTS idx_list_item_grocery_item_id ON list_item(grocery_item_id);
"#;
