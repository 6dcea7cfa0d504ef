use crate::db::models::Entity;
use crate::db::schema::SQLITE_INIT;
use crate::error::GroceryError;
use crate::patch::{Identity, SqlValue, Statement};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Persistence gateway: runs built statements against the pool.
///
/// Every call checks a connection out of the pool for its own duration.
/// Writes run inside a transaction that is only committed on success, so an
/// early return or error drops the transaction and rolls it back.
#[derive(Clone)]
pub struct GroceryStorage {
    pool: SqlitePool,
}

impl GroceryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open (creating if missing) the database at `database_url` with
    /// foreign-key enforcement switched on for every pooled connection.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, GroceryError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    /// Single-connection in-memory store with the bundled schema applied.
    pub async fn in_memory() -> Result<Self, GroceryError> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // One connection that never idles out, otherwise the database vanishes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema(SQLITE_INIT).await?;
        Ok(storage)
    }

    /// Apply a DDL script statement by statement.
    pub async fn init_schema(&self, ddl: &str) -> Result<(), GroceryError> {
        // sqlx::query runs one statement at a time
        for stmt in ddl.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Look up one row by identity. An empty result is `None`, not an error.
    pub async fn fetch<E: Entity>(&self, identity: &Identity) -> Result<Option<E>, GroceryError> {
        let stmt = Statement::select(E::SHAPE, identity.pairs())?;
        debug!(sql = stmt.sql(), params = ?stmt.params(), "fetch");

        let mut conn = self.pool.acquire().await?;
        let row = bind_query_as::<E>(&stmt)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// All rows matching `filter` (every row when empty) in the shape's read order.
    pub async fn fetch_all<E: Entity>(
        &self,
        filter: &[(&'static str, i64)],
    ) -> Result<Vec<E>, GroceryError> {
        let stmt = Statement::select(E::SHAPE, filter)?;
        debug!(sql = stmt.sql(), params = ?stmt.params(), "fetch_all");

        let mut conn = self.pool.acquire().await?;
        let rows = bind_query_as::<E>(&stmt).fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    /// Execute a write in its own transaction and return the affected row count.
    pub async fn execute(&self, stmt: &Statement) -> Result<u64, GroceryError> {
        debug!(sql = stmt.sql(), params = ?stmt.params(), "execute");

        let mut tx = self.pool.begin().await?;
        let affected = bind_query(stmt).execute(&mut *tx).await?.rows_affected();
        tx.commit().await?;
        Ok(affected)
    }

    /// Execute a keyed write and read the row back in the same transaction.
    ///
    /// Returns `None` when the write touched no rows; nothing is committed
    /// in that case.
    pub async fn write_and_fetch<E: Entity>(
        &self,
        stmt: &Statement,
        identity: &Identity,
    ) -> Result<Option<E>, GroceryError> {
        let select = Statement::select(E::SHAPE, identity.pairs())?;
        debug!(sql = stmt.sql(), params = ?stmt.params(), "write_and_fetch");

        let mut tx = self.pool.begin().await?;
        let affected = bind_query(stmt).execute(&mut *tx).await?.rows_affected();
        if affected == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = bind_query_as::<E>(&select)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row)
    }
}

fn bind_query(stmt: &Statement) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    stmt.params()
        .iter()
        .fold(sqlx::query::<Sqlite>(stmt.sql()), |q, param| match param {
            SqlValue::Text(s) => q.bind(s.as_str()),
            SqlValue::Integer(i) => q.bind(*i),
        })
}

fn bind_query_as<E: Entity>(stmt: &Statement) -> QueryAs<'_, Sqlite, E, SqliteArguments<'_>> {
    stmt.params()
        .iter()
        .fold(sqlx::query_as::<Sqlite, E>(stmt.sql()), |q, param| match param {
            SqlValue::Text(s) => q.bind(s.as_str()),
            SqlValue::Integer(i) => q.bind(*i),
        })
}
