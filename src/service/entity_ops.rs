use crate::config::Config;
use crate::db::models::{Entity, List, ListItem};
use crate::db::schema::SQLITE_INIT;
use crate::db::sqlite::GroceryStorage;
use crate::error::GroceryError;
use crate::patch::{
    Identity, ResolvedPatch, Statement, decode_slice, resolve_create, resolve_patch,
};
use std::fs;
use tracing::{debug, info};

/// Entity operations composed from the patch pipeline and the gateway.
///
/// All methods are generic over the entity type; the entity's shape decides
/// the table, columns and identity involved.
#[derive(Clone)]
pub struct EntityOps {
    storage: GroceryStorage,
}

impl EntityOps {
    pub fn new(storage: GroceryStorage) -> Self {
        Self { storage }
    }

    /// Connect to the configured database and bootstrap its schema.
    pub async fn from_config(cfg: &Config) -> Result<Self, GroceryError> {
        let storage = GroceryStorage::connect(&cfg.database_url, cfg.max_connections).await?;
        match cfg.schema_path.as_ref() {
            Some(path) => {
                info!(path = %path.display(), "applying schema from file");
                let ddl = fs::read_to_string(path)?;
                storage.init_schema(&ddl).await?;
            }
            None => storage.init_schema(SQLITE_INIT).await?,
        }
        Ok(Self::new(storage))
    }

    pub fn storage(&self) -> &GroceryStorage {
        &self.storage
    }

    pub async fn all<E: Entity>(&self) -> Result<Vec<E>, GroceryError> {
        self.storage.fetch_all(&[]).await
    }

    pub async fn get<E: Entity>(&self, key: &[(&str, i64)]) -> Result<E, GroceryError> {
        let identity = Identity::resolve(E::SHAPE, key)?;
        self.storage
            .fetch(&identity)
            .await?
            .ok_or_else(|| not_found::<E>(&identity))
    }

    /// Insert a full entity. Omitted optional fields take their column default.
    pub async fn create<E: Entity>(&self, body: &[u8]) -> Result<E, GroceryError> {
        let shape = E::SHAPE;
        let fields = decode_slice(body, shape.columns)?;
        let (changes, identity) = resolve_create(shape, &fields)?;
        let stmt = Statement::insert(shape, &changes)?;

        self.storage
            .write_and_fetch(&stmt, &identity)
            .await?
            .ok_or_else(|| not_found::<E>(&identity))
    }

    /// Apply a partial update and return the row as stored afterwards.
    ///
    /// A payload that changes nothing issues no write and returns the
    /// current row, or not-found if there is none.
    pub async fn patch<E: Entity>(
        &self,
        key: &[(&str, i64)],
        body: &[u8],
    ) -> Result<E, GroceryError> {
        let shape = E::SHAPE;
        let fields = decode_slice(body, shape.patchable())?;

        match resolve_patch(shape, &fields, key)? {
            ResolvedPatch::NoOp(identity) => {
                debug!(table = shape.table, %identity, "no-op patch; skipping write");
                self.storage
                    .fetch(&identity)
                    .await?
                    .ok_or_else(|| not_found::<E>(&identity))
            }
            ResolvedPatch::Update { changes, identity } => {
                let stmt = Statement::update(shape, &changes, &identity)?;
                info!(
                    table = shape.table,
                    %identity,
                    columns = ?changes.columns().collect::<Vec<_>>(),
                    "patching"
                );
                self.storage
                    .write_and_fetch(&stmt, &identity)
                    .await?
                    .ok_or_else(|| not_found::<E>(&identity))
            }
        }
    }

    pub async fn delete<E: Entity>(&self, key: &[(&str, i64)]) -> Result<(), GroceryError> {
        let identity = Identity::resolve(E::SHAPE, key)?;
        let stmt = Statement::delete(E::SHAPE, &identity)?;
        match self.storage.execute(&stmt).await? {
            0 => Err(not_found::<E>(&identity)),
            _ => Ok(()),
        }
    }

    /// Items placed on one list, ordered by position.
    pub async fn items_on_list(&self, list_id: i64) -> Result<Vec<ListItem>, GroceryError> {
        self.get::<List>(&[("id", list_id)]).await?;
        self.storage.fetch_all(&[("on_list", list_id)]).await
    }
}

fn not_found<E: Entity>(identity: &Identity) -> GroceryError {
    GroceryError::NotFound {
        entity: E::SHAPE.entity,
        key: identity.to_string(),
    }
}
