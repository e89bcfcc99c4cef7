//! Load/save port for the persisted studio document.

use std::future::Future;
use std::pin::Pin;

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::entities::kv_store;
use crate::constants::STORAGE_KEY;
use crate::error::StudioError;
use crate::model::PersistedState;

/// Boxed future type returned by [`StateStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StudioError>> + Send + 'a>>;

/// Where the studio document lives.
pub trait StateStore: Send + Sync {
    /// Reads the raw document, `None` when nothing was saved yet.
    fn load_raw(&self) -> StoreFuture<'_, Option<String>>;
    /// Replaces the raw document.
    fn save_raw(&self, document: String) -> StoreFuture<'_, ()>;
}

/// Parses a stored document, falling back to the default state when it is
/// absent or malformed.
pub fn parse_document(raw: Option<&str>) -> PersistedState {
    let Some(raw) = raw else {
        debug!("No saved state, starting fresh");
        return PersistedState::default();
    };
    match serde_json::from_str(raw) {
        Ok(state) => state,
        Err(err) => {
            warn!("Saved state is malformed, starting fresh: {}", err);
            PersistedState::default()
        }
    }
}

/// Loads the state through `store`, defaulting when absent or malformed.
pub async fn load(store: &dyn StateStore) -> Result<PersistedState, StudioError> {
    let raw = store.load_raw().await?;
    Ok(parse_document(raw.as_deref()))
}

/// Serializes and writes the whole state.
pub async fn save(store: &dyn StateStore, state: &PersistedState) -> Result<(), StudioError> {
    let document = serde_json::to_string(state)?;
    store.save_raw(document).await
}

/// Stores the document in the `kv_store` table.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Wraps a migrated connection.
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl StateStore for SqliteStore {
    fn load_raw(&self) -> StoreFuture<'_, Option<String>> {
        Box::pin(async move { Ok(kv_store::get(&self.db, STORAGE_KEY).await?) })
    }

    fn save_raw(&self, document: String) -> StoreFuture<'_, ()> {
        Box::pin(async move { Ok(kv_store::put(&self.db, STORAGE_KEY, document).await?) })
    }
}

/// Keeps the document in memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Store pre-seeded with a raw document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }
}

impl StateStore for MemoryStore {
    fn load_raw(&self) -> StoreFuture<'_, Option<String>> {
        Box::pin(async move { Ok(self.document.lock().await.clone()) })
    }

    fn save_raw(&self, document: String) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            *self.document.lock().await = Some(document);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormState, PresetKey};
    use sea_orm_migration::MigratorTrait;

    async fn sqlite_store() -> SqliteStore {
        let db = crate::db::connect_test_db().await.expect("connect test db");
        crate::db::migrations::Migrator::up(&db, None)
            .await
            .expect("run migrations");
        SqliteStore::new(db)
    }

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let store = sqlite_store().await;
        let state = load(&store).await.expect("load");
        assert_eq!(state, PersistedState::default());
    }

    #[tokio::test]
    async fn malformed_document_loads_defaults() {
        let store = MemoryStore::with_document("{not json");
        assert_eq!(load(&store).await.expect("load"), PersistedState::default());

        let store = MemoryStore::with_document(r#"{"form": 1}"#);
        assert_eq!(load(&store).await.expect("load"), PersistedState::default());
    }

    #[tokio::test]
    async fn sqlite_store_overwrites_the_single_document() {
        let store = sqlite_store().await;
        let mut state = PersistedState::default();
        save(&store, &state).await.expect("first save");

        state.form = FormState {
            category: "bota".into(),
            preset: PresetKey::ThreeCovers,
            ..FormState::default()
        };
        save(&store, &state).await.expect("second save");

        assert_eq!(load(&store).await.expect("load"), state);
    }

    #[tokio::test]
    async fn sqlite_file_survives_reconnect() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.sqlite");
        let path = path.to_string_lossy().to_string();

        let mut state = PersistedState::default();
        state.form.model_name = "Runner X".into();
        {
            let db = crate::db::connect_db(&path).await.expect("connect");
            crate::db::migrations::Migrator::up(&db, None)
                .await
                .expect("migrate");
            save(&SqliteStore::new(db), &state).await.expect("save");
        }

        let db = crate::db::connect_db(&path).await.expect("reconnect");
        crate::db::migrations::Migrator::up(&db, None)
            .await
            .expect("migrate again");
        assert_eq!(load(&SqliteStore::new(db)).await.expect("load"), state);
    }
}
