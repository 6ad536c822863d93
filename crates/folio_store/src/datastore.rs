use std::path::Path;

use folio_core::{ChangeEvent, ExecContext, StoreResult, ViewSource};

use crate::{DatabaseConfig, FolioConfig, MysqlStore, PostgresStore, SqliteStore};

/// A store whose backend is chosen at runtime from configuration.
pub enum AnyStore {
    Sqlite(SqliteStore),
    Postgres(PostgresStore),
    Mysql(MysqlStore),
}

impl AnyStore {
    pub async fn connect(config: &FolioConfig, base_dir: &Path) -> StoreResult<Self> {
        let options = config.connect_options(base_dir)?;
        let mode = config.recording_mode();
        log::debug!("opening {} store", config.backend_name());
        Ok(match &config.database {
            DatabaseConfig::Sqlite { .. } => {
                AnyStore::Sqlite(SqliteStore::connect(options).await?.with_recording_mode(mode))
            }
            DatabaseConfig::Postgres { .. } => {
                AnyStore::Postgres(PostgresStore::connect(options).await?.with_recording_mode(mode))
            }
            DatabaseConfig::Mysql { .. } => {
                AnyStore::Mysql(MysqlStore::connect(options).await?.with_recording_mode(mode))
            }
        })
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AnyStore::Sqlite(_) => "sqlite",
            AnyStore::Postgres(_) => "postgres",
            AnyStore::Mysql(_) => "mysql",
        }
    }

    /// The read side, for view assembly independent of the backend.
    pub fn view_source(&self) -> &dyn ViewSource {
        match self {
            AnyStore::Sqlite(store) => store,
            AnyStore::Postgres(store) => store,
            AnyStore::Mysql(store) => store,
        }
    }

    pub async fn list_change_events(
        &self,
        ctx: &ExecContext,
        limit: u64,
    ) -> StoreResult<Vec<ChangeEvent>> {
        match self {
            AnyStore::Sqlite(store) => store.list_change_events(ctx, limit).await,
            AnyStore::Postgres(store) => store.list_change_events(ctx, limit).await,
            AnyStore::Mysql(store) => store.list_change_events(ctx, limit).await,
        }
    }

    pub fn query_count(&self) -> u64 {
        match self {
            AnyStore::Sqlite(store) => store.query_count(),
            AnyStore::Postgres(store) => store.query_count(),
            AnyStore::Mysql(store) => store.query_count(),
        }
    }
}

/// Loads (or creates) `folio.json` under `base` and opens the configured store.
pub async fn open_store(base: &Path) -> StoreResult<AnyStore> {
    let config = FolioConfig::load_or_init(base)?;
    AnyStore::connect(&config, base).await
}

#[cfg(test)]
mod tests {
    use super::open_store;
    use folio_core::ExecContext;
    use tempfile::tempdir;

    #[tokio::test]
    async fn opens_store_with_default_config() {
        let dir = tempdir().expect("tempdir");
        let store = open_store(dir.path()).await.expect("open store");
        assert_eq!(store.backend_name(), "sqlite");
        assert!(dir.path().join("folio.sqlite").exists());
        let events = store
            .list_change_events(&ExecContext::background(), 10)
            .await
            .expect("events");
        assert!(events.is_empty());
    }
}
