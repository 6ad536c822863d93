use std::collections::HashSet;

use folio_store::{SqliteStore, StoreError, StoreResult};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use tempfile::tempdir;

async fn list_tables(store: &SqliteStore) -> StoreResult<HashSet<String>> {
    let rows = store
        .connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table'",
        ))
        .await
        .map_err(StoreError::from)?;
    let mut tables = HashSet::new();
    for row in rows {
        let name: String = row.try_get("", "name").map_err(StoreError::from)?;
        tables.insert(name);
    }
    Ok(tables)
}

#[tokio::test]
async fn sqlite_migrations_create_every_table() -> StoreResult<()> {
    let dir = tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("folio.sqlite").display());
    let store = SqliteStore::connect(url.clone()).await?;
    let tables = list_tables(&store).await?;
    for table in [
        "folio_users",
        "folio_user_ssh_keys",
        "folio_sessions",
        "folio_tokens",
        "folio_user_oauth",
        "folio_routes",
        "folio_datatypes",
        "folio_fields",
        "folio_content_data",
        "folio_content_fields",
        "folio_change_events",
        "seaql_migrations",
    ] {
        assert!(tables.contains(table), "missing table {table}");
    }

    // Reconnecting applies nothing new.
    drop(store);
    let store = SqliteStore::connect(url).await?;
    assert_eq!(list_tables(&store).await?, tables);
    Ok(())
}

#[tokio::test]
async fn store_rejects_connection_for_another_dialect() {
    let dir = tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("folio.sqlite").display());
    let err = folio_store::PostgresStore::connect(url)
        .await
        .err()
        .expect("dialect mismatch");
    assert!(matches!(err, StoreError::Storage { .. }));
}
