use std::str::FromStr;

use sqlx::{
    Executor, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{error::StoreError, store::Collection};

pub type DB = SqlitePool;

const MEMORY_URL: &str = "sqlite::memory:";

/// Opens (creating if needed) the database file at `path` and makes sure the
/// schema exists.
pub async fn open(path: &str) -> Result<DB, StoreError> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// A private in-memory database. Every connection to `:memory:` is its own
/// database, so the pool is pinned to one connection that never expires.
pub async fn open_in_memory() -> Result<DB, StoreError> {
    let opts = SqliteConnectOptions::from_str(MEMORY_URL)?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

async fn init_schema(pool: &DB) -> Result<(), StoreError> {
    for collection in Collection::ALL {
        let table = collection.table();
        pool.execute(
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id       TEXT PRIMARY KEY,
                    sort_key TEXT NOT NULL,
                    body     TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS {table}_sort_key ON {table}(sort_key);"
            )
            .as_str(),
        )
        .await?;
    }

    // One diary entry per calendar date.
    pool.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS diary_entries_date ON diary_entries(sort_key);",
    )
    .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS active_session (
            slot INTEGER PRIMARY KEY CHECK (slot = 0),
            body TEXT NOT NULL
        );",
    )
    .await?;

    Ok(())
}
