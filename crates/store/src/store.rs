//! Store handle and schema lifecycle.

use std::path::Path;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use coursestock_core::{StoreError, StoreResult};

/// Handle to the SQLite-backed inventory store.
///
/// Constructed explicitly via [`open`](Self::open) /
/// [`open_in_memory`](Self::open_in_memory) and released with
/// [`close`](Self::close). The pool is capped at a single connection, so the
/// quantity read-modify-write inside movement posting and deletion serializes
/// even if a caller shares the handle across tasks.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    pool: SqlitePool,
}

impl InventoryStore {
    /// Open the store at `path`, creating the database file and schema if
    /// they do not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.as_ref().to_string_lossy());
        Self::connect(&url).await
    }

    /// Open a private in-memory store (tests, scratch sessions).
    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(StoreError::storage)?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Idempotently create both tables. Safe to call repeatedly.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                course_code TEXT NOT NULL UNIQUE,
                title       TEXT,
                language    TEXT,
                quantity    INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_movement (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                stock_id     INTEGER NOT NULL REFERENCES stock (id),
                action       TEXT NOT NULL CHECK (action IN ('in', 'out')),
                quantity     INTEGER NOT NULL CHECK (quantity > 0),
                recorded_at  TEXT NOT NULL,
                enrolment_no TEXT,
                name         TEXT,
                remarks      TEXT,
                phone        TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::storage)?;

        Ok(())
    }

    /// Close the store, releasing the database file.
    pub async fn close(self) {
        self.pool.close().await;
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
