use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::types::DatabaseError;

pub const TABLE_CATEGORIES: &str = "categories";
pub const TABLE_FEEDS: &str = "feeds";
pub const TABLE_ENTRIES: &str = "entries";

/// Sequence for uniquely named in-memory databases, so concurrent tests
/// never share tables.
static MEMORY_DB_SEQ: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Database
// ============================================================================

/// Handle to the underlying store: a SQLite pool plus the generic row
/// primitives in `store.rs`. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database file and run migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Migration` if the schema could not be
    /// created, `DatabaseError::Other` for connection failures.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);
        Self::open_url(&url).await
    }

    /// Open a fresh, private in-memory database.
    ///
    /// The database is named and shared-cache so that every connection
    /// in the pool sees the same tables. Plain `:memory:` would give
    /// each pooled connection its own empty database, which breaks as
    /// soon as a cursor holds one connection while a cascaded child
    /// query runs on another.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let seq = MEMORY_DB_SEQ.fetch_add(1, Ordering::Relaxed);
        let url = format!("sqlite:file:feedstore_mem_{}?mode=memory&cache=shared", seq);
        Self::open_url(&url).await
    }

    async fn open_url(url: &str) -> Result<Self, DatabaseError> {
        // busy_timeout=5000: wait up to 5s for locks to release before
        // surfacing SQLITE_BUSY, which absorbs transient contention
        // between a cursor's reader connection and writers.
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DatabaseError::Other)?
            .pragma("busy_timeout", "5000");

        // A cascaded load holds one connection per open cursor level
        // (category, feed, entry), so the pool must allow at least
        // three; five matches peak depth plus concurrent writers.
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate()
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        Ok(db)
    }

    /// Create the schema idempotently inside a single transaction.
    ///
    /// Column declaration order is part of the contract: mappers read
    /// rows positionally, in exactly the order declared here.
    ///
    /// No foreign-key cascades are declared. Cascading store/delete is
    /// the mappers' responsibility, and delete order (parent rows
    /// before children) is observable behavior.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                color INTEGER,
                visible INTEGER NOT NULL DEFAULT 1,
                last_update INTEGER
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                id INTEGER PRIMARY KEY,
                category_id INTEGER,
                title TEXT NOT NULL,
                description TEXT,
                xml_url TEXT NOT NULL,
                visible INTEGER NOT NULL DEFAULT 1,
                html_url TEXT,
                type TEXT
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY,
                category_id INTEGER,
                feed_id INTEGER,
                title TEXT NOT NULL,
                description TEXT,
                url TEXT,
                date INTEGER,
                src_name TEXT,
                visible INTEGER NOT NULL DEFAULT 1
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // Scope indexes for the mappers' predicate shapes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_feeds_category ON feeds(category_id)")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_entries_scope ON entries(category_id, feed_id)",
        )
        .execute(&mut *tx)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_feed ON entries(feed_id)")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
