use std::path::Path;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use wattrent_core::db::local::{LocalStore, LocalStoreError};

/// Key-value local store in a single SQLite table.
pub struct SqliteLocalStore {
    pool: SqlitePool,
}

fn storage_error(e: impl std::fmt::Display) -> LocalStoreError {
    LocalStoreError::Storage(e.to_string())
}

impl SqliteLocalStore {
    /// Opens (creating if needed) the database file at `path` and migrates it.
    pub async fn open(path: &Path) -> Result<Self, LocalStoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| LocalStoreError::Storage(format!("Failed to open {}: {e}", path.display())))?;
        let store = Self { pool };
        store.run_migrations().await?;
        info!(path = %path.display(), "local store opened");
        Ok(store)
    }

    /// Private in-memory database; a single connection keeps it alive.
    pub async fn in_memory() -> Result<Self, LocalStoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_error)?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn run_migrations(&self) -> Result<(), LocalStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, LocalStoreError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(|row| row.try_get::<String, _>("value").map_err(storage_error))
            .transpose()
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), LocalStoreError> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        debug!(key, "local value stored");
        Ok(())
    }

    async fn remove(
        &self,
        keys: &[&str],
    ) -> Result<(), LocalStoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        for key in keys {
            sqlx::query("DELETE FROM kv WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
        }
        tx.commit().await.map_err(storage_error)?;
        debug!(?keys, "local values removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = SqliteLocalStore::in_memory().await.unwrap();

        store.set("user_language", "en").await.unwrap();
        store.set("user_language", "zh-TW").await.unwrap();

        assert_eq!(store.get("user_language").await.unwrap().as_deref(), Some("zh-TW"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = SqliteLocalStore::in_memory().await.unwrap();

        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_only_touches_named_keys() {
        let store = SqliteLocalStore::in_memory().await.unwrap();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store.remove(&["a", "c", "never-set"]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c").await.unwrap(), None);
    }
}
