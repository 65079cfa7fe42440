use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

use super::CacheStore;
use crate::paths;

/// [`CacheStore`] backed by a `SQLite` database in the user cache directory.
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens the store at `$XDG_CACHE_HOME/xcs/cache.db` (or `~/.cache/xcs/cache.db`).
    pub fn new() -> Result<Self> {
        let cache_dir = paths::cache_dir();

        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;

        Self::open(cache_dir.join("cache.db"))
    }

    /// Opens (creating if needed) the store at an explicit path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            db_path: db_path.into(),
        };

        store.init_db()?;

        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create kv table")?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open cache database: {}", self.db_path.display()))
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;

        stmt.query_row([key], |row| row.get(0))
            .optional()
            .context("Failed to read from cache database")
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)",
            params![key, value],
        )
        .context("Failed to write to cache database")?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;

        conn.execute("DELETE FROM kv WHERE key = ?1", [key])
            .context("Failed to delete from cache database")?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(temp_dir: &TempDir) -> SqliteStore {
        SqliteStore::open(temp_dir.path().join("cache.db")).unwrap()
    }

    #[test]
    fn test_store_miss() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_store_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.put("translations", "こんにちは".as_bytes()).unwrap();

        assert_eq!(
            store.get("translations").unwrap(),
            Some("こんにちは".as_bytes().to_vec())
        );
    }

    #[test]
    fn test_store_put_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.put("translations", b"first").unwrap();
        store.put("translations", b"second").unwrap();

        assert_eq!(store.get("translations").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_store_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.put("translations", b"value").unwrap();
        store.remove("translations").unwrap();
        store.remove("translations").unwrap();

        assert!(store.get("translations").unwrap().is_none());
    }

    #[test]
    fn test_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        create_test_store(&temp_dir).put("k", b"persisted").unwrap();

        let reopened = create_test_store(&temp_dir);
        assert_eq!(reopened.get("k").unwrap(), Some(b"persisted".to_vec()));
    }
}
