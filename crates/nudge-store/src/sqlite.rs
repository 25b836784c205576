//! SQLite-based store implementation

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Namespaced key/value pairs; expires_at is unix seconds (UTC)
            CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER,
                PRIMARY KEY (namespace, key)
            );

            CREATE INDEX IF NOT EXISTS idx_kv_expires ON kv(expires_at);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    /// Delete every expired row, returning how many were removed
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?",
            [Utc::now().timestamp()],
        )?;

        if removed > 0 {
            debug!(removed, "Expired keys purged");
        }
        Ok(removed)
    }
}

fn expiry_timestamp(ttl: Duration) -> i64 {
    let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Utc::now().timestamp().saturating_add(secs)
}

impl Store for SqliteStore {
    fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn()?;

        let value: Option<String> = conn
            .query_row(
                r#"
                SELECT value FROM kv
                WHERE namespace = ? AND key = ?
                  AND (expires_at IS NULL OR expires_at > ?)
                "#,
                params![namespace, key, Utc::now().timestamp()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<()> {
        let conn = self.conn()?;
        let expires_at = ttl.map(expiry_timestamp);

        conn.execute(
            r#"
            INSERT INTO kv (namespace, key, value, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(namespace, key)
            DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
            params![namespace, key, value, expires_at],
        )?;

        debug!(namespace, key, ttl_secs = ttl.map(|t| t.as_secs()), "Key set");
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM kv WHERE namespace = ? AND key = ?",
            params![namespace, key],
        )?;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreExt;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_set_get_overwrite_delete() {
        let store = SqliteStore::in_memory().unwrap();

        assert!(store.get("reminder", "a").unwrap().is_none());

        store.set("reminder", "a", "first", None).unwrap();
        assert_eq!(store.get("reminder", "a").unwrap().as_deref(), Some("first"));

        store.set("reminder", "a", "second", None).unwrap();
        assert_eq!(store.get("reminder", "a").unwrap().as_deref(), Some("second"));

        store.delete("reminder", "a").unwrap();
        assert!(store.get("reminder", "a").unwrap().is_none());

        // Deleting again is fine
        store.delete("reminder", "a").unwrap();
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let store = SqliteStore::in_memory().unwrap();

        store.set("reminder", "42", "record", None).unwrap();
        store.set("user_reminders", "42", "[]", None).unwrap();

        assert_eq!(store.get("reminder", "42").unwrap().as_deref(), Some("record"));
        assert_eq!(store.get("user_reminders", "42").unwrap().as_deref(), Some("[]"));
        assert!(store.get("global", "42").unwrap().is_none());
    }

    #[test]
    fn test_ttl_expiry_and_purge() {
        let store = SqliteStore::in_memory().unwrap();

        store.set("cache", "stale", "x", Some(Duration::ZERO)).unwrap();
        store.set("cache", "fresh", "y", Some(Duration::from_secs(3600))).unwrap();
        store.set("cache", "forever", "z", None).unwrap();

        assert!(store.get("cache", "stale").unwrap().is_none());
        assert_eq!(store.get("cache", "fresh").unwrap().as_deref(), Some("y"));

        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.get("cache", "forever").unwrap().as_deref(), Some("z"));
    }

    #[test]
    fn test_overwrite_clears_ttl() {
        let store = SqliteStore::in_memory().unwrap();

        store.set("cache", "k", "v1", Some(Duration::ZERO)).unwrap();
        store.set("cache", "k", "v2", None).unwrap();
        assert_eq!(store.get("cache", "k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_json_helpers() {
        let store = SqliteStore::in_memory().unwrap();

        store
            .set_json("user_reminders", "7", &vec!["a".to_string(), "b".to_string()], None)
            .unwrap();
        let ids: Vec<String> = store.get_json("user_reminders", "7").unwrap().unwrap();
        assert_eq!(ids, vec!["a", "b"]);

        store.set("user_reminders", "8", "not json", None).unwrap();
        let broken: StoreResult<Option<Vec<String>>> = store.get_json("user_reminders", "8");
        assert!(matches!(broken, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nudge.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("global", "reminder_owners", "[42]", None).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("global", "reminder_owners").unwrap().as_deref(),
            Some("[42]")
        );
    }
}
