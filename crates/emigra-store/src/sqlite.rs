//! SQLite-backed implementation of the [`UsageStore`] port.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::migrations::run_migrations;
use crate::{StoreError, UsageStore};

/// Durable key/value store over a single SQLite connection.
///
/// Opening runs any pending migrations, so a fresh database file is usable
/// immediately.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory store, useful for testing.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

impl UsageStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM client_kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO client_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_returns_none() {
        let store = SqliteStore::open_in_memory().expect("should open store");
        assert_eq!(store.get("absent").expect("get should succeed"), None);
    }

    #[test]
    fn set_then_get() {
        let mut store = SqliteStore::open_in_memory().expect("should open store");
        store.set("counter", "1").expect("set should succeed");
        assert_eq!(
            store.get("counter").expect("get should succeed").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn set_overwrites() {
        let mut store = SqliteStore::open_in_memory().expect("should open store");
        store.set("counter", "1").expect("first set should succeed");
        store.set("counter", "2").expect("second set should succeed");
        assert_eq!(
            store.get("counter").expect("get should succeed").as_deref(),
            Some("2")
        );

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM client_kv", [], |row| row.get(0))
            .expect("should count rows");
        assert_eq!(rows, 1, "upsert should not duplicate the key");
    }
}
