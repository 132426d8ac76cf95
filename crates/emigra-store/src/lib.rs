//! Client-side persistence for the Emigra voice subsystem.
//!
//! Provides the [`UsageStore`] port, a narrow key/value surface scoped to
//! one anonymous client identity, together with an in-memory implementation
//! for tests and a SQLite-backed implementation for real deployments. The
//! only production consumer today is the voice quota tracker, which keeps its
//! free-session counter under a single fixed key.
//!
//! # Design decisions
//!
//! - **Injected port, not a global**: callers receive a store value rather
//!   than reaching for ambient storage, so tests substitute [`MemoryStore`].
//! - **SQLite via embedded migrations**: the `client_kv` table is created
//!   through versioned migrations compiled into the binary with
//!   `include_str!`, so the schema cannot drift from the code using it.
//! - **Single connection**: exactly one orchestrator instance touches the
//!   store from one task, so [`SqliteStore`] owns a plain `Connection`
//!   rather than a pool.

use std::collections::HashMap;

use thiserror::Error;

mod migrations;
mod sqlite;

pub use migrations::{run_migrations, MigrationError};
pub use sqlite::SqliteStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database operation failed.
    #[error("store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Schema migration failed while opening the store.
    #[error("store migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Key/value string storage scoped to one anonymous client identity.
pub trait UsageStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: UsageStore + ?Sized> UsageStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: UsageStore + ?Sized> UsageStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a key before handing the store to the code under test.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.values.insert(key.into(), value.into());
        store
    }
}

impl UsageStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
