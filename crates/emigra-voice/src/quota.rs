//! Freemium usage accounting for anonymous callers.

use emigra_store::{StoreError, UsageStore};

/// Fixed storage key for the anonymous free-session counter.
pub const USAGE_COUNTER_KEY: &str = "voice_free_uses";

/// Tracks how many free sessions an anonymous client has consumed.
///
/// Reads fail open: a missing, unreadable, or unparsable counter is treated
/// as zero.
#[derive(Debug)]
pub struct UsageQuota<S> {
    store: S,
    limit: u32,
}

impl<S: UsageStore> UsageQuota<S> {
    pub fn new(store: S, limit: u32) -> Self {
        Self { store, limit }
    }

    /// Returns the persisted counter, treating unreadable state as zero.
    pub fn read(&self) -> u32 {
        match self.store.get(USAGE_COUNTER_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(error = %e, "usage counter unreadable, treating as zero");
                0
            }
        }
    }

    /// Persists `read() + 1` and returns the new value.
    pub fn increment(&mut self) -> Result<u32, StoreError> {
        let next = self.read() + 1;
        self.store.set(USAGE_COUNTER_KEY, &next.to_string())?;
        tracing::debug!(used = next, limit = self.limit, "usage counter incremented");
        Ok(next)
    }

    /// Free sessions still available under the configured cap.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.read())
    }

    /// True once the counter has reached the cap.
    pub fn exhausted(&self) -> bool {
        self.read() >= self.limit
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
