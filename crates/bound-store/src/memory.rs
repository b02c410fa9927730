//! In-memory store with TTL expiration.

use crate::{StoreError, StoreResult, TimeBoundStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

/// Entry in the store with expiration tracking.
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory time-bound store.
///
/// Expiry is measured with [`tokio::time::Instant`], so a paused test
/// runtime can advance past a TTL without sleeping.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the live value for a key.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let now = Instant::now();

        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        let now = Instant::now();
        entries.values().filter(|entry| entry.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|_, entry| entry.expires_at > now);

        let removed = before - entries.len();
        if removed > 0 {
            debug!("Purged {} expired entries", removed);
        }
        removed
    }

    /// Periodically purge expired entries until the store is closed.
    pub async fn purge_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately.
        ticker.tick().await;

        while !self.closed.load(Ordering::Acquire) {
            ticker.tick().await;
            self.purge_expired().await;
        }
    }
}

#[async_trait]
impl TimeBoundStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store is closed".into()));
        }

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let mut entries = self.entries.write().await;
            entries.clear();
            info!("In-memory store closed");
        }
        Ok(())
    }
}
