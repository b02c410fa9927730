//! Time-bound key-value storage.
//!
//! Every value is written with its own time-to-live, fixed at write time.
//! Reads never extend a record's lifetime and nothing here refreshes an
//! existing key; a second write for the same key simply replaces it.

mod error;
mod memory;
mod redis_store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_store::{RedisOptions, RedisStore};

use async_trait::async_trait;
use std::time::Duration;

/// Write side of a store with per-key expiration.
#[async_trait]
pub trait TimeBoundStore: Send + Sync {
    /// Store `value` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Release the underlying connection. Writes after close fail with
    /// [`StoreError::Unavailable`].
    async fn close(&self) -> StoreResult<()>;
}
