//! Redis-backed store.
//!
//! Writes use `SET key value PX <ms>`, so expiry is owned by Redis and
//! evaluated per key. The connection is re-established after it drops; the
//! write that observed the drop still fails.

use crate::{StoreError, StoreResult, TimeBoundStore};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, RedisError};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisOptions {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<SecretString>,
    /// Deadline applied to connecting and to every command.
    pub timeout: Duration,
}

impl RedisOptions {
    /// Connection URL, with the password percent-encoded.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password.expose_secret()),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    /// `host:port`, safe to log.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Number of reconnect attempts the connection manager makes per drop.
const RECONNECT_RETRIES: usize = 3;

/// Redis time-bound store over a reconnecting multiplexed connection.
pub struct RedisStore {
    conn: RwLock<Option<ConnectionManager>>,
    timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis and verify the server answers `PING`.
    pub async fn connect(options: &RedisOptions) -> StoreResult<Self> {
        let timeout = options.timeout;
        let client = Client::open(options.url())?;

        let manager_config =
            ConnectionManagerConfig::new().set_number_of_retries(RECONNECT_RETRIES);
        let mut conn = with_deadline(
            timeout,
            ConnectionManager::new_with_config(client, manager_config),
        )
        .await?;

        let _: String =
            with_deadline(timeout, redis::cmd("PING").query_async(&mut conn)).await?;

        info!(
            address = %options.address(),
            db = options.db,
            "Connected to Redis"
        );

        Ok(Self {
            conn: RwLock::new(Some(conn)),
            timeout,
        })
    }
}

#[async_trait]
impl TimeBoundStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        // Clone the handle out so the lock is not held across the round trip.
        let mut conn = self
            .conn
            .read()
            .await
            .clone()
            .ok_or_else(|| StoreError::Unavailable("connection is closed".into()))?;

        let ttl_ms = px_millis(ttl);

        let _: () = with_deadline(
            self.timeout,
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async(&mut conn),
        )
        .await?;

        debug!(ttl_ms, "SET with expiry");
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        if self.conn.write().await.take().is_some() {
            info!("Redis connection closed");
        }
        Ok(())
    }
}

/// `PX` argument for `ttl`. Redis rejects `PX 0`, so sub-millisecond TTLs
/// round up to one millisecond.
fn px_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis().max(1)).unwrap_or(u64::MAX)
}

/// Run a Redis future under the store deadline, classifying failures.
async fn with_deadline<T, F>(timeout: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, RedisError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.is_timeout() => Err(StoreError::Timeout(timeout)),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}
