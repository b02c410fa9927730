//! Service configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional YAML
//! file (`GSM_AUTH_CONFIG`, default `config.yaml`), then environment
//! variables using `__` as the section separator (e.g. `REDIS__HOST`).

use anyhow::{bail, Context, Result};
use bound_store::RedisOptions;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GSM_AUTH_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Longest accepted `store.ttl`.
pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Service configuration, read once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// gRPC listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis connection configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Fingerprint storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_address")]
    pub address: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,

    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Logical database index
    #[serde(default)]
    pub db: i64,

    #[serde(default)]
    pub password: Option<SecretString>,

    /// Deadline for connecting and for each command
    #[serde(default = "default_redis_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    /// Process-local store, for development
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// How long an issued fingerprint stays retrievable
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Expired-entry sweep interval (memory backend only)
    #[serde(default = "default_purge_interval", with = "humantime_serde")]
    pub purge_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEnv {
    /// Console plus `Info.log` / `Error.log` files
    Production,
    /// Console only
    Test,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_env")]
    pub env: LogEnv,

    /// Directory for the log files
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Emit JSON instead of text
    #[serde(default)]
    pub json: bool,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            password: None,
            timeout: default_redis_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            ttl: default_ttl(),
            purge_interval: default_purge_interval(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            env: default_log_env(),
            dir: default_log_dir(),
            json: false,
        }
    }
}

// Default value functions
fn default_address() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    50051
}

fn default_redis_host() -> String {
    "127.0.0.1".into()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_ttl() -> Duration {
    Duration::from_secs(3 * 60)
}

fn default_purge_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_env() -> LogEnv {
    LogEnv::Production
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl ServerConfig {
    /// `address:port` as configured, for logging and errors. Binding
    /// resolves `address`, which may be a hostname.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl RedisConfig {
    pub fn options(&self) -> RedisOptions {
        RedisOptions {
            host: self.host.clone(),
            port: self.port,
            db: self.db,
            password: self.password.clone(),
            timeout: self.timeout,
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and the environment.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&path)
    }

    /// Load configuration from a specific file plus the environment. A
    /// missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep strings as strings: a numeric-looking password
                    // must not be coerced.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.address.trim().is_empty() {
            bail!("server.address must not be empty");
        }
        if self.store.ttl.is_zero() {
            bail!("store.ttl must be greater than zero");
        }
        if self.store.ttl > MAX_TTL {
            bail!("store.ttl must be at most {:?}", MAX_TTL);
        }
        if self.redis.timeout.is_zero() {
            bail!("redis.timeout must be greater than zero");
        }
        if self.store.backend == StoreBackend::Memory && self.store.purge_interval.is_zero() {
            bail!("store.purge_interval must be greater than zero");
        }
        Ok(())
    }
}
