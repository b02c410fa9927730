//! Logging setup and the per-request outcome log.
//!
//! In production two append-only files are written next to the console
//! output: `Info.log` receives INFO and WARN events, `Error.log` receives
//! ERROR events.

use crate::config::{LogConfig, LogEnv};
use crate::error::{StartupError, StartupResult};
use crate::fingerprint::Fingerprint;
use bound_store::StoreError;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const INFO_LOG_FILE: &str = "Info.log";
pub const ERROR_LOG_FILE: &str = "Error.log";

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where the request handler reports each outcome.
///
/// Successes go to the informational stream, failures to the error stream.
pub trait OutcomeLog: Send + Sync {
    fn stored(&self, phone_number: &str, fingerprint: &Fingerprint);

    fn store_failed(&self, phone_number: &str, error: &StoreError);
}

/// [`OutcomeLog`] backed by `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutcomeLog;

impl OutcomeLog for TracingOutcomeLog {
    fn stored(&self, phone_number: &str, fingerprint: &Fingerprint) {
        info!(
            phone_number = %phone_number,
            fingerprint = %fingerprint,
            "Stored fingerprint"
        );
    }

    fn store_failed(&self, phone_number: &str, error: &StoreError) {
        error!(
            phone_number = %phone_number,
            error = %error,
            "Failed to store fingerprint"
        );
    }
}

/// Append-only log file, flushed after every write.
#[derive(Clone)]
pub struct LogFileWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Build the `Info.log` / `Error.log` layers under `dir`.
pub fn file_layers(dir: &Path, json: bool) -> io::Result<Vec<BoxedLayer>> {
    let info_writer = LogFileWriter::open(&dir.join(INFO_LOG_FILE))?;
    let error_writer = LogFileWriter::open(&dir.join(ERROR_LOG_FILE))?;

    let info_only = filter_fn(|meta| {
        let level = *meta.level();
        level == Level::INFO || level == Level::WARN
    });

    Ok(vec![
        fmt_layer(info_writer, json).with_filter(info_only).boxed(),
        fmt_layer(error_writer, json)
            .with_filter(LevelFilter::ERROR)
            .boxed(),
    ])
}

fn fmt_layer(writer: LogFileWriter, json: bool) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) -> StartupResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console = if config.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![console.with_filter(filter).boxed()];

    if config.env == LogEnv::Production {
        layers.extend(file_layers(&config.dir, config.json)?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| StartupError::Logging(io::Error::other(e)))?;

    if config.env == LogEnv::Production {
        info!(dir = %config.dir.display(), "File logging enabled");
    }

    Ok(())
}
