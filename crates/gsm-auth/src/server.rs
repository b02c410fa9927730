//! Composition root: store lifecycle, listener, graceful shutdown.

use crate::config::{Config, ServerConfig, StoreBackend};
use crate::error::{StartupError, StartupResult};
use crate::handler::FingerprintIssuer;
use crate::logging::TracingOutcomeLog;
use crate::service::AuthService;
use bound_store::{MemoryStore, RedisStore, TimeBoundStore};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info, warn};

/// Run the service until SIGINT/SIGTERM.
///
/// The store is closed after the server has drained, whether serving
/// succeeded or not.
pub async fn run(config: Config) -> StartupResult<()> {
    let store = open_store(&config).await?;

    let result = bind_and_serve(&config, store.clone(), shutdown_signal()).await;

    if let Err(e) = store.close().await {
        warn!("Failed to close store: {}", e);
    }

    result
}

/// Open the configured store. An unreachable Redis is a startup failure.
pub async fn open_store(config: &Config) -> StartupResult<Arc<dyn TimeBoundStore>> {
    match config.store.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis.options()).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store");
            let store = MemoryStore::new();

            let sweeper = store.clone();
            let interval = config.store.purge_interval;
            tokio::spawn(async move {
                sweeper.purge_loop(interval).await;
            });

            Ok(Arc::new(store))
        }
    }
}

async fn bind_and_serve<F>(
    config: &Config,
    store: Arc<dyn TimeBoundStore>,
    shutdown: F,
) -> StartupResult<()>
where
    F: Future<Output = ()>,
{
    let listener = bind(&config.server).await?;
    let issuer = FingerprintIssuer::new(store, Arc::new(TracingOutcomeLog), config.store.ttl);

    serve(listener, issuer, shutdown).await
}

/// Bind the configured listen address, resolving it if it is a hostname.
pub async fn bind(server: &ServerConfig) -> StartupResult<TcpListener> {
    TcpListener::bind((server.address.as_str(), server.port))
        .await
        .map_err(|source| StartupError::Bind {
            addr: server.endpoint(),
            source,
        })
}

/// Serve `auth.Auth` on an already-bound listener until `shutdown`
/// resolves, then let in-flight calls finish.
pub async fn serve<F>(listener: TcpListener, issuer: FingerprintIssuer, shutdown: F) -> StartupResult<()>
where
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    Server::builder()
        .add_service(AuthService::new(issuer).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutting down the server gracefully...");
}
