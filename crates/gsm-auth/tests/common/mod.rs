//! Common test utilities for integration tests.

use async_trait::async_trait;
use bound_store::{StoreError, StoreResult, TimeBoundStore};
use gsm_auth::proto::auth_client::AuthClient;
use gsm_auth::{server, Fingerprint, FingerprintIssuer, OutcomeLog, StartupResult};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

pub const TTL: Duration = Duration::from_secs(180);

/// Captures both outcome streams.
#[derive(Default)]
pub struct RecordingLog {
    pub info: Mutex<Vec<(String, String)>>,
    pub errors: Mutex<Vec<(String, StoreError)>>,
}

impl OutcomeLog for RecordingLog {
    fn stored(&self, phone_number: &str, fingerprint: &Fingerprint) {
        self.info
            .lock()
            .push((phone_number.to_string(), fingerprint.to_string()));
    }

    fn store_failed(&self, phone_number: &str, error: &StoreError) {
        self.errors
            .lock()
            .push((phone_number.to_string(), error.clone()));
    }
}

/// A store whose writes never complete.
pub struct StalledStore;

#[async_trait]
impl TimeBoundStore for StalledStore {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StoreResult<()> {
        std::future::pending().await
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// A running server on a loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub log: Arc<RecordingLog>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<StartupResult<()>>,
}

impl TestServer {
    pub async fn start(store: Arc<dyn TimeBoundStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let log = Arc::new(RecordingLog::default());
        let issuer = FingerprintIssuer::new(store, log.clone(), TTL);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server::serve(listener, issuer, async {
            rx.await.ok();
        }));

        Self {
            addr,
            log,
            shutdown: Some(tx),
            handle,
        }
    }

    pub async fn client(&self) -> AuthClient<Channel> {
        AuthClient::connect(format!("http://{}", self.addr))
            .await
            .unwrap()
    }

    /// Signal shutdown and wait for the server to drain.
    pub async fn stop(mut self) -> StartupResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap()
    }
}
