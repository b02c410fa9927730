//! Fingerprint issuance: hash the number, bind it in the store, report.

use crate::fingerprint::Fingerprint;
use crate::logging::OutcomeLog;
use bound_store::{StoreResult, TimeBoundStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Issues fingerprints and binds them to their phone number for `ttl`.
///
/// Holds no per-request state; one instance serves every concurrent call.
/// Dropping the future returned by [`hash_and_store`](Self::hash_and_store)
/// abandons the pending write and reports nothing.
#[derive(Clone)]
pub struct FingerprintIssuer {
    store: Arc<dyn TimeBoundStore>,
    log: Arc<dyn OutcomeLog>,
    ttl: Duration,
}

impl FingerprintIssuer {
    pub fn new(store: Arc<dyn TimeBoundStore>, log: Arc<dyn OutcomeLog>, ttl: Duration) -> Self {
        Self { store, log, ttl }
    }

    /// Fingerprint `phone_number` and store `phone_number -> fingerprint`.
    ///
    /// Any phone number is accepted, including the empty string. Store
    /// failures are logged and returned unchanged; nothing is retried.
    #[instrument(level = "debug", skip_all)]
    pub async fn hash_and_store(&self, phone_number: &str) -> StoreResult<Fingerprint> {
        let fingerprint = Fingerprint::of(phone_number);
        debug!("Computed fingerprint, persisting");

        match self
            .store
            .set(phone_number, fingerprint.as_str(), self.ttl)
            .await
        {
            Ok(()) => {
                self.log.stored(phone_number, &fingerprint);
                Ok(fingerprint)
            }
            Err(e) => {
                self.log.store_failed(phone_number, &e);
                Err(e)
            }
        }
    }
}
