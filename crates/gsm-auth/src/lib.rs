//! gsm-auth - phone number fingerprint issuance over gRPC.
//!
//! For each `HashAndStore` call the service:
//! - Computes the SHA-256 fingerprint of the phone number
//! - Stores `phone number -> fingerprint` with a short expiry (3 minutes by default)
//! - Returns the fingerprint, or the store's error

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod handler;
pub mod logging;
pub mod proto;
pub mod server;
pub mod service;

pub use config::Config;
pub use error::{StartupError, StartupResult};
pub use fingerprint::Fingerprint;
pub use handler::FingerprintIssuer;
pub use logging::{OutcomeLog, TracingOutcomeLog};
pub use service::AuthService;
