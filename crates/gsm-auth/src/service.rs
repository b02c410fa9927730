//! gRPC adapter for the `auth.Auth` service.

use crate::error::store_status;
use crate::handler::FingerprintIssuer;
use crate::proto::auth_server::{Auth, AuthServer};
use crate::proto::{HashedCode, PhoneNumber};
use tonic::{Request, Response, Status};

/// `auth.Auth` implementation delegating to a [`FingerprintIssuer`].
#[derive(Clone)]
pub struct AuthService {
    issuer: FingerprintIssuer,
}

impl AuthService {
    pub fn new(issuer: FingerprintIssuer) -> Self {
        Self { issuer }
    }

    pub fn into_server(self) -> AuthServer<Self> {
        AuthServer::new(self)
    }
}

#[tonic::async_trait]
impl Auth for AuthService {
    async fn hash_and_store(
        &self,
        request: Request<PhoneNumber>,
    ) -> Result<Response<HashedCode>, Status> {
        let PhoneNumber { number } = request.into_inner();

        let fingerprint = self
            .issuer
            .hash_and_store(&number)
            .await
            .map_err(store_status)?;

        Ok(Response::new(HashedCode {
            code: fingerprint.into_string(),
        }))
    }
}
