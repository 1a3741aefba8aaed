//! Port abstraction for registration tokens.
//!
//! Adapters own the expiry rule: tokens older than
//! [`REGISTRATION_TOKEN_TTL_DAYS`](crate::domain::REGISTRATION_TOKEN_TTL_DAYS)
//! are never returned.
use async_trait::async_trait;

use crate::domain::RegistrationAccessToken;

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration token repository adapters.
    pub enum RegistrationTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "registration token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "registration token repository query failed: {message}",
    }
}

/// Storage for registration tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationTokenRepository: Send + Sync {
    /// Store a freshly issued token.
    async fn insert(
        &self,
        token: &RegistrationAccessToken,
    ) -> Result<(), RegistrationTokenRepositoryError>;

    /// Fetch an unexpired token by its value.
    async fn find_valid(
        &self,
        token: &str,
    ) -> Result<Option<RegistrationAccessToken>, RegistrationTokenRepositoryError>;

    /// Delete expired tokens and return how many were removed.
    async fn purge_expired(&self) -> Result<u64, RegistrationTokenRepositoryError>;
}
