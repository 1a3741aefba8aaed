//! Driving port for the provider login flow.
//!
//! Inbound adapters call this port to start and finish the OAuth redirect
//! dance and to resolve the principal behind a session cookie, without
//! knowing which provider or store backs it.

use async_trait::async_trait;
use url::Url;

use crate::domain::{Error, SessionId, User};

use super::CodeExchangeRequest;

/// Where to send the browser to log in, and the CSRF state to remember.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    /// Random state that must come back on the callback.
    pub state: String,
    /// Provider login dialog URL.
    pub url: Url,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Issue a fresh CSRF state and the login URL carrying it.
    fn begin_login(&self) -> LoginRedirect;

    /// Validate the provider callback, start a session for the matching
    /// user and propagate their page tokens.
    async fn complete_login(&self, request: &CodeExchangeRequest) -> Result<SessionId, Error>;

    /// Principal owning `session_id`; unauthorised when the session is
    /// unknown.
    async fn current_user(&self, session_id: &SessionId) -> Result<User, Error>;

    /// End the principal's session.
    async fn logout(&self, session_id: &SessionId) -> Result<(), Error>;
}
