//! Port for the identity provider's OAuth mechanics.
//!
//! The domain never builds provider URLs or talks the token exchange
//! protocol itself. It asks an [`Authenticator`] for a login URL, hands the
//! provider callback back for validation, and obtains page-scoped tokens and
//! API handles from it.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::domain::{AccessGrant, AccessToken, PageId};

use super::PublishingClient;
use super::define_port_error;

define_port_error! {
    /// Errors raised by authenticator adapters.
    pub enum AuthenticatorError {
        /// The callback did not carry a `state` parameter, or the session
        /// held none.
        MissingState => "authorisation state is missing",
        /// The callback `state` differs from the one issued at login.
        InvalidState => "authorisation state does not match",
        /// The callback did not carry an authorisation code.
        MissingCode => "authorisation code is missing",
        /// The principal may not act on the page, or the page does not exist.
        PageAccessDenied { page_id: PageId } => "access to page {page_id} was denied",
        /// Any other provider failure.
        Provider { message: String } => "identity provider request failed: {message}",
    }
}

/// Provider callback parameters together with the state stored at login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeExchangeRequest {
    /// State issued by [`Authenticator::auth_url`] and kept in the session.
    pub expected_state: Option<String>,
    /// `state` query parameter returned by the provider.
    pub state: Option<String>,
    /// `code` query parameter returned by the provider.
    pub code: Option<String>,
}

/// OAuth capability of the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Login dialog URL carrying `state` as CSRF protection.
    fn auth_url(&self, state: &str) -> Url;

    /// Validate the callback against the stored state and exchange its code
    /// for a long-lived user token.
    ///
    /// State is checked before the code, so a forged callback without a code
    /// still reports [`AuthenticatorError::InvalidState`].
    async fn exchange_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<AccessGrant, AuthenticatorError>;

    /// Publishing API handle acting with `token`.
    fn api_connection(&self, token: &AccessToken) -> Arc<dyn PublishingClient>;

    /// Resolve the page-scoped token for `page_id`, using `user_token` as
    /// proof of administration.
    async fn page_access_token(
        &self,
        user_token: &AccessToken,
        page_id: &PageId,
    ) -> Result<AccessToken, AuthenticatorError>;
}

/// Check a provider callback against the stored state.
///
/// Shared by adapters so every implementation applies the same ordering:
/// missing state, mismatched state, then missing code.
pub fn validate_callback(request: &CodeExchangeRequest) -> Result<&str, AuthenticatorError> {
    let expected = request
        .expected_state
        .as_deref()
        .ok_or_else(AuthenticatorError::missing_state)?;
    let received = request
        .state
        .as_deref()
        .ok_or_else(AuthenticatorError::missing_state)?;
    if expected != received {
        return Err(AuthenticatorError::invalid_state());
    }
    request
        .code
        .as_deref()
        .filter(|code| !code.is_empty())
        .ok_or_else(AuthenticatorError::missing_code)
}
