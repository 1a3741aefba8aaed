//! Provider login flow.
//!
//! A login starts with a redirect to the provider carrying a random CSRF
//! state. The callback is validated against that state, the code is
//! exchanged for a long-lived user token, and the provider identity is
//! matched against registered users. Unknown identities are rejected; there
//! is no self-registration. A successful login resolves page tokens for every
//! restaurant page the user administers and stores them with a fresh session
//! in one write; a failed login leaves the previous session in place.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    Authenticator, AuthenticatorError, CodeExchangeRequest, LoginRedirect, LoginService,
    PageTokenPropagation, UserRepository,
};
use crate::domain::secure_random::random_hex;
use crate::domain::service_support::map_user_error;
use crate::domain::{Error, PageTokens, SessionId, User, UserSession};

const OAUTH_STATE_BYTES: usize = 16;

/// Service implementing [`LoginService`].
#[derive(Clone)]
pub struct ProviderLoginService<A: ?Sized, U: ?Sized> {
    authenticator: Arc<A>,
    users: Arc<U>,
    propagation: Arc<dyn PageTokenPropagation>,
    clock: Arc<dyn Clock>,
}

impl<A: ?Sized, U: ?Sized> ProviderLoginService<A, U> {
    /// Create the service. `clock` stamps token expiry instants.
    pub fn new(
        authenticator: Arc<A>,
        users: Arc<U>,
        propagation: Arc<dyn PageTokenPropagation>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authenticator,
            users,
            propagation,
            clock,
        }
    }

    fn expires_at(&self, expires_in: Option<u64>) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(expires_in?).ok()?;
        self.clock
            .utc()
            .checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }
}

fn map_exchange_error(error: AuthenticatorError) -> Error {
    match error {
        AuthenticatorError::MissingState | AuthenticatorError::InvalidState => {
            Error::unauthorized(format!("login rejected: {error}"))
        }
        AuthenticatorError::MissingCode => Error::invalid_request(error.to_string()),
        AuthenticatorError::PageAccessDenied { .. } => Error::forbidden(error.to_string()),
        AuthenticatorError::Provider { .. } => {
            Error::bad_gateway(format!("login with the identity provider failed: {error}"))
        }
    }
}

#[async_trait]
impl<A, U> LoginService for ProviderLoginService<A, U>
where
    A: Authenticator + ?Sized,
    U: UserRepository + ?Sized,
{
    fn begin_login(&self) -> LoginRedirect {
        let state = random_hex::<OAUTH_STATE_BYTES>();
        let url = self.authenticator.auth_url(&state);
        LoginRedirect { state, url }
    }

    async fn complete_login(&self, request: &CodeExchangeRequest) -> Result<SessionId, Error> {
        let grant = self
            .authenticator
            .exchange_code(request)
            .await
            .map_err(map_exchange_error)?;

        let facebook_user_id = self
            .authenticator
            .api_connection(&grant.access_token)
            .current_user_id()
            .await
            .map_err(|err| Error::bad_gateway(format!("failed to identify principal: {err}")))?;

        let user = self
            .users
            .find_by_facebook_id(&facebook_user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("no user is registered for this account"))?;

        let session = UserSession {
            session_id: SessionId::generate(),
            access_token: grant.access_token,
            expires_at: self.expires_at(grant.expires_in),
            page_tokens: PageTokens::new(),
        };
        let session = self.propagation.start_session(&user, session).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(session.session_id)
    }

    async fn current_user(&self, session_id: &SessionId) -> Result<User, Error> {
        self.users
            .find_by_session_id(session_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("session is not valid; log in again"))
    }

    async fn logout(&self, session_id: &SessionId) -> Result<(), Error> {
        let Some(user) = self
            .users
            .find_by_session_id(session_id)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(());
        };
        self.users
            .clear_session(&user.id)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "user logged out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "login_service_tests.rs"]
mod tests;
