//! Driving port for refreshing a principal's page tokens.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, PageTokens, User, UserSession};

/// Resolves and stores one page token per restaurant page the principal
/// administers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageTokenPropagation: Send + Sync {
    /// Replace `user`'s page tokens with fresh ones derived from
    /// `user_token`. Nothing is stored unless every page resolves.
    async fn propagate(&self, user: &User, user_token: &AccessToken) -> Result<PageTokens, Error>;

    /// Resolve page tokens for `session`'s access token and store the session
    /// together with them in one write. On failure the user's previous
    /// session is left untouched.
    async fn start_session(&self, user: &User, session: UserSession)
    -> Result<UserSession, Error>;
}
