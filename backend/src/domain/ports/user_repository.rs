//! Port abstraction for principals and their sessions.
use async_trait::async_trait;

use crate::domain::{FacebookUserId, PageTokens, SessionId, User, UserId, UserSession};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The user to update does not exist.
        NotFound { user_id: UserId } => "user {user_id} does not exist",
        /// A stored row could not be turned into a [`User`].
        Corrupt { message: String } => "stored user is invalid: {message}",
    }
}

/// Storage for principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch the user registered for a provider identity.
    async fn find_by_facebook_id(
        &self,
        facebook_user_id: &FacebookUserId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user whose current session carries `session_id`.
    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Attach a new session, replacing the previous one including its page
    /// tokens.
    async fn set_session(
        &self,
        user_id: &UserId,
        session: &UserSession,
    ) -> Result<(), UserPersistenceError>;

    /// Replace the page tokens of the current session in one write.
    async fn set_page_tokens(
        &self,
        user_id: &UserId,
        page_tokens: &PageTokens,
    ) -> Result<(), UserPersistenceError>;

    /// Drop the current session.
    async fn clear_session(&self, user_id: &UserId) -> Result<(), UserPersistenceError>;
}
