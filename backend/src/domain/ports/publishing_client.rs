//! Port for the social publishing API used on behalf of one access token.
//!
//! A [`PublishingClient`] is always bound to a single token: the user token
//! when discovering pages, or a page token when publishing and deleting
//! posts. Handles are obtained through
//! [`Authenticator::api_connection`](super::Authenticator::api_connection).

use async_trait::async_trait;

use crate::domain::{FacebookUserId, ManagedPage, PageId, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by publishing API adapters.
    pub enum PublishingClientError {
        /// The request never produced a response.
        Transport { message: String } =>
            "publishing API request failed: {message}",
        /// The API answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "publishing API rejected the request with status {status}: {message}",
        /// The response body did not have the expected shape.
        Decode { message: String } =>
            "publishing API response could not be decoded: {message}",
    }
}

/// Capability over the publishing API for one delegated token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishingClient: Send + Sync {
    /// Provider id of the principal owning the token.
    async fn current_user_id(&self) -> Result<FacebookUserId, PublishingClientError>;

    /// Pages the principal administers.
    async fn managed_pages(&self) -> Result<Vec<ManagedPage>, PublishingClientError>;

    /// Publish `message` to the page's feed and return the new post id.
    async fn publish(&self, page_id: &PageId, message: &str)
    -> Result<PostId, PublishingClientError>;

    /// Remove a previously published post.
    async fn delete_post(&self, post_id: &PostId) -> Result<(), PublishingClientError>;
}
