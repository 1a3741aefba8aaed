//! Page token propagation.
//!
//! Every Facebook page a principal administers that is connected to a known
//! restaurant gets a page-scoped token. All tokens are resolved before
//! anything is written. A login stores the new session and its tokens in a
//! single update, and a refresh replaces the token set of the current
//! session in a single update. If any page fails to resolve, nothing is
//! written and the previous session and tokens stay in place.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{
    Authenticator, AuthenticatorError, PageTokenPropagation, RestaurantRepository, UserRepository,
};
use crate::domain::service_support::{map_restaurant_error, map_user_error};
use crate::domain::{AccessToken, Error, PageId, PageTokens, User, UserSession};

/// Service implementing [`PageTokenPropagation`].
#[derive(Clone)]
pub struct TokenPropagationService<A: ?Sized, R: ?Sized, U: ?Sized> {
    authenticator: Arc<A>,
    restaurants: Arc<R>,
    users: Arc<U>,
}

impl<A: ?Sized, R: ?Sized, U: ?Sized> TokenPropagationService<A, R, U> {
    /// Create the service from its collaborators.
    pub fn new(authenticator: Arc<A>, restaurants: Arc<R>, users: Arc<U>) -> Self {
        Self {
            authenticator,
            restaurants,
            users,
        }
    }
}

impl<A, R, U> TokenPropagationService<A, R, U>
where
    A: Authenticator + ?Sized,
    R: RestaurantRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    fn map_page_token_error(error: AuthenticatorError) -> Error {
        match error {
            AuthenticatorError::PageAccessDenied { page_id } => Error::forbidden(format!(
                "access to page {page_id} was denied; log in again with page permissions"
            )),
            other => Error::internal(format!("failed to resolve page token: {other}")),
        }
    }

    async fn administered_page_ids(&self, user_token: &AccessToken) -> Result<Vec<PageId>, Error> {
        let client = self.authenticator.api_connection(user_token);
        let pages = client
            .managed_pages()
            .await
            .map_err(|err| Error::internal(format!("failed to list managed pages: {err}")))?;
        Ok(pages.into_iter().map(|page| page.id).collect())
    }

    async fn resolve(&self, user: &User, user_token: &AccessToken) -> Result<PageTokens, Error> {
        let page_ids = self.administered_page_ids(user_token).await?;
        debug!(user_id = %user.id, pages = page_ids.len(), "listed administered pages");

        let restaurants = self
            .restaurants
            .find_by_page_ids(&page_ids)
            .await
            .map_err(map_restaurant_error)?;

        let mut page_tokens = PageTokens::new();
        for restaurant in &restaurants {
            let Some(page_id) = restaurant.page_id.as_ref() else {
                continue;
            };
            let token = self
                .authenticator
                .page_access_token(user_token, page_id)
                .await
                .map_err(Self::map_page_token_error)?;
            page_tokens.insert(page_id.clone(), token);
        }
        Ok(page_tokens)
    }
}

#[async_trait]
impl<A, R, U> PageTokenPropagation for TokenPropagationService<A, R, U>
where
    A: Authenticator + ?Sized,
    R: RestaurantRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn propagate(&self, user: &User, user_token: &AccessToken) -> Result<PageTokens, Error> {
        let page_tokens = self.resolve(user, user_token).await?;
        self.users
            .set_page_tokens(&user.id, &page_tokens)
            .await
            .map_err(map_user_error)?;
        info!(
            user_id = %user.id,
            restaurants = page_tokens.len(),
            "stored page tokens"
        );
        Ok(page_tokens)
    }

    async fn start_session(
        &self,
        user: &User,
        mut session: UserSession,
    ) -> Result<UserSession, Error> {
        session.page_tokens = self.resolve(user, &session.access_token).await?;
        self.users
            .set_session(&user.id, &session)
            .await
            .map_err(map_user_error)?;
        info!(
            user_id = %user.id,
            restaurants = session.page_tokens.len(),
            "stored session with page tokens"
        );
        Ok(session)
    }
}

#[cfg(test)]
#[path = "token_propagation_service_tests.rs"]
mod tests;
