//! Scriptable stand-in for the Graph API.
//!
//! Principals are registered against an authorisation code. Exchanging that
//! code yields a user token of the form `user-token:<code>`; page tokens are
//! `page-token:<page id>`. Publishing only succeeds with the page token of
//! the target page, so tests observe whether the reconciler used the right
//! credential.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use url::Url;

use crate::domain::ports::{
    Authenticator, AuthenticatorError, CodeExchangeRequest, PublishingClient,
    PublishingClientError, validate_callback,
};
use crate::domain::{AccessGrant, AccessToken, FacebookUserId, ManagedPage, PageId, PostId};

const DIALOG_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";
const USER_TOKEN_PREFIX: &str = "user-token:";
const PAGE_TOKEN_PREFIX: &str = "page-token:";
const GRANT_LIFETIME_SECS: u64 = 60 * 60 * 24 * 60;

/// A post accepted by the fake Graph API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub page_id: PageId,
    pub post_id: PostId,
    pub message: String,
}

#[derive(Debug, Clone)]
struct Principal {
    facebook_user_id: FacebookUserId,
    pages: Vec<ManagedPage>,
}

#[derive(Debug, Default)]
struct GraphState {
    principals: HashMap<String, Principal>,
    published: Vec<PublishedPost>,
    deleted: Vec<PostId>,
    fail_publishing: bool,
    deny_page_tokens: bool,
    next_post: u64,
}

/// In-memory authenticator and publishing endpoint.
#[derive(Clone, Default)]
pub struct FakeFacebook {
    state: Arc<Mutex<GraphState>>,
}

impl FakeFacebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `code` at the callback as a login of `facebook_user_id`, who
    /// administers `pages`.
    pub fn register_principal(&self, code: &str, facebook_user_id: &str, pages: &[(&str, &str)]) {
        let facebook_user_id = match FacebookUserId::new(facebook_user_id) {
            Ok(id) => id,
            Err(error) => panic!("invalid principal id: {error}"),
        };
        let pages = pages
            .iter()
            .map(|(id, name)| ManagedPage {
                id: page_id(id),
                name: (*name).to_owned(),
            })
            .collect();
        self.lock().principals.insert(
            code.to_owned(),
            Principal {
                facebook_user_id,
                pages,
            },
        );
    }

    /// Make every subsequent publish call fail at the transport level.
    pub fn fail_publishing(&self, fail: bool) {
        self.lock().fail_publishing = fail;
    }

    /// Refuse every page token request as if page access were revoked.
    pub fn deny_page_tokens(&self, deny: bool) {
        self.lock().deny_page_tokens = deny;
    }

    pub fn published(&self) -> Vec<PublishedPost> {
        self.lock().published.clone()
    }

    pub fn deleted(&self) -> Vec<PostId> {
        self.lock().deleted.clone()
    }

    /// Posts that were published and not deleted since.
    pub fn live_posts(&self) -> Vec<PublishedPost> {
        let state = self.lock();
        state
            .published
            .iter()
            .filter(|post| !state.deleted.contains(&post.post_id))
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, GraphState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("graph state mutex"),
        }
    }
}

fn page_id(raw: &str) -> PageId {
    match PageId::new(raw) {
        Ok(id) => id,
        Err(error) => panic!("invalid page id: {error}"),
    }
}

fn principal_for(state: &GraphState, token: &str) -> Option<Principal> {
    let code = token.strip_prefix(USER_TOKEN_PREFIX)?;
    state.principals.get(code).cloned()
}

#[async_trait]
impl Authenticator for FakeFacebook {
    fn auth_url(&self, state: &str) -> Url {
        match Url::parse_with_params(DIALOG_URL, &[("client_id", "test-app"), ("state", state)]) {
            Ok(url) => url,
            Err(error) => panic!("dialog url: {error}"),
        }
    }

    async fn exchange_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<AccessGrant, AuthenticatorError> {
        let code = validate_callback(request)?;
        if !self.lock().principals.contains_key(code) {
            return Err(AuthenticatorError::provider(format!(
                "authorisation code {code} is unknown"
            )));
        }
        Ok(AccessGrant {
            access_token: AccessToken::new(format!("{USER_TOKEN_PREFIX}{code}")),
            expires_in: Some(GRANT_LIFETIME_SECS),
        })
    }

    fn api_connection(&self, token: &AccessToken) -> Arc<dyn PublishingClient> {
        Arc::new(FakeGraphConnection {
            facebook: self.clone(),
            token: token.expose().to_owned(),
        })
    }

    async fn page_access_token(
        &self,
        user_token: &AccessToken,
        page_id: &PageId,
    ) -> Result<AccessToken, AuthenticatorError> {
        let state = self.lock();
        let administers = !state.deny_page_tokens
            && principal_for(&state, user_token.expose())
                .is_some_and(|principal| principal.pages.iter().any(|page| &page.id == page_id));
        if !administers {
            return Err(AuthenticatorError::page_access_denied(page_id.clone()));
        }
        Ok(AccessToken::new(format!("{PAGE_TOKEN_PREFIX}{page_id}")))
    }
}

/// Graph API connection bound to one token.
struct FakeGraphConnection {
    facebook: FakeFacebook,
    token: String,
}

impl FakeGraphConnection {
    fn principal(&self) -> Result<Principal, PublishingClientError> {
        principal_for(&self.facebook.lock(), &self.token)
            .ok_or_else(|| PublishingClientError::rejected(401_u16, "invalid user token"))
    }
}

#[async_trait]
impl PublishingClient for FakeGraphConnection {
    async fn current_user_id(&self) -> Result<FacebookUserId, PublishingClientError> {
        Ok(self.principal()?.facebook_user_id)
    }

    async fn managed_pages(&self) -> Result<Vec<ManagedPage>, PublishingClientError> {
        Ok(self.principal()?.pages)
    }

    async fn publish(
        &self,
        page_id: &PageId,
        message: &str,
    ) -> Result<PostId, PublishingClientError> {
        let mut state = self.facebook.lock();
        if state.fail_publishing {
            return Err(PublishingClientError::transport("connection reset"));
        }
        if self.token != format!("{PAGE_TOKEN_PREFIX}{page_id}") {
            return Err(PublishingClientError::rejected(
                403_u16,
                "token cannot publish to this page",
            ));
        }
        state.next_post += 1;
        let post_id = match PostId::new(format!("{page_id}_{}", state.next_post)) {
            Ok(id) => id,
            Err(error) => return Err(PublishingClientError::decode(error.to_string())),
        };
        state.published.push(PublishedPost {
            page_id: page_id.clone(),
            post_id: post_id.clone(),
            message: message.to_owned(),
        });
        Ok(post_id)
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<(), PublishingClientError> {
        let mut state = self.facebook.lock();
        let known = state.published.iter().any(|post| &post.post_id == post_id);
        if !known || state.deleted.contains(post_id) {
            return Err(PublishingClientError::rejected(404_u16, "post does not exist"));
        }
        state.deleted.push(post_id.clone());
        Ok(())
    }
}
