//! Facebook OAuth adapter implementing [`Authenticator`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{AccessTokenDto, PageAccessTokenDto};
use super::graph_client::{GraphApi, GraphApiClient, GraphFailure};
use crate::domain::ports::{
    Authenticator, AuthenticatorError, CodeExchangeRequest, PublishingClient, validate_callback,
};
use crate::domain::{AccessGrant, AccessToken, PageId};

/// Permissions requested in the login dialog.
pub const LOGIN_SCOPES: &str = "pages_show_list,pages_manage_posts,pages_read_engagement";

/// Default Graph API host.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/";
/// Default host serving the login dialog.
pub const DEFAULT_DIALOG_BASE_URL: &str = "https://www.facebook.com/";
/// Graph API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v19.0";
/// Outbound request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Application credentials and endpoints for the Facebook adapter.
pub struct FacebookConfig {
    pub app_id: String,
    pub app_secret: Zeroizing<String>,
    /// Callback URL registered with the Facebook app.
    pub redirect_url: Url,
    pub graph_base_url: Url,
    pub dialog_base_url: Url,
    pub api_version: String,
    pub timeout: Duration,
}

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FacebookAdapterError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("{url} cannot be used as a base URL")]
    InvalidBaseUrl { url: Url },
}

/// Facebook-backed [`Authenticator`].
pub struct FacebookAuthenticator {
    api: GraphApi,
    app_id: String,
    app_secret: Zeroizing<String>,
    redirect_url: Url,
    dialog_url: Url,
}

impl FacebookAuthenticator {
    /// Build the adapter from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or a base URL cannot carry
    /// a path.
    pub fn new(config: FacebookConfig) -> Result<Self, FacebookAdapterError> {
        if config.graph_base_url.cannot_be_a_base() {
            return Err(FacebookAdapterError::InvalidBaseUrl {
                url: config.graph_base_url,
            });
        }
        let mut dialog_url = config.dialog_base_url.clone();
        dialog_url
            .path_segments_mut()
            .map_err(|()| FacebookAdapterError::InvalidBaseUrl {
                url: config.dialog_base_url.clone(),
            })?
            .pop_if_empty()
            .extend([config.api_version.as_str(), "dialog", "oauth"]);

        let api = GraphApi::new(config.graph_base_url, config.api_version, config.timeout)?;
        Ok(Self {
            api,
            app_id: config.app_id,
            app_secret: config.app_secret,
            redirect_url: config.redirect_url,
            dialog_url,
        })
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<AccessGrant, GraphFailure> {
        let url = self.api.endpoint(&["oauth", "access_token"])?;
        let dto: AccessTokenDto = self
            .api
            .execute(self.api.request(Method::GET, url).query(params))
            .await?;
        dto.into_grant().map_err(GraphFailure::Decode)
    }
}

fn provider_error(failure: GraphFailure) -> AuthenticatorError {
    let message = match failure {
        GraphFailure::Transport(message) | GraphFailure::Decode(message) => message,
        GraphFailure::Status { message, .. } => message,
    };
    AuthenticatorError::provider(message)
}

/// Client errors other than throttling mean the page is not reachable with
/// this token.
fn map_page_token_failure(failure: GraphFailure, page_id: &PageId) -> AuthenticatorError {
    match failure {
        GraphFailure::Status { status, .. }
            if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS =>
        {
            AuthenticatorError::page_access_denied(page_id.clone())
        }
        other => provider_error(other),
    }
}

#[async_trait]
impl Authenticator for FacebookAuthenticator {
    fn auth_url(&self, state: &str) -> Url {
        let mut url = self.dialog_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", self.redirect_url.as_str())
            .append_pair("state", state)
            .append_pair("scope", LOGIN_SCOPES);
        url
    }

    async fn exchange_code(
        &self,
        request: &CodeExchangeRequest,
    ) -> Result<AccessGrant, AuthenticatorError> {
        let code = validate_callback(request)?;

        let short_lived = self
            .request_token(&[
                ("client_id", self.app_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("code", code),
            ])
            .await
            .map_err(provider_error)?;
        debug!("authorisation code exchanged for a short-lived token");

        self.request_token(&[
            ("grant_type", "fb_exchange_token"),
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.as_str()),
            ("fb_exchange_token", short_lived.access_token.expose()),
        ])
        .await
        .map_err(provider_error)
    }

    fn api_connection(&self, token: &AccessToken) -> Arc<dyn PublishingClient> {
        Arc::new(GraphApiClient::new(self.api.clone(), token.clone()))
    }

    async fn page_access_token(
        &self,
        user_token: &AccessToken,
        page_id: &PageId,
    ) -> Result<AccessToken, AuthenticatorError> {
        let url = self
            .api
            .endpoint(&[page_id.as_str()])
            .map_err(provider_error)?;
        let request = self
            .api
            .request(Method::GET, url)
            .bearer_auth(user_token.expose())
            .query(&[("fields", "access_token")]);
        let dto: PageAccessTokenDto = self
            .api
            .execute(request)
            .await
            .map_err(|failure| map_page_token_failure(failure, page_id))?;

        dto.access_token
            .filter(|token| !token.trim().is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| AuthenticatorError::page_access_denied(page_id.clone()))
    }
}
