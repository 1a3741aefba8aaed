//! Reqwest-backed Graph API client.
//!
//! [`GraphApi`] owns transport details shared by every Graph API call:
//! versioned endpoint construction, the client timeout, HTTP error mapping
//! and JSON decoding. [`GraphApiClient`] binds it to one access token and
//! implements the publishing port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{AccountsDto, DeleteResultDto, ObjectIdDto, graph_error_message};
use crate::domain::ports::{PublishingClient, PublishingClientError};
use crate::domain::{AccessToken, FacebookUserId, ManagedPage, PageId, PostId};

const USER_AGENT: &str = concat!("lunch-backend/", env!("CARGO_PKG_VERSION"));
const ACCOUNTS_PAGE_LIMIT: &str = "100";
const MAX_ACCOUNT_PAGES: usize = 20;

/// Transport-level failure of a Graph API call, before it is mapped into a
/// port error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum GraphFailure {
    Transport(String),
    Status { status: StatusCode, message: String },
    Decode(String),
}

impl From<GraphFailure> for PublishingClientError {
    fn from(failure: GraphFailure) -> Self {
        match failure {
            GraphFailure::Transport(message) => Self::transport(message),
            GraphFailure::Status { status, message } => Self::rejected(status.as_u16(), message),
            GraphFailure::Decode(message) => Self::decode(message),
        }
    }
}

/// Versioned Graph API endpoint with a configured HTTP client.
#[derive(Debug, Clone)]
pub struct GraphApi {
    client: Client,
    base_url: Url,
    version: String,
}

impl GraphApi {
    /// Build the API handle with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            version: version.into(),
        })
    }

    /// `<base>/<version>/<segments...>`, with each segment percent-encoded.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, GraphFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GraphFailure::Transport(format!(
                    "graph base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(&self.version)
            .extend(segments);
        Ok(url)
    }

    /// Whether `url` points at the configured Graph API host.
    pub(super) fn same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default()
    }

    pub(super) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send `request` and decode a successful JSON body into `T`.
    pub(super) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GraphFailure> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref())
            .map_err(|error| GraphFailure::Decode(format!("invalid Graph API payload: {error}")))
    }
}

fn map_transport_error(error: reqwest::Error) -> GraphFailure {
    GraphFailure::Transport(error.to_string())
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> GraphFailure {
    let detail = graph_error_message(body).unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };
    GraphFailure::Status { status, message }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Publishing port adapter acting with one user or page token.
pub struct GraphApiClient {
    api: GraphApi,
    token: AccessToken,
}

impl GraphApiClient {
    /// Bind `api` to `token`.
    pub fn new(api: GraphApi, token: AccessToken) -> Self {
        Self { api, token }
    }

    fn authorised(&self, method: Method, url: Url) -> RequestBuilder {
        self.api
            .request(method, url)
            .bearer_auth(self.token.expose())
    }
}

#[async_trait]
impl PublishingClient for GraphApiClient {
    async fn current_user_id(&self) -> Result<FacebookUserId, PublishingClientError> {
        let url = self.api.endpoint(&["me"])?;
        let request = self.authorised(Method::GET, url).query(&[("fields", "id")]);
        let dto: ObjectIdDto = self.api.execute(request).await?;
        dto.into_user_id().map_err(PublishingClientError::decode)
    }

    async fn managed_pages(&self) -> Result<Vec<ManagedPage>, PublishingClientError> {
        let first = self.api.endpoint(&["me", "accounts"])?;
        let mut request = self
            .authorised(Method::GET, first)
            .query(&[("fields", "id,name"), ("limit", ACCOUNTS_PAGE_LIMIT)]);
        let mut pages = Vec::new();

        for _ in 0..MAX_ACCOUNT_PAGES {
            let dto: AccountsDto = self.api.execute(request).await?;
            let (batch, next) = dto.into_parts().map_err(PublishingClientError::decode)?;
            pages.extend(batch);

            let Some(next) = next else {
                return Ok(pages);
            };
            let next = Url::parse(&next).map_err(|err| {
                PublishingClientError::decode(format!("invalid paging link: {err}"))
            })?;
            // The bearer token must never leave the Graph API host.
            if !self.api.same_origin(&next) {
                return Err(PublishingClientError::decode(format!(
                    "paging link points outside the Graph API: {}",
                    next.host_str().unwrap_or_default()
                )));
            }
            request = self.authorised(Method::GET, next);
        }

        Err(PublishingClientError::decode(format!(
            "managed pages exceeded {MAX_ACCOUNT_PAGES} result pages"
        )))
    }

    async fn publish(
        &self,
        page_id: &PageId,
        message: &str,
    ) -> Result<PostId, PublishingClientError> {
        let url = self.api.endpoint(&[page_id.as_str(), "feed"])?;
        let request = self
            .authorised(Method::POST, url)
            .form(&[("message", message)]);
        let dto: ObjectIdDto = self.api.execute(request).await?;
        dto.into_post_id().map_err(PublishingClientError::decode)
    }

    async fn delete_post(&self, post_id: &PostId) -> Result<(), PublishingClientError> {
        let url = self.api.endpoint(&[post_id.as_str()])?;
        let dto: DeleteResultDto = self
            .api
            .execute(self.authorised(Method::DELETE, url))
            .await?;
        if dto.success {
            Ok(())
        } else {
            Err(PublishingClientError::rejected(
                StatusCode::OK.as_u16(),
                format!("deleting post {post_id} was not acknowledged"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Graph API helpers.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn api() -> GraphApi {
        GraphApi::new(
            Url::parse("https://graph.test/").expect("url"),
            "v19.0",
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[rstest]
    fn endpoint_prefixes_version_and_encodes_segments(api: GraphApi) {
        let url = api.endpoint(&["123_456", "feed"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://graph.test/v19.0/123_456/feed");

        let url = api.endpoint(&["a/b"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://graph.test/v19.0/a%2Fb");
    }

    #[rstest]
    #[case("https://graph.test/v19.0/me/accounts?after=x", true)]
    #[case("http://graph.test/v19.0/me/accounts", false)]
    #[case("https://evil.test/v19.0/me/accounts", false)]
    #[case("https://graph.test:8443/v19.0/me/accounts", false)]
    fn paging_links_must_stay_on_the_graph_host(
        api: GraphApi,
        #[case] link: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(api.same_origin(&Url::parse(link).expect("url")), expected);
    }

    #[test]
    fn status_errors_prefer_the_graph_error_message() {
        let failure = map_status_error(
            StatusCode::BAD_REQUEST,
            br#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#,
        );
        assert_eq!(
            failure,
            GraphFailure::Status {
                status: StatusCode::BAD_REQUEST,
                message: "status 400: Invalid OAuth access token. (code 190)".to_owned(),
            }
        );
    }

    #[test]
    fn status_errors_fall_back_to_a_body_preview() {
        let body = "x".repeat(200);
        let GraphFailure::Status { message, .. } =
            map_status_error(StatusCode::BAD_GATEWAY, body.as_bytes())
        else {
            panic!("expected status failure");
        };
        assert!(message.starts_with("status 502: xxx"));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn failures_map_into_publishing_errors() {
        let error: PublishingClientError = GraphFailure::Status {
            status: StatusCode::FORBIDDEN,
            message: "denied".to_owned(),
        }
        .into();
        assert_eq!(error, PublishingClientError::rejected(403_u16, "denied"));
    }
}
