//! Facebook Graph API adapters.
//!
//! [`FacebookAuthenticator`] implements the OAuth login flow and page token
//! lookup; [`GraphApiClient`] publishes and deletes page posts on behalf of
//! one token.

mod authenticator;
mod dto;
mod graph_client;

pub use authenticator::{
    DEFAULT_API_VERSION, DEFAULT_DIALOG_BASE_URL, DEFAULT_GRAPH_BASE_URL, DEFAULT_TIMEOUT,
    FacebookAdapterError, FacebookAuthenticator, FacebookConfig, LOGIN_SCOPES,
};
pub use graph_client::{GraphApi, GraphApiClient};
