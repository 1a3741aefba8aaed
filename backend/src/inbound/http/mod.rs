//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub(crate) mod auth;
pub mod error;
pub mod group_posts;
pub mod health;
pub mod login;
pub mod offers;
pub mod regions;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;
