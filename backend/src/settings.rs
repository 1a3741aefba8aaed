//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `LUNCH_*` environment variables, configuration files and
//! command-line flags, in OrthoConfig's usual precedence. Session cookie
//! settings are read separately by
//! [`session_settings_from_env`](crate::inbound::http::session_config::session_settings_from_env)
//! because they depend on the build mode.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{CurrencySymbol, DEFAULT_CURRENCY_SYMBOL};
use crate::outbound::facebook::{
    DEFAULT_API_VERSION, DEFAULT_DIALOG_BASE_URL, DEFAULT_GRAPH_BASE_URL, DEFAULT_TIMEOUT,
    FacebookConfig,
};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when required settings are absent or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

fn invalid(name: &'static str, message: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        name,
        message: message.to_string(),
    }
}

/// Configuration values for the lunch offer service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LUNCH")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    pub facebook_app_id: Option<String>,
    pub facebook_app_secret: Option<String>,
    /// OAuth callback URL registered with the Facebook app.
    pub facebook_redirect_url: Option<String>,
    /// Graph API base URL override, mainly for staging proxies.
    pub facebook_graph_url: Option<String>,
    pub facebook_dialog_url: Option<String>,
    pub facebook_api_version: Option<String>,
    /// Per-request timeout for Graph API calls, in seconds.
    pub facebook_timeout_secs: Option<u64>,
    /// Symbol appended to prices in group post messages.
    pub currency_symbol: Option<String>,
}

impl AppSettings {
    /// Parse the bind address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| invalid("LUNCH_BIND_ADDR", err))
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_deref(), "LUNCH_DATABASE_URL")
    }

    /// Pool configuration for [`DbPool::new`](crate::outbound::persistence::DbPool::new).
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let config = PoolConfig::new(self.database_url()?);
        Ok(match self.database_max_connections {
            Some(0) => return Err(invalid("LUNCH_DATABASE_MAX_CONNECTIONS", "must be positive")),
            Some(max_size) => config.with_max_size(max_size),
            None => config,
        })
    }

    /// Build the Graph API adapter configuration.
    pub fn facebook_config(&self) -> Result<FacebookConfig, SettingsError> {
        let app_id = required(self.facebook_app_id.as_deref(), "LUNCH_FACEBOOK_APP_ID")?;
        let app_secret = required(
            self.facebook_app_secret.as_deref(),
            "LUNCH_FACEBOOK_APP_SECRET",
        )?;
        let redirect_url = Url::parse(required(
            self.facebook_redirect_url.as_deref(),
            "LUNCH_FACEBOOK_REDIRECT_URL",
        )?)
        .map_err(|err| invalid("LUNCH_FACEBOOK_REDIRECT_URL", err))?;
        let graph_base_url = parse_url(
            self.facebook_graph_url.as_deref(),
            DEFAULT_GRAPH_BASE_URL,
            "LUNCH_FACEBOOK_GRAPH_URL",
        )?;
        let dialog_base_url = parse_url(
            self.facebook_dialog_url.as_deref(),
            DEFAULT_DIALOG_BASE_URL,
            "LUNCH_FACEBOOK_DIALOG_URL",
        )?;
        let timeout = match self.facebook_timeout_secs {
            Some(0) => return Err(invalid("LUNCH_FACEBOOK_TIMEOUT_SECS", "must be positive")),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(FacebookConfig {
            app_id: app_id.to_owned(),
            app_secret: Zeroizing::new(app_secret.to_owned()),
            redirect_url,
            graph_base_url,
            dialog_base_url,
            api_version: self
                .facebook_api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            timeout,
        })
    }

    pub fn currency(&self) -> CurrencySymbol {
        CurrencySymbol::new(
            self.currency_symbol
                .as_deref()
                .filter(|symbol| !symbol.trim().is_empty())
                .unwrap_or(DEFAULT_CURRENCY_SYMBOL),
        )
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(SettingsError::Missing { name })
}

fn parse_url(value: Option<&str>, default: &str, name: &'static str) -> Result<Url, SettingsError> {
    Url::parse(value.unwrap_or(default)).map_err(|err| invalid(name, err))
}
