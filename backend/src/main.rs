//! Backend entry-point: loads settings, migrates the database and serves the
//! lunch offer API.

mod server;

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::facebook::FacebookAuthenticator;
use backend::outbound::persistence::{DbPool, run_pending_migrations};
use backend::settings::AppSettings;
use server::{ServerConfig, build_http_state, create_server};

fn startup_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|e| startup_error("failed to load settings", e))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| startup_error("invalid session settings", e))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| startup_error("invalid settings", e))?;
    let pool_config = settings
        .pool_config()
        .map_err(|e| startup_error("invalid settings", e))?;
    let facebook_config = settings
        .facebook_config()
        .map_err(|e| startup_error("invalid settings", e))?;

    let database_url = pool_config.database_url().to_owned();
    tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|e| startup_error("migration task failed", e))?
        .map_err(|e| startup_error("database migration failed", e))?;

    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| startup_error("failed to connect to the database", e))?;
    let authenticator = FacebookAuthenticator::new(facebook_config)
        .map_err(|e| startup_error("failed to build the Facebook client", e))?;

    let http_state = build_http_state(&pool, authenticator, settings.currency());
    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::from_session(session, bind_addr);

    info!(bind_addr = %config.bind_addr(), "starting lunch backend");
    create_server(health_state, http_state, config)?.await
}
