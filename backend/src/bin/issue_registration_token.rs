//! Issue a registration token, optionally purging expired ones first.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;

use backend::domain::RegistrationAccessToken;
use backend::domain::ports::{RegistrationTokenRepository, RegistrationTokenRepositoryError};
use backend::outbound::persistence::{DbPool, DieselRegistrationTokenRepository, PoolConfig};
use chrono::{DateTime, Utc};
use clap::Parser;
use mockable::{Clock, DefaultClock};
use tokio::runtime::Builder;

const DATABASE_URL_ENV: &str = "LUNCH_DATABASE_URL";

/// `issue-registration-token` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "issue-registration-token",
    about = "Create a registration token valid for seven days",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `LUNCH_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Delete expired tokens before issuing a new one.
    #[arg(long = "purge-expired")]
    purge_expired: bool,
}

#[derive(Debug)]
struct IssueOutcome {
    token: RegistrationAccessToken,
    purged: Option<u64>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let repository = DieselRegistrationTokenRepository::new(pool);

    let outcome = issue(&repository, DefaultClock.utc(), args.purge_expired)
        .await
        .map_err(|error| io::Error::other(format!("issue registration token: {error}")))?;

    if let Some(purged) = outcome.purged {
        println!("purged={purged}");
    }
    println!("token={}", outcome.token.token());
    println!("expires_at={}", outcome.token.expires_at().to_rfc3339());
    Ok(())
}

async fn issue<R>(
    repository: &R,
    now: DateTime<Utc>,
    purge_expired: bool,
) -> Result<IssueOutcome, RegistrationTokenRepositoryError>
where
    R: RegistrationTokenRepository + ?Sized,
{
    let purged = if purge_expired {
        Some(repository.purge_expired().await?)
    } else {
        None
    };
    let token = RegistrationAccessToken::issue(now);
    repository.insert(&token).await?;
    Ok(IssueOutcome { token, purged })
}

fn resolve_database_url(cli_value: Option<String>) -> io::Result<String> {
    cli_value
        .or_else(|| env::var(DATABASE_URL_ENV).ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("--database-url or {DATABASE_URL_ENV} must be set"),
            )
        })
}
