//! PostgreSQL-backed `RegistrationTokenRepository` implementation.
//!
//! Token expiry lives here rather than in the domain: a token is valid while
//! `created_at + ttl` is later than the database clock.

use async_trait::async_trait;
use diesel::pg::data_types::PgInterval;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RegistrationTokenRepository, RegistrationTokenRepositoryError};
use crate::domain::{REGISTRATION_TOKEN_TTL_DAYS, RegistrationAccessToken};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::RegistrationTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::registration_tokens;

/// Diesel-backed implementation of the registration token repository port.
#[derive(Clone)]
pub struct DieselRegistrationTokenRepository {
    pool: DbPool,
}

impl DieselRegistrationTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the token lifetime is a small constant number of days"
)]
fn token_ttl() -> PgInterval {
    PgInterval::from_days(REGISTRATION_TOKEN_TTL_DAYS as i32)
}

fn map_pool_error(error: PoolError) -> RegistrationTokenRepositoryError {
    map_basic_pool_error(error, RegistrationTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RegistrationTokenRepositoryError {
    map_basic_diesel_error(
        error,
        RegistrationTokenRepositoryError::query,
        RegistrationTokenRepositoryError::connection,
    )
}

#[async_trait]
impl RegistrationTokenRepository for DieselRegistrationTokenRepository {
    async fn insert(
        &self,
        token: &RegistrationAccessToken,
    ) -> Result<(), RegistrationTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(registration_tokens::table)
            .values(RegistrationTokenRow::from(token))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_valid(
        &self,
        token: &str,
    ) -> Result<Option<RegistrationAccessToken>, RegistrationTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RegistrationTokenRow> = registration_tokens::table
            .filter(registration_tokens::token.eq(token))
            .filter((registration_tokens::created_at + token_ttl()).gt(diesel::dsl::now))
            .select(RegistrationTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(RegistrationTokenRow::into_domain))
    }

    async fn purge_expired(&self) -> Result<u64, RegistrationTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            registration_tokens::table
                .filter((registration_tokens::created_at + token_ttl()).le(diesel::dsl::now)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
