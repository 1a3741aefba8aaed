//! PostgreSQL-backed `UserRepository` implementation.
//!
//! Users are provisioned out of band; this adapter only reads them and
//! manages their session columns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{FacebookUserId, PageTokens, SessionId, User, UserId, UserSession};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{UserRow, UserSessionUpdate, encode_page_tokens};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>, UserPersistenceError> {
    row.map(UserRow::into_domain)
        .transpose()
        .map_err(UserPersistenceError::corrupt)
}

fn ensure_updated(updated: usize, user_id: &UserId) -> Result<(), UserPersistenceError> {
    if updated == 0 {
        Err(UserPersistenceError::not_found(*user_id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_facebook_id(
        &self,
        facebook_user_id: &FacebookUserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::facebook_user_id.eq(facebook_user_id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_user(row)
    }

    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::session_id.eq(session_id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        into_user(row)
    }

    async fn set_session(
        &self,
        user_id: &UserId,
        session: &UserSession,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set((
                UserSessionUpdate::start(session),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        ensure_updated(updated, user_id)
    }

    async fn set_page_tokens(
        &self,
        user_id: &UserId,
        page_tokens: &PageTokens,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set((
                users::page_tokens.eq(encode_page_tokens(page_tokens)),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        ensure_updated(updated, user_id)
    }

    async fn clear_session(&self, user_id: &UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set((
                UserSessionUpdate::cleared(),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        ensure_updated(updated, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn zero_updated_rows_is_not_found() {
        let user_id = UserId::random();
        assert_eq!(
            ensure_updated(0, &user_id),
            Err(UserPersistenceError::not_found(user_id))
        );
        assert_eq!(ensure_updated(1, &user_id), Ok(()));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("invalid URL"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
