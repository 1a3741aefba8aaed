//! PostgreSQL-backed `GroupPostRepository` implementation.
//!
//! The `offer_group_posts_restaurant_date_key` unique index guarantees one
//! row per (restaurant, date); inserts losing that race surface as
//! [`GroupPostRepositoryError::Duplicate`] so callers can re-read.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GroupPostRepository, GroupPostRepositoryError};
use crate::domain::{OfferDate, OfferGroupPost, RestaurantId};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{GroupPostRow, GroupPostUpdate, NewGroupPostRow};
use super::pool::{DbPool, PoolError};
use super::schema::offer_group_posts;

const RESTAURANT_DATE_KEY: &str = "offer_group_posts_restaurant_date_key";

/// Diesel-backed implementation of the group post repository port.
#[derive(Clone)]
pub struct DieselGroupPostRepository {
    pool: DbPool,
}

impl DieselGroupPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupPostRepositoryError {
    map_basic_pool_error(error, GroupPostRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GroupPostRepositoryError {
    map_basic_diesel_error(
        error,
        GroupPostRepositoryError::query,
        GroupPostRepositoryError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error, post: &OfferGroupPost) -> GroupPostRepositoryError {
    if is_unique_violation(&error, Some(RESTAURANT_DATE_KEY)) {
        GroupPostRepositoryError::duplicate(post.restaurant_id, post.date)
    } else {
        map_diesel_error(error)
    }
}

#[async_trait]
impl GroupPostRepository for DieselGroupPostRepository {
    async fn find_by_date_and_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<Option<OfferGroupPost>, GroupPostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupPostRow> = offer_group_posts::table
            .filter(offer_group_posts::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(offer_group_posts::date.eq(date.as_naive()))
            .select(GroupPostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(GroupPostRow::into_domain))
    }

    async fn insert(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(offer_group_posts::table)
            .values(NewGroupPostRow::from(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, post))
    }

    async fn update(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            offer_group_posts::table.filter(offer_group_posts::id.eq(post.id.as_uuid())),
        )
        .set((
            GroupPostUpdate::from(post),
            offer_group_posts::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(GroupPostRepositoryError::query(format!(
                "group post {} not found for update",
                post.id
            )));
        }
        Ok(())
    }
}
