//! PostgreSQL-backed `OfferRepository` implementation.
//!
//! Day lookups compare instants only: an offer belongs to a day when its
//! `[starts_at, ends_at)` window overlaps the day bounds.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OfferRepository, OfferRepositoryError};
use crate::domain::{DayBounds, Offer, OfferId, RegionId, RestaurantId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewOfferRow, OfferRow, OfferUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{offers, restaurants};

/// Diesel-backed implementation of the offer repository port.
#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OfferRepositoryError {
    map_basic_pool_error(error, OfferRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OfferRepositoryError {
    map_basic_diesel_error(
        error,
        OfferRepositoryError::query,
        OfferRepositoryError::connection,
    )
}

fn into_offers(rows: Vec<OfferRow>) -> Result<Vec<Offer>, OfferRepositoryError> {
    rows.into_iter()
        .map(OfferRow::into_domain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(OfferRepositoryError::corrupt)
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OfferRow> = offers::table
            .filter(offers::id.eq(id.as_uuid()))
            .select(OfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(OfferRow::into_domain)
            .transpose()
            .map_err(OfferRepositoryError::corrupt)
    }

    async fn find_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OfferRow> = offers::table
            .filter(offers::restaurant_id.eq(restaurant_id.as_uuid()))
            .filter(offers::starts_at.lt(bounds.end))
            .filter(offers::ends_at.gt(bounds.start))
            .select(OfferRow::as_select())
            .order_by((offers::starts_at.asc(), offers::title.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_offers(rows)
    }

    async fn find_for_region(
        &self,
        region_id: &RegionId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OfferRow> = offers::table
            .inner_join(restaurants::table)
            .filter(restaurants::region_id.eq(region_id.as_uuid()))
            .filter(offers::starts_at.lt(bounds.end))
            .filter(offers::ends_at.gt(bounds.start))
            .select(OfferRow::as_select())
            .order_by((offers::starts_at.asc(), offers::title.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_offers(rows)
    }

    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(offers::table)
            .values(NewOfferRow::from(offer))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(offers::table.filter(offers::id.eq(offer.id.as_uuid())))
            .set((
                OfferUpdate::from(offer),
                offers::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(OfferRepositoryError::query(format!(
                "offer {} not found for update",
                offer.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &OfferId) -> Result<(), OfferRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(offers::table.filter(offers::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
