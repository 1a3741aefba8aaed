//! PostgreSQL-backed `RestaurantRepository` and `RegionRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    RegionRepository, RegionRepositoryError, RestaurantRepository, RestaurantRepositoryError,
};
use crate::domain::{PageId, Region, RegionId, Restaurant, RestaurantId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{RegionRow, RestaurantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{regions, restaurants};

/// Diesel-backed implementation of the restaurant repository port.
#[derive(Clone)]
pub struct DieselRestaurantRepository {
    pool: DbPool,
}

impl DieselRestaurantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_restaurant_pool_error(error: PoolError) -> RestaurantRepositoryError {
    map_basic_pool_error(error, RestaurantRepositoryError::connection)
}

fn map_restaurant_diesel_error(error: diesel::result::Error) -> RestaurantRepositoryError {
    map_basic_diesel_error(
        error,
        RestaurantRepositoryError::query,
        RestaurantRepositoryError::connection,
    )
}

#[async_trait]
impl RestaurantRepository for DieselRestaurantRepository {
    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_restaurant_pool_error)?;
        let row: Option<RestaurantRow> = restaurants::table
            .filter(restaurants::id.eq(id.as_uuid()))
            .select(RestaurantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_restaurant_diesel_error)?;
        Ok(row.map(RestaurantRow::into_domain))
    }

    async fn find_by_page_ids(
        &self,
        page_ids: &[PageId],
    ) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<&str> = page_ids.iter().map(PageId::as_str).collect();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_restaurant_pool_error)?;
        let rows: Vec<RestaurantRow> = restaurants::table
            .filter(restaurants::facebook_page_id.assume_not_null().eq_any(raw))
            .select(RestaurantRow::as_select())
            .order_by(restaurants::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_restaurant_diesel_error)?;
        Ok(rows.into_iter().map(RestaurantRow::into_domain).collect())
    }
}

/// Diesel-backed implementation of the region repository port.
#[derive(Clone)]
pub struct DieselRegionRepository {
    pool: DbPool,
}

impl DieselRegionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_region_pool_error(error: PoolError) -> RegionRepositoryError {
    map_basic_pool_error(error, RegionRepositoryError::connection)
}

fn map_region_diesel_error(error: diesel::result::Error) -> RegionRepositoryError {
    map_basic_diesel_error(
        error,
        RegionRepositoryError::query,
        RegionRepositoryError::connection,
    )
}

#[async_trait]
impl RegionRepository for DieselRegionRepository {
    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RegionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_region_pool_error)?;
        let row: Option<RegionRow> = regions::table
            .filter(regions::id.eq(id.as_uuid()))
            .select(RegionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_region_diesel_error)?;
        row.map(RegionRow::into_domain)
            .transpose()
            .map_err(RegionRepositoryError::corrupt)
    }

    async fn list(&self) -> Result<Vec<Region>, RegionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_region_pool_error)?;
        let rows: Vec<RegionRow> = regions::table
            .select(RegionRow::as_select())
            .order_by(regions::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_region_diesel_error)?;
        rows.into_iter()
            .map(RegionRow::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RegionRepositoryError::corrupt)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping; queries run in integration
    //! environments only.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_restaurant_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, RestaurantRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_row_maps_to_query_error() {
        let err = map_region_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, RegionRepositoryError::Query { .. }));
    }
}
