//! Error mapping and lookups shared by the lunch domain services.
//!
//! Every local storage failure surfaces as an internal error; only lookups
//! that found nothing become `not_found`.

use crate::domain::ports::{
    GroupPostRepositoryError, OfferRepositoryError, RegionRepository, RegionRepositoryError,
    RestaurantRepository, RestaurantRepositoryError, UserPersistenceError,
};
use crate::domain::{DayBounds, Error, OfferDate, Region, RegionId, Restaurant, RestaurantId, User};

pub(crate) fn map_restaurant_error(error: RestaurantRepositoryError) -> Error {
    Error::internal(format!("restaurant lookup failed: {error}"))
}

pub(crate) fn map_region_error(error: RegionRepositoryError) -> Error {
    Error::internal(format!("region lookup failed: {error}"))
}

pub(crate) fn map_offer_error(error: OfferRepositoryError) -> Error {
    Error::internal(format!("offer storage failed: {error}"))
}

pub(crate) fn map_group_post_error(error: GroupPostRepositoryError) -> Error {
    Error::internal(format!("group post storage failed: {error}"))
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    Error::internal(format!("user storage failed: {error}"))
}

/// Load a restaurant, failing with `not_found` when it does not exist.
pub(crate) async fn load_restaurant<R>(repo: &R, id: &RestaurantId) -> Result<Restaurant, Error>
where
    R: RestaurantRepository + ?Sized,
{
    repo.find_by_id(id)
        .await
        .map_err(map_restaurant_error)?
        .ok_or_else(|| Error::not_found(format!("restaurant {id} not found")))
}

/// Load a restaurant `user` manages.
///
/// Ownership is checked before the lookup so callers cannot probe which
/// restaurant ids exist.
pub(crate) async fn load_managed_restaurant<R>(
    repo: &R,
    user: &User,
    id: &RestaurantId,
) -> Result<Restaurant, Error>
where
    R: RestaurantRepository + ?Sized,
{
    if !user.manages(id) {
        return Err(Error::forbidden(format!(
            "user is not allowed to manage restaurant {id}"
        )));
    }
    load_restaurant(repo, id).await
}

/// Load a region, failing with `not_found` when it does not exist.
pub(crate) async fn load_region<R>(repo: &R, id: &RegionId) -> Result<Region, Error>
where
    R: RegionRepository + ?Sized,
{
    repo.find_by_id(id)
        .await
        .map_err(map_region_error)?
        .ok_or_else(|| Error::not_found(format!("region {id} not found")))
}

/// Absolute bounds of `date` in the region's timezone.
pub(crate) fn day_bounds(region: &Region, date: &OfferDate) -> Result<DayBounds, Error> {
    date.bounds(region.location())
        .map_err(|err| Error::invalid_request(err.to_string()))
}
