//! Offer domain services implementing the offer command and query ports.
//!
//! An offer appears on every calendar date its `[starts_at, ends_at)` window
//! touches, read in the restaurant's region timezone. Mutations are stored first and then the
//! group post of every affected date is reconciled; a reconciliation failure
//! is reported to the caller while the stored offer change stands.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    GroupPostSync, OfferRepository, OffersCommand, OffersQuery, RegionRepository,
    RestaurantRepository,
};
use crate::domain::service_support::{
    day_bounds, load_managed_restaurant, load_region, load_restaurant, map_offer_error,
};
use crate::domain::{
    Error, Offer, OfferDate, OfferDraft, OfferId, Region, RegionId, Restaurant, RestaurantId,
    User,
};

/// Offer service implementing [`OffersCommand`].
#[derive(Clone)]
pub struct OfferCommandService<R: ?Sized, Rg: ?Sized, O: ?Sized> {
    restaurants: Arc<R>,
    regions: Arc<Rg>,
    offers: Arc<O>,
    group_posts: Arc<dyn GroupPostSync>,
}

impl<R: ?Sized, Rg: ?Sized, O: ?Sized> OfferCommandService<R, Rg, O> {
    /// Create the service; `group_posts` reconciles every date a mutation
    /// touches.
    pub fn new(
        restaurants: Arc<R>,
        regions: Arc<Rg>,
        offers: Arc<O>,
        group_posts: Arc<dyn GroupPostSync>,
    ) -> Self {
        Self {
            restaurants,
            regions,
            offers,
            group_posts,
        }
    }
}

impl<R, Rg, O> OfferCommandService<R, Rg, O>
where
    R: RestaurantRepository + ?Sized,
    Rg: RegionRepository + ?Sized,
    O: OfferRepository + ?Sized,
{
    async fn load_offer(&self, offer_id: &OfferId) -> Result<Offer, Error> {
        self.offers
            .find_by_id(offer_id)
            .await
            .map_err(map_offer_error)?
            .ok_or_else(|| Error::not_found(format!("offer {offer_id} not found")))
    }

    async fn load_context(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
    ) -> Result<(Restaurant, Region), Error> {
        let restaurant =
            load_managed_restaurant(self.restaurants.as_ref(), user, restaurant_id).await?;
        let region = load_region(self.regions.as_ref(), &restaurant.region_id).await?;
        Ok((restaurant, region))
    }

    async fn reconcile(
        &self,
        dates: &[OfferDate],
        user: &User,
        restaurant: &Restaurant,
    ) -> Result<(), Error> {
        for date in dates {
            debug!(restaurant_id = %restaurant.id, %date, "reconciling group post");
            self.group_posts
                .update_for_date(date, user, restaurant)
                .await?;
        }
        Ok(())
    }
}

fn offer_dates(offer: &Offer, region: &Region) -> Vec<OfferDate> {
    OfferDate::spanning(offer.starts_at, offer.ends_at, region.location())
}

/// Dates touched by replacing `before` with `after`, old dates first and
/// without repeats.
fn affected_dates(before: &Offer, after: &Offer, region: &Region) -> Vec<OfferDate> {
    let mut dates = offer_dates(before, region);
    for date in offer_dates(after, region) {
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

#[async_trait]
impl<R, Rg, O> OffersCommand for OfferCommandService<R, Rg, O>
where
    R: RestaurantRepository + ?Sized,
    Rg: RegionRepository + ?Sized,
    O: OfferRepository + ?Sized,
{
    async fn create_offer(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        draft: OfferDraft,
    ) -> Result<Offer, Error> {
        let (restaurant, region) = self.load_context(user, restaurant_id).await?;
        let offer = draft.into_offer(OfferId::random(), restaurant.id);
        self.offers
            .insert(&offer)
            .await
            .map_err(map_offer_error)?;

        self.reconcile(&offer_dates(&offer, &region), user, &restaurant)
            .await?;
        Ok(offer)
    }

    async fn update_offer(
        &self,
        user: &User,
        offer_id: &OfferId,
        draft: OfferDraft,
    ) -> Result<Offer, Error> {
        let existing = self.load_offer(offer_id).await?;
        let (restaurant, region) = self.load_context(user, &existing.restaurant_id).await?;
        let updated = draft.into_offer(existing.id, existing.restaurant_id);
        self.offers
            .update(&updated)
            .await
            .map_err(map_offer_error)?;

        let dates = affected_dates(&existing, &updated, &region);
        self.reconcile(&dates, user, &restaurant).await?;
        Ok(updated)
    }

    async fn delete_offer(&self, user: &User, offer_id: &OfferId) -> Result<(), Error> {
        let existing = self.load_offer(offer_id).await?;
        let (restaurant, region) = self.load_context(user, &existing.restaurant_id).await?;
        self.offers
            .delete(&existing.id)
            .await
            .map_err(map_offer_error)?;

        self.reconcile(&offer_dates(&existing, &region), user, &restaurant)
            .await
    }
}

/// Offer service implementing [`OffersQuery`].
#[derive(Clone)]
pub struct OfferQueryService<R: ?Sized, Rg: ?Sized, O: ?Sized> {
    restaurants: Arc<R>,
    regions: Arc<Rg>,
    offers: Arc<O>,
}

impl<R: ?Sized, Rg: ?Sized, O: ?Sized> OfferQueryService<R, Rg, O> {
    /// Create the query service.
    pub fn new(restaurants: Arc<R>, regions: Arc<Rg>, offers: Arc<O>) -> Self {
        Self {
            restaurants,
            regions,
            offers,
        }
    }
}

#[async_trait]
impl<R, Rg, O> OffersQuery for OfferQueryService<R, Rg, O>
where
    R: RestaurantRepository + ?Sized,
    Rg: RegionRepository + ?Sized,
    O: OfferRepository + ?Sized,
{
    async fn offers_for_region(
        &self,
        region_id: &RegionId,
        date: &OfferDate,
    ) -> Result<Vec<Offer>, Error> {
        let region = load_region(self.regions.as_ref(), region_id).await?;
        let bounds = day_bounds(&region, date)?;
        self.offers
            .find_for_region(region.id(), &bounds)
            .await
            .map_err(map_offer_error)
    }

    async fn offers_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<Vec<Offer>, Error> {
        let restaurant = load_restaurant(self.restaurants.as_ref(), restaurant_id).await?;
        let region = load_region(self.regions.as_ref(), &restaurant.region_id).await?;
        let bounds = day_bounds(&region, date)?;
        self.offers
            .find_for_restaurant(&restaurant.id, &bounds)
            .await
            .map_err(map_offer_error)
    }
}

#[cfg(test)]
#[path = "offer_service_tests.rs"]
mod tests;
