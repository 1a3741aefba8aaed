//! Driving port for offer listings.

use async_trait::async_trait;

use crate::domain::{Error, Offer, OfferDate, RegionId, RestaurantId};

/// Read-only offer listings for one calendar date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OffersQuery: Send + Sync {
    /// Offers of every restaurant in the region on `date`.
    async fn offers_for_region(
        &self,
        region_id: &RegionId,
        date: &OfferDate,
    ) -> Result<Vec<Offer>, Error>;

    /// Offers of one restaurant on `date`.
    async fn offers_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<Vec<Offer>, Error>;
}
