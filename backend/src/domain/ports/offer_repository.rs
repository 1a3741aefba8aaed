//! Port abstraction for offer persistence.
//!
//! Lookups by day take absolute [`DayBounds`] rather than a calendar date:
//! callers resolve the date in the region's timezone first, so adapters only
//! compare instants.
use async_trait::async_trait;

use crate::domain::{DayBounds, Offer, OfferId, RegionId, RestaurantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by offer repository adapters.
    pub enum OfferRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "offer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "offer repository query failed: {message}",
        /// A stored row could not be turned into an [`Offer`].
        Corrupt { message: String } => "stored offer is invalid: {message}",
    }
}

/// Storage for lunch offers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Fetch an offer by identifier.
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError>;

    /// Offers of one restaurant overlapping `[bounds.start, bounds.end)`,
    /// ordered by start time then title.
    async fn find_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Offers of every restaurant in a region overlapping the bounds, in the
    /// same order as [`Self::find_for_restaurant`].
    async fn find_for_region(
        &self,
        region_id: &RegionId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError>;

    /// Store a new offer.
    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError>;

    /// Replace every field of an existing offer.
    async fn update(&self, offer: &Offer) -> Result<(), OfferRepositoryError>;

    /// Remove an offer. Missing offers are ignored.
    async fn delete(&self, id: &OfferId) -> Result<(), OfferRepositoryError>;
}
