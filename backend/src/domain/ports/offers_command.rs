//! Driving port for offer mutations.
//!
//! Every mutation reconciles the group posts of the dates it touches before
//! returning.

use async_trait::async_trait;

use crate::domain::{Error, Offer, OfferDraft, OfferId, RestaurantId, User};

/// Offer create, update and delete use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OffersCommand: Send + Sync {
    /// Add an offer to a restaurant the user manages.
    async fn create_offer(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        draft: OfferDraft,
    ) -> Result<Offer, Error>;

    /// Replace the fields of an existing offer.
    async fn update_offer(
        &self,
        user: &User,
        offer_id: &OfferId,
        draft: OfferDraft,
    ) -> Result<Offer, Error>;

    /// Remove an offer.
    async fn delete_offer(&self, user: &User, offer_id: &OfferId) -> Result<(), Error>;
}
