//! Driving port that keeps the external group post in line with offers.

use async_trait::async_trait;

use crate::domain::{Error, OfferDate, OfferGroupPost, Restaurant, User};

/// Reconciles a restaurant's published post for one date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupPostSync: Send + Sync {
    /// Replace the external post of `post` with one listing the current
    /// offers, returning the record as stored afterwards.
    async fn update(
        &self,
        post: OfferGroupPost,
        user: &User,
        restaurant: &Restaurant,
    ) -> Result<OfferGroupPost, Error>;

    /// Fetch or create the post for `date`, then [`Self::update`] it.
    async fn update_for_date(
        &self,
        date: &OfferDate,
        user: &User,
        restaurant: &Restaurant,
    ) -> Result<OfferGroupPost, Error>;
}
