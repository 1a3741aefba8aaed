//! Port abstraction for group post persistence.
use async_trait::async_trait;

use crate::domain::{OfferDate, OfferGroupPost, RestaurantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group post repository adapters.
    pub enum GroupPostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "group post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group post repository query failed: {message}",
        /// A post for the same restaurant and date already exists.
        Duplicate { restaurant_id: RestaurantId, date: OfferDate } =>
            "group post for restaurant {restaurant_id} on {date} already exists",
        /// A stored row could not be turned into an [`OfferGroupPost`].
        Corrupt { message: String } => "stored group post is invalid: {message}",
    }
}

/// Storage for per-day group posts. At most one post exists per
/// `(restaurant, date)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupPostRepository: Send + Sync {
    /// Fetch the post of `restaurant_id` for `date`.
    async fn find_by_date_and_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<Option<OfferGroupPost>, GroupPostRepositoryError>;

    /// Store a new post; fails with
    /// [`GroupPostRepositoryError::Duplicate`] when one already exists for
    /// the same restaurant and date.
    async fn insert(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError>;

    /// Replace every field of the post with the same id.
    async fn update(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError>;
}
