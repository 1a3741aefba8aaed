//! Driving port for group post records managed by restaurant staff.

use async_trait::async_trait;

use crate::domain::{Error, OfferDate, OfferGroupPost, RestaurantId, User};

/// Group post use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupPostsCommand: Send + Sync {
    /// Fetch the post of `restaurant_id` for `date`, creating it from the
    /// restaurant's default template when missing.
    async fn group_post(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<OfferGroupPost, Error>;

    /// Change the post's template and republish it.
    async fn update_message_template(
        &self,
        user: &User,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
        message_template: String,
    ) -> Result<OfferGroupPost, Error>;
}
