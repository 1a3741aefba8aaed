//! Aggregated per-day social post of one restaurant.

use serde::Serialize;

use super::facebook::PostId;
use super::ids::{GroupPostId, RestaurantId};
use super::offer_date::OfferDate;

/// Local record of the single external post listing a restaurant's offers
/// for one date.
///
/// `facebook_post_id` is `None` when nothing was published yet, or when the
/// previous post was deleted and no replacement has been published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferGroupPost {
    /// Stable identifier.
    pub id: GroupPostId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Calendar date the post covers.
    pub date: OfferDate,
    /// Heading placed above the offer lines.
    pub message_template: String,
    /// External post currently live on the restaurant's page.
    pub facebook_post_id: Option<PostId>,
}

impl OfferGroupPost {
    /// Fresh, unpublished post for `(restaurant_id, date)`.
    pub fn new(
        restaurant_id: RestaurantId,
        date: OfferDate,
        message_template: impl Into<String>,
    ) -> Self {
        Self {
            id: GroupPostId::random(),
            restaurant_id,
            date,
            message_template: message_template.into(),
            facebook_post_id: None,
        }
    }
}
