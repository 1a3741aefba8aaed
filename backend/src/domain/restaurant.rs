//! Restaurant data model.

use super::facebook::PageId;
use super::ids::{RegionId, RestaurantId};

/// A restaurant listed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
    /// Stable identifier.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Region the restaurant belongs to.
    pub region_id: RegionId,
    /// Facebook page group posts are published to; `None` when the
    /// restaurant is not connected to a page.
    pub page_id: Option<PageId>,
    /// Message template used for newly created group posts.
    pub default_group_post_message_template: String,
}
