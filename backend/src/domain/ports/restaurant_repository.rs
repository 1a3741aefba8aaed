//! Port abstraction for restaurant lookups.
use async_trait::async_trait;

use crate::domain::{PageId, Restaurant, RestaurantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by restaurant repository adapters.
    pub enum RestaurantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "restaurant repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "restaurant repository query failed: {message}",
    }
}

/// Read access to restaurants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    /// Fetch a restaurant by identifier.
    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError>;

    /// Fetch every restaurant connected to one of `page_ids` in a single
    /// query.
    async fn find_by_page_ids(
        &self,
        page_ids: &[PageId],
    ) -> Result<Vec<Restaurant>, RestaurantRepositoryError>;
}
