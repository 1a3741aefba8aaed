//! Port abstraction for region lookups.
use async_trait::async_trait;

use crate::domain::{Region, RegionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by region repository adapters.
    pub enum RegionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "region repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "region repository query failed: {message}",
        /// A stored row could not be turned into a [`Region`].
        Corrupt { message: String } => "stored region is invalid: {message}",
    }
}

/// Read access to regions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegionRepository: Send + Sync {
    /// Fetch a region by identifier.
    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RegionRepositoryError>;

    /// All regions ordered by name.
    async fn list(&self) -> Result<Vec<Region>, RegionRepositoryError>;
}
