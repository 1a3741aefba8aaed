//! Driving port for region listings.

use async_trait::async_trait;

use crate::domain::{Error, Region};

/// Region catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegionsQuery: Send + Sync {
    /// Every region ordered by name.
    async fn list_regions(&self) -> Result<Vec<Region>, Error>;
}
