//! Region listing service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{RegionRepository, RegionsQuery};
use crate::domain::service_support::map_region_error;
use crate::domain::{Error, Region};

/// Service implementing [`RegionsQuery`] over a [`RegionRepository`].
#[derive(Clone)]
pub struct RegionService<Rg: ?Sized> {
    regions: Arc<Rg>,
}

impl<Rg: ?Sized> RegionService<Rg> {
    /// Create the service.
    pub fn new(regions: Arc<Rg>) -> Self {
        Self { regions }
    }
}

#[async_trait]
impl<Rg> RegionsQuery for RegionService<Rg>
where
    Rg: RegionRepository + ?Sized,
{
    async fn list_regions(&self) -> Result<Vec<Region>, Error> {
        self.regions.list().await.map_err(map_region_error)
    }
}
