//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` so they only depend on driving ports
//! and stay testable without I/O. [`HttpState::from_ports`] composes the
//! domain services from a set of driven adapters; the binary feeds it Diesel
//! and Graph API adapters, integration tests feed it in-memory ones.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    Authenticator, GroupPostRepository, GroupPostSync, GroupPostsCommand, LoginService,
    OfferRepository, OffersCommand, OffersQuery, PageTokenPropagation, RegionRepository,
    RegionsQuery, RestaurantRepository, UserRepository,
};
use crate::domain::{
    CurrencySymbol, GroupPostReconciler, GroupPostService, OfferCommandService,
    OfferQueryService, ProviderLoginService, RegionService, TokenPropagationService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub offers: Arc<dyn OffersCommand>,
    pub offers_query: Arc<dyn OffersQuery>,
    pub regions: Arc<dyn RegionsQuery>,
    pub group_posts: Arc<dyn GroupPostsCommand>,
}

/// Driven adapters the HTTP use-cases are built from.
#[derive(Clone)]
pub struct StatePorts {
    pub authenticator: Arc<dyn Authenticator>,
    pub users: Arc<dyn UserRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub regions: Arc<dyn RegionRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub group_posts: Arc<dyn GroupPostRepository>,
    /// Symbol appended to prices in group post messages.
    pub currency: CurrencySymbol,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire every domain service over the given adapters.
    ///
    /// One reconciler instance is shared by the offer and group post
    /// services so both republish through the same pipeline.
    pub fn from_ports(ports: StatePorts) -> Self {
        let StatePorts {
            authenticator,
            users,
            restaurants,
            regions,
            offers,
            group_posts,
            currency,
            clock,
        } = ports;

        let propagation: Arc<dyn PageTokenPropagation> = Arc::new(TokenPropagationService::new(
            authenticator.clone(),
            restaurants.clone(),
            users.clone(),
        ));
        let sync: Arc<dyn GroupPostSync> = Arc::new(GroupPostReconciler::new(
            authenticator.clone(),
            regions.clone(),
            offers.clone(),
            group_posts.clone(),
            currency,
        ));

        Self {
            login: Arc::new(ProviderLoginService::new(
                authenticator,
                users,
                propagation,
                clock,
            )),
            offers: Arc::new(OfferCommandService::new(
                restaurants.clone(),
                regions.clone(),
                offers.clone(),
                sync.clone(),
            )),
            offers_query: Arc::new(OfferQueryService::new(
                restaurants.clone(),
                regions.clone(),
                offers,
            )),
            regions: Arc::new(RegionService::new(regions)),
            group_posts: Arc::new(GroupPostService::new(restaurants, group_posts, sync)),
        }
    }
}
