//! Builds the HTTP state from the PostgreSQL and Graph API adapters.

use std::sync::Arc;

use mockable::DefaultClock;

use backend::domain::CurrencySymbol;
use backend::inbound::http::state::{HttpState, StatePorts};
use backend::outbound::facebook::FacebookAuthenticator;
use backend::outbound::persistence::{
    DbPool, DieselGroupPostRepository, DieselOfferRepository, DieselRegionRepository,
    DieselRestaurantRepository, DieselUserRepository,
};

/// Compose the production services over one shared pool.
pub(crate) fn build_http_state(
    pool: &DbPool,
    authenticator: FacebookAuthenticator,
    currency: CurrencySymbol,
) -> HttpState {
    HttpState::from_ports(StatePorts {
        authenticator: Arc::new(authenticator),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        restaurants: Arc::new(DieselRestaurantRepository::new(pool.clone())),
        regions: Arc::new(DieselRegionRepository::new(pool.clone())),
        offers: Arc::new(DieselOfferRepository::new(pool.clone())),
        group_posts: Arc::new(DieselGroupPostRepository::new(pool.clone())),
        currency,
        clock: Arc::new(DefaultClock),
    })
}
