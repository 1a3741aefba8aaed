//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the authenticator and the publishing client)
//! describe what the domain needs from infrastructure. Driving ports are the
//! use-cases inbound adapters call. Every trait gets a `mockall` double in
//! unit tests.

mod macros;
pub(crate) use macros::define_port_error;

mod authenticator;
mod group_post_repository;
mod group_post_sync;
mod group_posts_command;
mod login_service;
mod offer_repository;
mod offers_command;
mod offers_query;
mod page_token_propagation;
mod publishing_client;
mod region_repository;
mod regions_query;
mod registration_token_repository;
mod restaurant_repository;
mod user_repository;

#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::{
    Authenticator, AuthenticatorError, CodeExchangeRequest, validate_callback,
};
#[cfg(test)]
pub use group_post_repository::MockGroupPostRepository;
pub use group_post_repository::{GroupPostRepository, GroupPostRepositoryError};
#[cfg(test)]
pub use group_post_sync::MockGroupPostSync;
pub use group_post_sync::GroupPostSync;
#[cfg(test)]
pub use group_posts_command::MockGroupPostsCommand;
pub use group_posts_command::GroupPostsCommand;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginRedirect, LoginService};
#[cfg(test)]
pub use offer_repository::MockOfferRepository;
pub use offer_repository::{OfferRepository, OfferRepositoryError};
#[cfg(test)]
pub use offers_command::MockOffersCommand;
pub use offers_command::OffersCommand;
#[cfg(test)]
pub use offers_query::MockOffersQuery;
pub use offers_query::OffersQuery;
#[cfg(test)]
pub use page_token_propagation::MockPageTokenPropagation;
pub use page_token_propagation::PageTokenPropagation;
#[cfg(test)]
pub use publishing_client::MockPublishingClient;
pub use publishing_client::{PublishingClient, PublishingClientError};
#[cfg(test)]
pub use region_repository::MockRegionRepository;
pub use region_repository::{RegionRepository, RegionRepositoryError};
#[cfg(test)]
pub use regions_query::MockRegionsQuery;
pub use regions_query::RegionsQuery;
#[cfg(test)]
pub use registration_token_repository::MockRegistrationTokenRepository;
pub use registration_token_repository::{
    RegistrationTokenRepository, RegistrationTokenRepositoryError,
};
#[cfg(test)]
pub use restaurant_repository::MockRestaurantRepository;
pub use restaurant_repository::{RestaurantRepository, RestaurantRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
