//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities and the use-case services
//! behind the lunch offer API. Infrastructure is reached only through the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifiers.
//! - User, Restaurant, Region, Offer, OfferGroupPost: aggregates.
//! - OfferDate / DayBounds: calendar dates and their region-local bounds.
//! - TokenPropagationService, GroupPostReconciler: page token refresh and
//!   group post reconciliation.
//! - OfferCommandService, OfferQueryService, GroupPostService, RegionService,
//!   ProviderLoginService: driving port implementations.

pub mod error;
pub mod facebook;
pub mod group_post;
pub mod group_post_message;
pub mod group_post_reconciler;
pub mod group_post_service;
pub mod ids;
pub mod login_service;
pub mod offer;
pub mod offer_date;
pub mod offer_service;
pub mod ports;
pub mod region;
pub mod region_service;
pub mod registration_token;
pub mod restaurant;
mod secure_random;
mod service_support;
pub mod token_propagation_service;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::facebook::{
    AccessGrant, AccessToken, FacebookIdValidationError, FacebookUserId, ManagedPage, PageId,
    PostId,
};
pub use self::group_post::OfferGroupPost;
pub use self::group_post_message::{
    CurrencySymbol, DEFAULT_CURRENCY_SYMBOL, compose_group_post_message,
};
pub use self::group_post_reconciler::GroupPostReconciler;
pub use self::group_post_service::GroupPostService;
pub use self::ids::{
    GroupPostId, IdValidationError, OfferId, RegionId, RegistrationTokenId, RestaurantId, UserId,
};
pub use self::login_service::ProviderLoginService;
pub use self::offer::{Offer, OfferDraft, OfferValidationError, Price};
pub use self::offer_date::{DayBounds, OfferDate, OfferDateValidationError};
pub use self::offer_service::{OfferCommandService, OfferQueryService};
pub use self::region::{Region, RegionValidationError};
pub use self::region_service::RegionService;
pub use self::registration_token::{
    REGISTRATION_TOKEN_TTL_DAYS, RegistrationAccessToken, registration_token_ttl,
};
pub use self::restaurant::Restaurant;
pub use self::token_propagation_service::TokenPropagationService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{PageTokens, SessionId, SessionIdValidationError, User, UserSession};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
