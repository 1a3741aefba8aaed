//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the wire
//! schemas they exchange and the session cookie security scheme. The
//! document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::group_posts::{GroupPostResponse, GroupPostUpdateRequest};
use crate::inbound::http::offers::{OfferRequest, OfferResponse};
use crate::inbound::http::regions::RegionResponse;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by GET /api/v1/login/facebook/callback.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lunch offers API",
        description = "Restaurant lunch offers with Facebook login and page publishing."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::login::login_facebook,
        crate::inbound::http::login::login_facebook_callback,
        crate::inbound::http::login::logout,
        crate::inbound::http::regions::list_regions,
        crate::inbound::http::offers::list_region_offers,
        crate::inbound::http::offers::list_restaurant_offers,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::update_offer,
        crate::inbound::http::offers::delete_offer,
        crate::inbound::http::group_posts::get_group_post,
        crate::inbound::http::group_posts::update_group_post,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        OfferRequest,
        OfferResponse,
        GroupPostUpdateRequest,
        GroupPostResponse,
        RegionResponse,
        Error,
        ErrorCode
    )),
    tags(
        (name = "auth", description = "Facebook login and session lifecycle"),
        (name = "offers", description = "Daily lunch offers"),
        (name = "group-posts", description = "Per-day summary posts on restaurant pages"),
        (name = "regions", description = "Regions and their time zones"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
