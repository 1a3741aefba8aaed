//! Offer listing and editing handlers.
//!
//! ```text
//! GET    /api/v1/regions/{regionId}/offers?date=2024-06-03
//! GET    /api/v1/restaurants/{restaurantId}/offers?date=2024-06-03
//! POST   /api/v1/restaurants/{restaurantId}/offers
//! PUT    /api/v1/offers/{offerId}
//! DELETE /api/v1/offers/{offerId}
//! ```
//!
//! Listings are public. Mutations require a session for a user linked to the
//! restaurant and reconcile the group post of every date they touch before
//! responding.

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Offer, OfferDraft, OfferId, Price, RegionId, RestaurantId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, offer_validation_error, parse_id, parse_required_date, parse_rfc3339_timestamp,
};

/// `?date=YYYY-MM-DD` filter shared by the listings.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: Option<String>,
}

/// Offer fields supplied by restaurant staff.
///
/// Example JSON:
/// `{"title":"Soup","price":"3.50","startsAt":"2024-06-03T09:00:00Z","endsAt":"2024-06-03T12:00:00Z"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Non-negative amount with at most two decimals.
    #[schema(value_type = String, example = "3.50")]
    pub price: Decimal,
    /// RFC 3339 start instant.
    #[schema(example = "2024-06-03T09:00:00Z")]
    pub starts_at: String,
    /// RFC 3339 end instant; must be after `startsAt`.
    #[schema(example = "2024-06-03T12:00:00Z")]
    pub ends_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<OfferRequest> for OfferDraft {
    type Error = Error;

    fn try_from(value: OfferRequest) -> Result<Self, Self::Error> {
        let price = Price::new(value.price).map_err(offer_validation_error)?;
        let starts_at = parse_rfc3339_timestamp(&value.starts_at, FieldName::new("startsAt"))?;
        let ends_at = parse_rfc3339_timestamp(&value.ends_at, FieldName::new("endsAt"))?;
        OfferDraft::new(
            &value.title,
            &value.description,
            price,
            starts_at,
            ends_at,
            value.tags,
        )
        .map_err(offer_validation_error)
    }
}

/// Offer as returned to clients.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub restaurant_id: String,
    pub title: String,
    pub description: String,
    /// Price with exactly two decimals.
    #[schema(example = "3.50")]
    pub price: String,
    pub starts_at: String,
    pub ends_at: String,
    pub tags: Vec<String>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id.to_string(),
            restaurant_id: offer.restaurant_id.to_string(),
            title: offer.title,
            description: offer.description,
            price: offer.price.to_two_decimals(),
            starts_at: offer.starts_at.to_rfc3339(),
            ends_at: offer.ends_at.to_rfc3339(),
            tags: offer.tags,
        }
    }
}

fn into_responses(offers: Vec<Offer>) -> Vec<OfferResponse> {
    offers.into_iter().map(OfferResponse::from).collect()
}

fn restaurant_id(raw: &str) -> ApiResult<RestaurantId> {
    parse_id(raw, FieldName::new("restaurantId"), RestaurantId::new)
}

fn offer_id(raw: &str) -> ApiResult<OfferId> {
    parse_id(raw, FieldName::new("offerId"), OfferId::new)
}

/// Offers of every restaurant in a region on one date.
#[utoipa::path(
    get,
    path = "/api/v1/regions/{region_id}/offers",
    params(
        ("region_id" = String, Path, description = "Region identifier"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Offers", body = [OfferResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown region", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listRegionOffers",
    security([])
)]
#[get("/regions/{region_id}/offers")]
pub async fn list_region_offers(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> ApiResult<web::Json<Vec<OfferResponse>>> {
    let region_id = parse_id(&path, FieldName::new("regionId"), RegionId::new)?;
    let date = parse_required_date(query.date.as_deref(), FieldName::new("date"))?;
    let offers = state.offers_query.offers_for_region(&region_id, &date).await?;
    Ok(web::Json(into_responses(offers)))
}

/// Offers of one restaurant on one date.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/offers",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant identifier"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Offers", body = [OfferResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown restaurant", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listRestaurantOffers",
    security([])
)]
#[get("/restaurants/{restaurant_id}/offers")]
pub async fn list_restaurant_offers(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<DateQuery>,
) -> ApiResult<web::Json<Vec<OfferResponse>>> {
    let restaurant_id = restaurant_id(&path)?;
    let date = parse_required_date(query.date.as_deref(), FieldName::new("date"))?;
    let offers = state
        .offers_query
        .offers_for_restaurant(&restaurant_id, &date)
        .await?;
    Ok(web::Json(into_responses(offers)))
}

/// Create an offer and republish the group post of its date.
#[utoipa::path(
    post,
    path = "/api/v1/restaurants/{restaurant_id}/offers",
    params(("restaurant_id" = String, Path, description = "Restaurant identifier")),
    request_body = OfferRequest,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Restaurant not managed by the user", body = Error),
        (status = 404, description = "Unknown restaurant", body = Error),
        (status = 502, description = "Facebook rejected the post", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["offers"],
    operation_id = "createOffer"
)]
#[post("/restaurants/{restaurant_id}/offers")]
pub async fn create_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OfferRequest>,
) -> ApiResult<HttpResponse> {
    let restaurant_id = restaurant_id(&path)?;
    let draft = OfferDraft::try_from(payload.into_inner())?;
    let user = require_user(&state, &session).await?;
    let offer = state
        .offers
        .create_offer(&user, &restaurant_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(OfferResponse::from(offer)))
}

/// Replace an offer and republish the group posts of its old and new dates.
#[utoipa::path(
    put,
    path = "/api/v1/offers/{offer_id}",
    params(("offer_id" = String, Path, description = "Offer identifier")),
    request_body = OfferRequest,
    responses(
        (status = 200, description = "Offer updated", body = OfferResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Restaurant not managed by the user", body = Error),
        (status = 404, description = "Unknown offer", body = Error),
        (status = 502, description = "Facebook rejected the post", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["offers"],
    operation_id = "updateOffer"
)]
#[put("/offers/{offer_id}")]
pub async fn update_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OfferRequest>,
) -> ApiResult<web::Json<OfferResponse>> {
    let offer_id = offer_id(&path)?;
    let draft = OfferDraft::try_from(payload.into_inner())?;
    let user = require_user(&state, &session).await?;
    let offer = state.offers.update_offer(&user, &offer_id, draft).await?;
    Ok(web::Json(OfferResponse::from(offer)))
}

/// Delete an offer and republish, or remove, the group post of its date.
#[utoipa::path(
    delete,
    path = "/api/v1/offers/{offer_id}",
    params(("offer_id" = String, Path, description = "Offer identifier")),
    responses(
        (status = 204, description = "Offer deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Restaurant not managed by the user", body = Error),
        (status = 404, description = "Unknown offer", body = Error),
        (status = 502, description = "Facebook rejected the change", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["offers"],
    operation_id = "deleteOffer"
)]
#[delete("/offers/{offer_id}")]
pub async fn delete_offer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let offer_id = offer_id(&path)?;
    let user = require_user(&state, &session).await?;
    state.offers.delete_offer(&user, &offer_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
