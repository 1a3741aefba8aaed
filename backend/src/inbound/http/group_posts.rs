//! Group post handlers.
//!
//! ```text
//! GET /api/v1/restaurants/{restaurantId}/group-posts/2024-06-03
//! PUT /api/v1/restaurants/{restaurantId}/group-posts/2024-06-03 {"messageTemplate":"Today's specials:"}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, OfferDate, OfferGroupPost, RestaurantId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, parse_id};

/// New heading for the day's post.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupPostUpdateRequest {
    #[schema(example = "Today's specials:")]
    pub message_template: String,
}

/// Group post as returned to clients.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupPostResponse {
    pub id: String,
    pub restaurant_id: String,
    #[schema(example = "2024-06-03")]
    pub date: String,
    pub message_template: String,
    /// Id of the live Facebook post, absent when nothing is published.
    pub facebook_post_id: Option<String>,
}

impl From<OfferGroupPost> for GroupPostResponse {
    fn from(post: OfferGroupPost) -> Self {
        Self {
            id: post.id.to_string(),
            restaurant_id: post.restaurant_id.to_string(),
            date: post.date.to_string(),
            message_template: post.message_template,
            facebook_post_id: post.facebook_post_id.map(|id| id.as_str().to_owned()),
        }
    }
}

fn parse_path(path: &(String, String)) -> ApiResult<(RestaurantId, OfferDate)> {
    let (restaurant_id, date) = path;
    let restaurant_id = parse_id(restaurant_id, FieldName::new("restaurantId"), RestaurantId::new)?;
    let date = parse_date(date, FieldName::new("date"))?;
    Ok((restaurant_id, date))
}

/// Fetch the day's group post, creating an unpublished one from the
/// restaurant's default template when missing.
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/{restaurant_id}/group-posts/{date}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant identifier"),
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Group post", body = GroupPostResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Restaurant not managed by the user", body = Error),
        (status = 404, description = "Unknown restaurant", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["group-posts"],
    operation_id = "getGroupPost"
)]
#[get("/restaurants/{restaurant_id}/group-posts/{date}")]
pub async fn get_group_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<GroupPostResponse>> {
    let (restaurant_id, date) = parse_path(&path)?;
    let user = require_user(&state, &session).await?;
    let post = state
        .group_posts
        .group_post(&user, &restaurant_id, &date)
        .await?;
    Ok(web::Json(post.into()))
}

/// Change the heading and republish the day's post.
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{restaurant_id}/group-posts/{date}",
    params(
        ("restaurant_id" = String, Path, description = "Restaurant identifier"),
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD")
    ),
    request_body = GroupPostUpdateRequest,
    responses(
        (status = 200, description = "Group post updated", body = GroupPostResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Restaurant not managed by the user", body = Error),
        (status = 404, description = "Unknown restaurant", body = Error),
        (status = 502, description = "Facebook rejected the post", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["group-posts"],
    operation_id = "updateGroupPost"
)]
#[put("/restaurants/{restaurant_id}/group-posts/{date}")]
pub async fn update_group_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<GroupPostUpdateRequest>,
) -> ApiResult<web::Json<GroupPostResponse>> {
    let (restaurant_id, date) = parse_path(&path)?;
    let user = require_user(&state, &session).await?;
    let post = state
        .group_posts
        .update_message_template(
            &user,
            &restaurant_id,
            &date,
            payload.into_inner().message_template,
        )
        .await?;
    Ok(web::Json(post.into()))
}
