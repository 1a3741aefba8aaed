//! Region catalogue handler.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Region};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Region as returned to clients.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    pub id: String,
    #[schema(example = "Tartu")]
    pub name: String,
    /// IANA timezone used to turn calendar dates into instants.
    #[schema(example = "Europe/Tallinn")]
    pub location: String,
}

impl From<Region> for RegionResponse {
    fn from(region: Region) -> Self {
        Self {
            id: region.id().to_string(),
            name: region.name().to_owned(),
            location: region.location().name().to_owned(),
        }
    }
}

/// List every region ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    responses(
        (status = 200, description = "Regions", body = [RegionResponse]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["regions"],
    operation_id = "listRegions",
    security([])
)]
#[get("/regions")]
pub async fn list_regions(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<RegionResponse>>> {
    let regions = state.regions.list_regions().await?;
    Ok(web::Json(regions.into_iter().map(RegionResponse::from).collect()))
}
