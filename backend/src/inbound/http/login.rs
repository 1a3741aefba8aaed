//! Facebook login and logout handlers.
//!
//! ```text
//! GET  /api/v1/login/facebook
//! GET  /api/v1/login/facebook/callback?state=...&code=...
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, get, http::header, post, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::Error;
use crate::domain::ports::CodeExchangeRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Landing page after a successful login.
const POST_LOGIN_LOCATION: &str = "/";

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// CSRF state echoed by the provider.
    pub state: Option<String>,
    /// Authorisation code to exchange.
    pub code: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Start the provider login: remember a fresh state and redirect.
#[utoipa::path(
    get,
    path = "/api/v1/login/facebook",
    responses(
        (status = 302, description = "Redirect to the Facebook login dialog"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "loginFacebook",
    security([])
)]
#[get("/login/facebook")]
pub async fn login_facebook(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let login = state.login.begin_login();
    session.store_oauth_state(&login.state)?;
    Ok(redirect(login.url.as_str()))
}

/// Finish the provider login and start a session.
#[utoipa::path(
    get,
    path = "/api/v1/login/facebook/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Logged in; redirect to the app", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing authorisation code", body = Error),
        (status = 401, description = "Invalid state or unknown user", body = Error),
        (status = 403, description = "Page access denied", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "loginFacebookCallback",
    security([])
)]
#[get("/login/facebook/callback")]
pub async fn login_facebook_callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let CallbackQuery {
        state: returned_state,
        code,
    } = query.into_inner();
    let request = CodeExchangeRequest {
        expected_state: session.take_oauth_state()?,
        state: returned_state,
        code,
    };
    let session_id = state.login.complete_login(&request).await?;
    session.persist_session(&session_id)?;
    info!("login completed");
    Ok(redirect(POST_LOGIN_LOCATION))
}

/// End the current session. Succeeds even without one.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(session_id) = session.session_id()? {
        state.login.logout(&session_id).await?;
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
