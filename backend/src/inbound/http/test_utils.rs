//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test};
use std::sync::Arc;

use crate::domain::ports::{
    MockGroupPostsCommand, MockLoginService, MockOffersCommand, MockOffersQuery,
    MockRegionsQuery,
};
use crate::domain::{FacebookUserId, RestaurantId, SessionId, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Cookie name used by the session middleware.
pub const SESSION_COOKIE: &str = "session";

/// Session middleware with a fresh key and the `Secure` flag off, so cookies
/// survive plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// Mock driving ports; set expectations, then turn them into [`HttpState`].
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub offers: MockOffersCommand,
    pub offers_query: MockOffersQuery,
    pub regions: MockRegionsQuery,
    pub group_posts: MockGroupPostsCommand,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            login: Arc::new(self.login),
            offers: Arc::new(self.offers),
            offers_query: Arc::new(self.offers_query),
            regions: Arc::new(self.regions),
            group_posts: Arc::new(self.group_posts),
        }
    }
}

/// Staff member managing `restaurant_ids`, without a stored session.
pub fn fixture_user(restaurant_ids: Vec<RestaurantId>) -> User {
    User {
        id: UserId::random(),
        facebook_user_id: FacebookUserId::new("1001").expect("facebook user id"),
        restaurant_ids,
        session: None,
    }
}

/// Session id used by handler tests.
pub fn fixture_session_id() -> SessionId {
    SessionId::new("5e55101d").expect("session id")
}

/// Route path of [`seed_session`].
pub const SEED_SESSION_PATH: &str = "/test/seed-session";

/// Handler that logs the caller in as [`fixture_session_id`]; mount it at
/// [`SEED_SESSION_PATH`] and reuse the returned cookie.
pub async fn seed_session(session: SessionContext) -> ApiResult<HttpResponse> {
    session.persist_session(&fixture_session_id())?;
    Ok(HttpResponse::Ok().finish())
}

/// Fetch a logged-in session cookie from an app that mounts [`seed_session`].
pub async fn logged_in_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::get().uri(SEED_SESSION_PATH).to_request(),
    )
    .await;
    session_cookie(&res).expect("seeded session cookie")
}
