//! Shared harness for HTTP flow tests over the in-memory backend.
//!
//! The app is assembled the same way the server does it: cookie sessions,
//! the `Trace` middleware and every `/api/v1` handler. The session cookie is
//! not marked `Secure` so it survives plain test requests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use url::Url;

/// Cookie name used by the session middleware.
pub const SESSION_COOKIE: &str = "session";

pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Build an initialised test service exposing the full API over `$state`.
macro_rules! lunch_app {
    ($state:expr) => {{
        use backend::inbound::http::group_posts::{get_group_post, update_group_post};
        use backend::inbound::http::login::{login_facebook, login_facebook_callback, logout};
        use backend::inbound::http::offers::{
            create_offer, delete_offer, list_region_offers, list_restaurant_offers, update_offer,
        };
        use backend::inbound::http::regions::list_regions;

        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(backend::Trace)
                .service(
                    actix_web::web::scope("/api/v1")
                        .wrap(lunch_app::session_middleware())
                        .service(login_facebook)
                        .service(login_facebook_callback)
                        .service(logout)
                        .service(list_regions)
                        .service(list_region_offers)
                        .service(list_restaurant_offers)
                        .service(create_offer)
                        .service(update_offer)
                        .service(delete_offer)
                        .service(get_group_post)
                        .service(update_group_post),
                ),
        )
        .await
    }};
}

/// Walk the OAuth redirect and callback for `code`, returning the session
/// cookie of the logged-in user.
macro_rules! log_in {
    ($app:expr, $code:expr) => {{
        let start = actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::get()
                .uri("/api/v1/login/facebook")
                .to_request(),
        )
        .await;
        assert_eq!(start.status(), actix_web::http::StatusCode::FOUND);
        let state = lunch_app::oauth_state(&start);
        let cookie = lunch_app::session_cookie(&start).expect("state cookie");

        let callback = actix_web::test::call_service(
            &$app,
            actix_web::test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/login/facebook/callback?state={state}&code={}",
                    $code
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(callback.status(), actix_web::http::StatusCode::FOUND);
        lunch_app::session_cookie(&callback).expect("session cookie")
    }};
}

/// Session cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// The `state` query parameter of a login redirect.
pub fn oauth_state<B>(res: &ServiceResponse<B>) -> String {
    let location = res
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect location");
    let url = Url::parse(location).expect("absolute redirect url");
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter")
}
