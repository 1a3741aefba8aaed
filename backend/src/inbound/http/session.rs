//! Cookie session helpers.
//!
//! The encrypted cookie holds only two values: the OAuth `state` issued when
//! a login starts, and the opaque session id handed out once the callback
//! succeeds. Tokens never leave the server.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionId};

pub(crate) const SESSION_ID_KEY: &str = "session_id";
pub(crate) const OAUTH_STATE_KEY: &str = "oauth_state";

/// Newtype wrapper exposing session operations in domain terms.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember the CSRF state issued for a login redirect.
    pub fn store_oauth_state(&self, state: &str) -> Result<(), Error> {
        self.0
            .insert(OAUTH_STATE_KEY, state)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Remove and return the stored CSRF state. A state is single use.
    pub fn take_oauth_state(&self) -> Result<Option<String>, Error> {
        self.0
            .remove_as::<String>(OAUTH_STATE_KEY)
            .transpose()
            .map_err(|raw| {
                warn!(length = raw.len(), "unreadable oauth state in session cookie");
                Error::unauthorized("login state is invalid; start again")
            })
    }

    /// Start an authenticated session. The cookie is renewed to prevent
    /// fixation.
    pub fn persist_session(&self, session_id: &SessionId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SESSION_ID_KEY, session_id.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The session id stored in the cookie, if present and well formed.
    pub fn session_id(&self) -> Result<Option<SessionId>, Error> {
        let raw = self
            .0
            .get::<String>(SESSION_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match SessionId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid session id in session cookie");
                None
            }
        }))
    }

    /// Require a session id or return `401 Unauthorized`.
    pub fn require_session_id(&self) -> Result<SessionId, Error> {
        self.session_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn round_trips_session_id() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id = SessionId::new("abcdef0123456789").expect("fixture id");
                        session.persist_session(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/get",
                    web::get().to(|session: SessionContext| async move {
                        let id = session.require_session_id()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(id.as_str().to_owned()))
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        assert_eq!(test::read_body(get_res).await, "abcdef0123456789");
    }

    #[actix_web::test]
    async fn oauth_state_is_single_use() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/start",
                    web::get().to(|session: SessionContext| async move {
                        session.store_oauth_state("state-1")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/take",
                    web::get().to(|session: SessionContext| async move {
                        let state = session.take_oauth_state()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(state.unwrap_or_default()))
                    }),
                ),
        )
        .await;

        let start =
            test::call_service(&app, test::TestRequest::get().uri("/start").to_request()).await;
        let cookie = session_cookie(&start).expect("session cookie set");

        let first = test::call_service(
            &app,
            test::TestRequest::get().uri("/take").cookie(cookie).to_request(),
        )
        .await;
        let next_cookie = session_cookie(&first).expect("updated cookie");
        assert_eq!(test::read_body(first).await, "state-1");

        let second = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/take")
                .cookie(next_cookie)
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(second).await, "");
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/require",
            web::get().to(|session: SessionContext| async move {
                session.require_session_id()?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
