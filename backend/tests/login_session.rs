//! Login, page token propagation and logout over the in-memory backend.

#[macro_use]
#[path = "support/lunch_app.rs"]
mod lunch_app;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use backend::domain::PageId;
use backend::test_support::{
    FIXTURE_LOGIN_CODE, FIXTURE_PAGE_ID, InMemoryBackend,
};
use rstest::rstest;
use serde_json::Value;

#[actix_web::test]
async fn login_stores_a_session_with_page_tokens() {
    let backend = InMemoryBackend::new();
    let data = backend.with_fixture_data();
    let app = lunch_app!(backend.http_state());

    let _cookie = log_in!(app, FIXTURE_LOGIN_CODE);

    let user = backend.store.user(&data.user.id).expect("user");
    let session = user.session.expect("session stored");
    let page_id = PageId::new(FIXTURE_PAGE_ID).expect("page id");
    assert_eq!(
        session.page_tokens.get(&page_id).map(|token| token.expose()),
        Some("page-token:10001")
    );
    assert!(session.expires_at.is_some());
}

#[actix_web::test]
async fn callback_redirects_home() {
    let backend = InMemoryBackend::new();
    backend.with_fixture_data();
    let app = lunch_app!(backend.http_state());

    let start = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/login/facebook").to_request(),
    )
    .await;
    let state = lunch_app::oauth_state(&start);
    let cookie = lunch_app::session_cookie(&start).expect("state cookie");
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/login/facebook/callback?state={state}&code={FIXTURE_LOGIN_CODE}"
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/")
    );
}

#[rstest]
#[case::forged_state("forged", FIXTURE_LOGIN_CODE)]
#[case::unregistered_principal("", "stranger-code")]
#[actix_web::test]
async fn rejected_callbacks_are_unauthorised(#[case] state_override: &str, #[case] code: &str) {
    let backend = InMemoryBackend::new();
    backend.with_fixture_data();
    backend
        .facebook
        .register_principal("stranger-code", "9999", &[]);
    let app = lunch_app!(backend.http_state());

    let start = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/login/facebook").to_request(),
    )
    .await;
    let issued = lunch_app::oauth_state(&start);
    let state = if state_override.is_empty() {
        issued
    } else {
        state_override.to_owned()
    };
    let cookie = lunch_app::session_cookie(&start).expect("state cookie");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/login/facebook/callback?state={state}&code={code}"
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn callback_without_a_login_in_progress_is_rejected() {
    let backend = InMemoryBackend::new();
    backend.with_fixture_data();
    let app = lunch_app!(backend.http_state());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/login/facebook/callback?state=abc&code={FIXTURE_LOGIN_CODE}"
            ))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn failed_relogin_keeps_the_existing_session() {
    let backend = InMemoryBackend::new();
    let data = backend.with_fixture_data();
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    let before = backend
        .store
        .user(&data.user.id)
        .and_then(|user| user.session)
        .expect("session stored");

    backend.facebook.deny_page_tokens(true);
    let start = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/login/facebook").to_request(),
    )
    .await;
    let state = lunch_app::oauth_state(&start);
    let state_cookie = lunch_app::session_cookie(&start).expect("state cookie");
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/login/facebook/callback?state={state}&code={FIXTURE_LOGIN_CODE}"
            ))
            .cookie(state_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let after = backend
        .store
        .user(&data.user.id)
        .and_then(|user| user.session)
        .expect("session kept");
    assert_eq!(after, before);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/restaurants/{}/group-posts/2024-06-03",
                data.restaurant.id
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn logout_ends_the_session() {
    let backend = InMemoryBackend::new();
    let data = backend.with_fixture_data();
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(
        backend
            .store
            .user(&data.user.id)
            .expect("user")
            .session
            .is_none()
    );

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/restaurants/{}/group-posts/2024-06-03",
                data.restaurant.id
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
