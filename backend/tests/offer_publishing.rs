//! End-to-end offer flows over the in-memory backend.
//!
//! Each test logs in through the fake Facebook login, changes offers over
//! HTTP and then inspects what the fake Graph API received.

#[macro_use]
#[path = "support/lunch_app.rs"]
mod lunch_app;

use actix_web::http::StatusCode;
use actix_web::test;
use backend::domain::{OfferDate, RestaurantId};
use backend::test_support::{FIXTURE_LOGIN_CODE, FixtureData, InMemoryBackend};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TODAY: &str = "2024-06-03";
const TOMORROW: &str = "2024-06-04";

struct World {
    backend: InMemoryBackend,
    data: FixtureData,
}

#[fixture]
fn world() -> World {
    let backend = InMemoryBackend::new();
    let data = backend.with_fixture_data();
    World { backend, data }
}

fn soup(day: &str) -> Value {
    json!({
        "title": "Soup",
        "description": "Creamy salmon soup",
        "price": "3.50",
        "startsAt": format!("{day}T11:00:00+03:00"),
        "endsAt": format!("{day}T14:00:00+03:00"),
        "tags": ["fish"]
    })
}

fn offers_uri(restaurant_id: &RestaurantId) -> String {
    format!("/api/v1/restaurants/{restaurant_id}/offers")
}

fn group_post_uri(restaurant_id: &RestaurantId, date: &str) -> String {
    format!("/api/v1/restaurants/{restaurant_id}/group-posts/{date}")
}

fn date(raw: &str) -> OfferDate {
    OfferDate::parse(raw).expect("offer date")
}

#[rstest]
#[actix_web::test]
async fn creating_an_offer_publishes_the_day_post(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&data.restaurant.id))
            .cookie(cookie.clone())
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["price"], "3.50");

    let published = backend.facebook.live_posts();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].page_id.as_str(), "10001");
    assert_eq!(published[0].message, "Today at Kohvik:\n\nSoup - 3.50€");

    let post = backend
        .store
        .group_post(&data.restaurant.id, &date(TODAY))
        .expect("group post stored");
    assert_eq!(post.facebook_post_id, Some(published[0].post_id.clone()));
}

#[rstest]
#[actix_web::test]
async fn listings_are_public_and_filtered_by_local_day(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    for day in [TODAY, TOMORROW] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&offers_uri(&data.restaurant.id))
                .cookie(cookie.clone())
                .set_json(soup(day))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let region_offers: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/regions/{}/offers?date={TODAY}",
                data.region.id()
            ))
            .to_request(),
    )
    .await;
    assert_eq!(region_offers.len(), 1);
    assert_eq!(region_offers[0]["startsAt"], "2024-06-03T08:00:00+00:00");

    let restaurant_offers: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("{}?date={TOMORROW}", offers_uri(&data.restaurant.id)))
            .to_request(),
    )
    .await;
    assert_eq!(restaurant_offers.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn editing_the_template_replaces_the_live_post(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&data.restaurant.id))
            .cookie(cookie.clone())
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = backend.facebook.live_posts().remove(0);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&group_post_uri(&data.restaurant.id, TODAY))
            .cookie(cookie.clone())
            .set_json(json!({ "messageTemplate": "Lunch specials:" }))
            .to_request(),
    )
    .await;

    assert_eq!(backend.facebook.deleted(), vec![first.post_id.clone()]);
    let live = backend.facebook.live_posts();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].message, "Lunch specials:\n\nSoup - 3.50€");
    assert_eq!(body["messageTemplate"], "Lunch specials:");
    assert_eq!(body["facebookPostId"], live[0].post_id.as_str());
}

#[rstest]
#[actix_web::test]
async fn moving_an_offer_republishes_both_days(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&data.restaurant.id))
            .cookie(cookie.clone())
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;
    let offer_id = created["id"].as_str().expect("offer id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/offers/{offer_id}"))
            .cookie(cookie.clone())
            .set_json(soup(TOMORROW))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let today = backend
        .store
        .group_post(&data.restaurant.id, &date(TODAY))
        .expect("today's post");
    assert_eq!(today.facebook_post_id, None);
    let tomorrow = backend
        .store
        .group_post(&data.restaurant.id, &date(TOMORROW))
        .expect("tomorrow's post");
    let live = backend.facebook.live_posts();
    assert_eq!(live.len(), 1);
    assert_eq!(tomorrow.facebook_post_id, Some(live[0].post_id.clone()));
}

#[rstest]
#[actix_web::test]
async fn overnight_offer_joins_the_next_days_post(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    let stew = json!({
        "title": "Stew",
        "description": "Slow cooked overnight",
        "price": "4.20",
        "startsAt": format!("{TODAY}T20:00:00+03:00"),
        "endsAt": format!("{TOMORROW}T12:00:00+03:00"),
        "tags": []
    });
    for body in [soup(TOMORROW), stew] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&offers_uri(&data.restaurant.id))
                .cookie(cookie.clone())
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let tomorrow = backend
        .store
        .group_post(&data.restaurant.id, &date(TOMORROW))
        .expect("tomorrow's post");
    let live = backend.facebook.live_posts();
    let post = live
        .iter()
        .find(|post| tomorrow.facebook_post_id.as_ref() == Some(&post.post_id))
        .expect("tomorrow's post is live");
    assert_eq!(
        post.message,
        "Today at Kohvik:\n\nStew - 4.20€\nSoup - 3.50€"
    );
    assert!(
        backend
            .store
            .group_post(&data.restaurant.id, &date(TODAY))
            .and_then(|post| post.facebook_post_id)
            .is_some()
    );
}

#[rstest]
#[actix_web::test]
async fn deleting_the_last_offer_removes_the_post(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    let created: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&data.restaurant.id))
            .cookie(cookie.clone())
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;
    let offer_id = created["id"].as_str().expect("offer id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/offers/{offer_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(backend.facebook.live_posts().is_empty());

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&group_post_uri(&data.restaurant.id, TODAY))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(body["facebookPostId"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn publish_failure_is_a_bad_gateway_but_keeps_the_offer(world: World) {
    let World { backend, data } = world;
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);
    backend.facebook.fail_publishing(true);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&data.restaurant.id))
            .cookie(cookie)
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "bad_gateway");
    assert_eq!(backend.store.offers().len(), 1);
}

#[rstest]
#[actix_web::test]
async fn staff_cannot_touch_other_restaurants(world: World) {
    let World { backend, data } = world;
    let other = backend.add_restaurant(data.region.id(), "Elsewhere", Some("20002"));
    let app = lunch_app!(backend.http_state());
    let cookie = log_in!(app, FIXTURE_LOGIN_CODE);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&offers_uri(&other.id))
            .cookie(cookie)
            .set_json(soup(TODAY))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(backend.store.offers().is_empty());
    assert!(backend.facebook.published().is_empty());
}
