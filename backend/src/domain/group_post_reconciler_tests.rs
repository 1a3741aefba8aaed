//! Tests for group post reconciliation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};
use rust_decimal::Decimal;

use super::*;
use crate::domain::ports::{
    MockAuthenticator, MockGroupPostRepository, MockOfferRepository, MockPublishingClient,
    MockRegionRepository, PublishingClient, PublishingClientError,
};
use crate::domain::{
    AccessToken, DayBounds, ErrorCode, FacebookUserId, Offer, OfferId, PageId, PageTokens,
    PostId, Price, Region, RegionId, RestaurantId, SessionId, UserId, UserSession,
};

type Reconciler = GroupPostReconciler<
    MockAuthenticator,
    MockRegionRepository,
    MockOfferRepository,
    MockGroupPostRepository,
>;

struct Setup {
    authenticator: MockAuthenticator,
    regions: MockRegionRepository,
    offers: MockOfferRepository,
    posts: MockGroupPostRepository,
}

impl Setup {
    fn new() -> Self {
        Self {
            authenticator: MockAuthenticator::new(),
            regions: MockRegionRepository::new(),
            offers: MockOfferRepository::new(),
            posts: MockGroupPostRepository::new(),
        }
    }

    fn with_client(mut self, client: MockPublishingClient) -> Self {
        self.authenticator
            .expect_api_connection()
            .withf(|token| token.expose() == "page-token-p1")
            .times(1)
            .return_once(move |_| Arc::new(client) as Arc<dyn PublishingClient>);
        self
    }

    fn with_region(mut self, location: &str) -> Self {
        let region = Region::new(REGION_ID, "Region", location).expect("region");
        self.regions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(region.clone())));
        self
    }

    fn with_offers(mut self, offers: Vec<Offer>) -> Self {
        self.offers
            .expect_find_for_restaurant()
            .times(1)
            .return_once(move |_, _| Ok(offers));
        self
    }

    fn build(self) -> Reconciler {
        GroupPostReconciler::new(
            Arc::new(self.authenticator),
            Arc::new(self.regions),
            Arc::new(self.offers),
            Arc::new(self.posts),
            CurrencySymbol::default(),
        )
    }
}

const REGION_ID: RegionId = RegionId::from_uuid(uuid::Uuid::from_u128(0x5e61_0000));

fn page(id: &str) -> PageId {
    PageId::new(id).expect("page id")
}

fn post_id(id: &str) -> PostId {
    PostId::new(id).expect("post id")
}

fn date() -> OfferDate {
    OfferDate::parse("2024-06-03").expect("date")
}

#[fixture]
fn restaurant() -> Restaurant {
    Restaurant {
        id: RestaurantId::random(),
        name: "Soup Kitchen".to_owned(),
        address: "Main street 1".to_owned(),
        region_id: REGION_ID,
        page_id: Some(page("P1")),
        default_group_post_message_template: "Today's specials:".to_owned(),
    }
}

fn user_for(restaurant: &Restaurant) -> User {
    let page_tokens: PageTokens = [(page("P1"), AccessToken::new("page-token-p1"))]
        .into_iter()
        .collect();
    User {
        id: UserId::random(),
        facebook_user_id: FacebookUserId::new("1001").expect("fb id"),
        restaurant_ids: vec![restaurant.id],
        session: Some(UserSession {
            session_id: SessionId::generate(),
            access_token: AccessToken::new("user-token"),
            expires_at: None,
            page_tokens,
        }),
    }
}

fn post_for(restaurant: &Restaurant, facebook_post_id: Option<&str>) -> OfferGroupPost {
    let mut post = OfferGroupPost::new(restaurant.id, date(), "Today's specials:");
    post.facebook_post_id = facebook_post_id.map(post_id);
    post
}

fn soup(restaurant: &Restaurant) -> Offer {
    let at = |raw: &str| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .expect("instant")
            .with_timezone(&chrono::Utc)
    };
    Offer {
        id: OfferId::random(),
        restaurant_id: restaurant.id,
        title: "Soup".to_owned(),
        description: String::new(),
        price: Price::new(Decimal::new(350, 2)).expect("price"),
        starts_at: at("2024-06-03T11:00:00Z"),
        ends_at: at("2024-06-03T14:00:00Z"),
        tags: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn restaurant_without_page_is_a_no_op(mut restaurant: Restaurant) {
    restaurant.page_id = None;
    let mut setup = Setup::new();
    setup.authenticator.expect_api_connection().never();
    setup.regions.expect_find_by_id().never();
    setup.offers.expect_find_for_restaurant().never();
    setup.posts.expect_update().never();

    let post = post_for(&restaurant, Some("old123"));
    let user = user_for(&restaurant);
    let result = setup
        .build()
        .update(post.clone(), &user, &restaurant)
        .await
        .expect("no-op succeeds");

    assert_eq!(result, post);
}

#[rstest]
#[tokio::test]
async fn missing_page_token_is_forbidden(restaurant: Restaurant) {
    let mut setup = Setup::new();
    setup.authenticator.expect_api_connection().never();
    setup.posts.expect_update().never();

    let mut user = user_for(&restaurant);
    user.session = None;
    let err = setup
        .build()
        .update(post_for(&restaurant, Some("old123")), &user, &restaurant)
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn publishes_composed_message_and_records_post_id(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client.expect_delete_post().never();
    client
        .expect_publish()
        .withf(|page_id, message| {
            page_id.as_str() == "P1" && message == "Today's specials:\n\nSoup - 3.50€"
        })
        .times(1)
        .return_once(|_, _| Ok(post_id("new456")));

    let mut setup = Setup::new()
        .with_client(client)
        .with_region("UTC")
        .with_offers(vec![soup(&restaurant)]);
    setup
        .posts
        .expect_update()
        .withf(|post| post.facebook_post_id.as_ref().map(PostId::as_str) == Some("new456"))
        .times(1)
        .return_once(|_| Ok(()));

    let user = user_for(&restaurant);
    let updated = setup
        .build()
        .update(post_for(&restaurant, None), &user, &restaurant)
        .await
        .expect("publish succeeds");

    assert_eq!(updated.facebook_post_id, Some(post_id("new456")));
}

#[rstest]
#[tokio::test]
async fn zero_offers_deletes_old_post_and_publishes_nothing(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client
        .expect_delete_post()
        .withf(|post_id| post_id.as_str() == "old123")
        .times(1)
        .return_once(|_| Ok(()));
    client.expect_publish().never();

    let mut setup = Setup::new()
        .with_client(client)
        .with_region("UTC")
        .with_offers(Vec::new());
    setup
        .posts
        .expect_update()
        .withf(|post| post.facebook_post_id.is_none())
        .times(1)
        .return_once(|_| Ok(()));

    let user = user_for(&restaurant);
    let updated = setup
        .build()
        .update(post_for(&restaurant, Some("old123")), &user, &restaurant)
        .await
        .expect("reconcile succeeds");

    assert!(updated.facebook_post_id.is_none());
}

#[rstest]
#[tokio::test]
async fn delete_failure_is_bad_gateway_and_stops(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client
        .expect_delete_post()
        .times(1)
        .return_once(|_| Err(PublishingClientError::rejected(500_u16, "unavailable")));
    client.expect_publish().never();

    let mut setup = Setup::new().with_client(client);
    setup.regions.expect_find_by_id().never();
    setup.offers.expect_find_for_restaurant().never();
    setup.posts.expect_update().never();

    let user = user_for(&restaurant);
    let err = setup
        .build()
        .update(post_for(&restaurant, Some("old123")), &user, &restaurant)
        .await
        .expect_err("delete fails");

    assert_eq!(err.code(), ErrorCode::BadGateway);
}

#[rstest]
#[tokio::test]
async fn delete_is_recorded_before_a_later_failure(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client.expect_delete_post().times(1).return_once(|_| Ok(()));
    client
        .expect_publish()
        .times(1)
        .return_once(|_, _| Err(PublishingClientError::transport("connection reset")));

    let mut setup = Setup::new()
        .with_client(client)
        .with_region("UTC")
        .with_offers(vec![soup(&restaurant)]);
    setup
        .posts
        .expect_update()
        .withf(|post| post.facebook_post_id.is_none())
        .times(1)
        .return_once(|_| Ok(()));

    let user = user_for(&restaurant);
    let err = setup
        .build()
        .update(post_for(&restaurant, Some("old123")), &user, &restaurant)
        .await
        .expect_err("publish fails");

    assert_eq!(err.code(), ErrorCode::BadGateway);
}

#[rstest]
#[tokio::test]
async fn unrecorded_publish_is_internal(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client
        .expect_publish()
        .times(1)
        .return_once(|_, _| Ok(post_id("orphan789")));

    let mut setup = Setup::new()
        .with_client(client)
        .with_region("UTC")
        .with_offers(vec![soup(&restaurant)]);
    setup.posts.expect_update().times(1).return_once(|_| {
        Err(crate::domain::ports::GroupPostRepositoryError::connection(
            "connection lost",
        ))
    });

    let user = user_for(&restaurant);
    let err = setup
        .build()
        .update(post_for(&restaurant, None), &user, &restaurant)
        .await
        .expect_err("record fails");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(err.message().contains("orphan789"));
}

#[rstest]
#[tokio::test]
async fn repeated_updates_publish_twice_and_keep_the_latest_id(restaurant: Restaurant) {
    let published = Arc::new(AtomicUsize::new(0));
    let stored: Arc<Mutex<Vec<Option<PostId>>>> = Arc::default();

    let mut authenticator = MockAuthenticator::new();
    let publish_counter = Arc::clone(&published);
    authenticator
        .expect_api_connection()
        .times(2)
        .returning(move |_| {
            let counter = Arc::clone(&publish_counter);
            let mut client = MockPublishingClient::new();
            client.expect_delete_post().returning(|_| Ok(()));
            client.expect_publish().returning(move |_, _| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(post_id(&format!("post-{n}")))
            });
            Arc::new(client) as Arc<dyn PublishingClient>
        });

    let mut setup = Setup {
        authenticator,
        ..Setup::new()
    }
    .with_region("UTC");
    let offers = vec![soup(&restaurant)];
    setup
        .offers
        .expect_find_for_restaurant()
        .times(2)
        .returning(move |_, _| Ok(offers.clone()));
    let log = Arc::clone(&stored);
    setup.posts.expect_update().returning(move |post| {
        log.lock()
            .expect("log lock")
            .push(post.facebook_post_id.clone());
        Ok(())
    });

    let reconciler = setup.build();
    let user = user_for(&restaurant);
    let first = reconciler
        .update(post_for(&restaurant, None), &user, &restaurant)
        .await
        .expect("first update");
    let second = reconciler
        .update(first, &user, &restaurant)
        .await
        .expect("second update");

    assert_eq!(published.load(Ordering::SeqCst), 2);
    assert_eq!(second.facebook_post_id, Some(post_id("post-2")));
    let stored = stored.lock().expect("log lock").clone();
    assert_eq!(stored.last(), Some(&Some(post_id("post-2"))));
}

#[rstest]
#[tokio::test]
async fn offers_are_loaded_for_the_local_dst_day(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client.expect_publish().never();

    let mut setup = Setup::new().with_client(client).with_region("Europe/Tallinn");
    setup
        .offers
        .expect_find_for_restaurant()
        .withf(|_, bounds: &DayBounds| {
            bounds.start.to_rfc3339() == "2024-03-30T22:00:00+00:00"
                && bounds.duration() == chrono::TimeDelta::hours(23)
        })
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));

    let mut post = post_for(&restaurant, None);
    post.date = OfferDate::parse("2024-03-31").expect("date");
    let user = user_for(&restaurant);

    setup
        .build()
        .update(post, &user, &restaurant)
        .await
        .expect("reconcile succeeds");
}

#[rstest]
#[tokio::test]
async fn update_for_date_creates_post_from_default_template(restaurant: Restaurant) {
    let mut client = MockPublishingClient::new();
    client.expect_publish().never();

    let mut setup = Setup::new()
        .with_client(client)
        .with_region("UTC")
        .with_offers(Vec::new());
    setup
        .posts
        .expect_find_by_date_and_restaurant()
        .times(1)
        .return_once(|_, _| Ok(None));
    let restaurant_id = restaurant.id;
    setup
        .posts
        .expect_insert()
        .withf(move |post| {
            post.restaurant_id == restaurant_id
                && post.message_template == "Today's specials:"
                && post.facebook_post_id.is_none()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let user = user_for(&restaurant);
    let post = setup
        .build()
        .update_for_date(&date(), &user, &restaurant)
        .await
        .expect("reconcile succeeds");

    assert_eq!(post.date, date());
}

#[rstest]
#[tokio::test]
async fn losing_the_insert_race_reads_the_winner(restaurant: Restaurant) {
    let winner = post_for(&restaurant, None);
    let expected = winner.clone();
    let mut posts = MockGroupPostRepository::new();
    let lookups = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&lookups);
    posts
        .expect_find_by_date_and_restaurant()
        .times(2)
        .returning(move |_, _| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
    posts.expect_insert().times(1).return_once(|post| {
        Err(GroupPostRepositoryError::duplicate(post.restaurant_id, post.date))
    });

    let post = fetch_or_create_group_post(&posts, &restaurant, &date())
        .await
        .expect("re-read succeeds");

    assert_eq!(post, expected);
}
