//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled with the
//! `test-support` feature, which the crate's dev-dependencies enable.

pub mod clock;
pub mod facebook;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    CurrencySymbol, FacebookUserId, PageId, Region, RegionId, Restaurant, RestaurantId, User,
    UserId,
};
use crate::inbound::http::state::{HttpState, StatePorts};

pub use clock::MutableClock;
pub use facebook::{FakeFacebook, PublishedPost};
pub use store::InMemoryStore;

/// Region seeded by [`InMemoryBackend::with_fixture_data`].
pub const FIXTURE_REGION_TZ: &str = "Europe/Tallinn";
/// Page administered by the fixture principal.
pub const FIXTURE_PAGE_ID: &str = "10001";
/// Provider id of the fixture principal.
pub const FIXTURE_FACEBOOK_USER_ID: &str = "2001";
/// Authorisation code that logs in as the fixture principal.
pub const FIXTURE_LOGIN_CODE: &str = "fixture-code";

/// The in-memory adapters behind one [`HttpState`].
#[derive(Clone)]
pub struct InMemoryBackend {
    pub store: Arc<InMemoryStore>,
    pub facebook: FakeFacebook,
    pub clock: Arc<MutableClock>,
}

/// Seeded rows of [`InMemoryBackend::with_fixture_data`].
#[derive(Debug, Clone)]
pub struct FixtureData {
    pub region: Region,
    pub restaurant: Restaurant,
    pub user: User,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Empty backend whose clock reads 2024-06-03 09:00 UTC.
    pub fn new() -> Self {
        let now = match Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).single() {
            Some(now) => now,
            None => panic!("fixture instant"),
        };
        Self::at(now)
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(MutableClock::new(now));
        Self {
            store: Arc::new(InMemoryStore::new(clock.clone())),
            facebook: FakeFacebook::new(),
            clock,
        }
    }

    /// Seed one region, one restaurant with a page, and a registered user
    /// who administers that page.
    pub fn with_fixture_data(&self) -> FixtureData {
        let region = self.add_region("Tallinn", FIXTURE_REGION_TZ);
        let restaurant = self.add_restaurant(region.id(), "Kohvik", Some(FIXTURE_PAGE_ID));
        let user = self.add_user(FIXTURE_FACEBOOK_USER_ID, vec![restaurant.id]);
        self.facebook.register_principal(
            FIXTURE_LOGIN_CODE,
            FIXTURE_FACEBOOK_USER_ID,
            &[(FIXTURE_PAGE_ID, "Kohvik")],
        );
        FixtureData {
            region,
            restaurant,
            user,
        }
    }

    pub fn add_region(&self, name: &str, location: &str) -> Region {
        let region = match Region::new(RegionId::random(), name, location) {
            Ok(region) => region,
            Err(error) => panic!("invalid fixture region: {error}"),
        };
        self.store.put_region(region.clone());
        region
    }

    pub fn add_restaurant(
        &self,
        region_id: &RegionId,
        name: &str,
        page_id: Option<&str>,
    ) -> Restaurant {
        let page_id = page_id.map(|raw| match PageId::new(raw) {
            Ok(id) => id,
            Err(error) => panic!("invalid fixture page id: {error}"),
        });
        let restaurant = Restaurant {
            id: RestaurantId::random(),
            name: name.to_owned(),
            address: "Rae 1".to_owned(),
            region_id: *region_id,
            page_id,
            default_group_post_message_template: format!("Today at {name}:"),
        };
        self.store.put_restaurant(restaurant.clone());
        restaurant
    }

    pub fn add_user(&self, facebook_user_id: &str, restaurant_ids: Vec<RestaurantId>) -> User {
        let facebook_user_id = match FacebookUserId::new(facebook_user_id) {
            Ok(id) => id,
            Err(error) => panic!("invalid fixture facebook id: {error}"),
        };
        let user = User {
            id: UserId::random(),
            facebook_user_id,
            restaurant_ids,
            session: None,
        };
        self.store.put_user(user.clone());
        user
    }

    /// Compose the HTTP state over these adapters.
    pub fn http_state(&self) -> HttpState {
        HttpState::from_ports(StatePorts {
            authenticator: Arc::new(self.facebook.clone()),
            users: self.store.clone(),
            restaurants: self.store.clone(),
            regions: self.store.clone(),
            offers: self.store.clone(),
            group_posts: self.store.clone(),
            currency: CurrencySymbol::new("€"),
            clock: self.clock.clone(),
        })
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.
    //!
    //! Resolves `RefOr<Schema>` wrappers to concrete `Object` schemas with
    //! diagnostic messages on type mismatches.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => {
                panic!("schema '{name}' is an Array, not an Object");
            }
            _ => panic!("schema '{name}' has unexpected type"),
        }
    }

    /// Get a property from an Object schema by name.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}
