//! In-memory implementations of every storage port.
//!
//! One [`InMemoryStore`] backs all repositories so cross-table queries, such
//! as offers by region, see a consistent view. Semantics follow the
//! PostgreSQL adapters: the `(restaurant, date)` group post key is unique,
//! updates of missing rows fail, and registration tokens expire after the
//! configured TTL.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    GroupPostRepository, GroupPostRepositoryError, OfferRepository, OfferRepositoryError,
    RegionRepository, RegionRepositoryError, RegistrationTokenRepository,
    RegistrationTokenRepositoryError, RestaurantRepository, RestaurantRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    DayBounds, FacebookUserId, Offer, OfferDate, OfferGroupPost, OfferId, PageId, PageTokens,
    Region, RegionId, RegistrationAccessToken, Restaurant, RestaurantId, SessionId, User, UserId,
    UserSession,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    restaurants: BTreeMap<RestaurantId, Restaurant>,
    regions: BTreeMap<RegionId, Region>,
    offers: BTreeMap<OfferId, Offer>,
    group_posts: BTreeMap<(RestaurantId, OfferDate), OfferGroupPost>,
    registration_tokens: Vec<RegistrationAccessToken>,
}

/// Shared in-memory tables.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            clock,
        }
    }

    pub fn put_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    pub fn put_restaurant(&self, restaurant: Restaurant) {
        self.lock().restaurants.insert(restaurant.id, restaurant);
    }

    pub fn put_region(&self, region: Region) {
        self.lock().regions.insert(*region.id(), region);
    }

    pub fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).cloned()
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.lock().offers.values().cloned().collect()
    }

    pub fn group_post(&self, restaurant_id: &RestaurantId, date: &OfferDate) -> Option<OfferGroupPost> {
        self.lock()
            .group_posts
            .get(&(*restaurant_id, *date))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory store mutex"),
        }
    }

    fn update_user(
        &self,
        user_id: &UserId,
        apply: impl FnOnce(&mut User),
    ) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock();
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| UserPersistenceError::not_found(*user_id))?;
        apply(user);
        Ok(())
    }
}

fn sorted(mut offers: Vec<Offer>) -> Vec<Offer> {
    offers.sort_by(|a, b| (a.starts_at, &a.title).cmp(&(b.starts_at, &b.title)));
    offers
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_facebook_id(
        &self,
        facebook_user_id: &FacebookUserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| &user.facebook_user_id == facebook_user_id)
            .cloned())
    }

    async fn find_by_session_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| {
                user.session
                    .as_ref()
                    .is_some_and(|session| &session.session_id == session_id)
            })
            .cloned())
    }

    async fn set_session(
        &self,
        user_id: &UserId,
        session: &UserSession,
    ) -> Result<(), UserPersistenceError> {
        self.update_user(user_id, |user| user.session = Some(session.clone()))
    }

    async fn set_page_tokens(
        &self,
        user_id: &UserId,
        page_tokens: &PageTokens,
    ) -> Result<(), UserPersistenceError> {
        self.update_user(user_id, |user| {
            if let Some(session) = user.session.as_mut() {
                session.page_tokens = page_tokens.clone();
            }
        })
    }

    async fn clear_session(&self, user_id: &UserId) -> Result<(), UserPersistenceError> {
        self.update_user(user_id, |user| user.session = None)
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &RestaurantId,
    ) -> Result<Option<Restaurant>, RestaurantRepositoryError> {
        Ok(self.lock().restaurants.get(id).cloned())
    }

    async fn find_by_page_ids(
        &self,
        page_ids: &[PageId],
    ) -> Result<Vec<Restaurant>, RestaurantRepositoryError> {
        Ok(self
            .lock()
            .restaurants
            .values()
            .filter(|restaurant| {
                restaurant
                    .page_id
                    .as_ref()
                    .is_some_and(|page_id| page_ids.contains(page_id))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegionRepository for InMemoryStore {
    async fn find_by_id(&self, id: &RegionId) -> Result<Option<Region>, RegionRepositoryError> {
        Ok(self.lock().regions.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Region>, RegionRepositoryError> {
        let mut regions: Vec<Region> = self.lock().regions.values().cloned().collect();
        regions.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(regions)
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn find_by_id(&self, id: &OfferId) -> Result<Option<Offer>, OfferRepositoryError> {
        Ok(self.lock().offers.get(id).cloned())
    }

    async fn find_for_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let offers = self
            .lock()
            .offers
            .values()
            .filter(|offer| &offer.restaurant_id == restaurant_id)
            .filter(|offer| bounds.overlaps(offer.starts_at, offer.ends_at))
            .cloned()
            .collect();
        Ok(sorted(offers))
    }

    async fn find_for_region(
        &self,
        region_id: &RegionId,
        bounds: &DayBounds,
    ) -> Result<Vec<Offer>, OfferRepositoryError> {
        let tables = self.lock();
        let offers = tables
            .offers
            .values()
            .filter(|offer| {
                tables
                    .restaurants
                    .get(&offer.restaurant_id)
                    .is_some_and(|restaurant| &restaurant.region_id == region_id)
            })
            .filter(|offer| bounds.overlaps(offer.starts_at, offer.ends_at))
            .cloned()
            .collect();
        Ok(sorted(offers))
    }

    async fn insert(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut tables = self.lock();
        if tables.offers.contains_key(&offer.id) {
            return Err(OfferRepositoryError::query(format!(
                "offer {} already exists",
                offer.id
            )));
        }
        tables.offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn update(&self, offer: &Offer) -> Result<(), OfferRepositoryError> {
        let mut tables = self.lock();
        let Some(stored) = tables.offers.get_mut(&offer.id) else {
            return Err(OfferRepositoryError::query(format!(
                "offer {} not found for update",
                offer.id
            )));
        };
        *stored = offer.clone();
        Ok(())
    }

    async fn delete(&self, id: &OfferId) -> Result<(), OfferRepositoryError> {
        self.lock().offers.remove(id);
        Ok(())
    }
}

#[async_trait]
impl GroupPostRepository for InMemoryStore {
    async fn find_by_date_and_restaurant(
        &self,
        restaurant_id: &RestaurantId,
        date: &OfferDate,
    ) -> Result<Option<OfferGroupPost>, GroupPostRepositoryError> {
        Ok(self.group_post(restaurant_id, date))
    }

    async fn insert(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError> {
        let mut tables = self.lock();
        let key = (post.restaurant_id, post.date);
        if tables.group_posts.contains_key(&key) {
            return Err(GroupPostRepositoryError::duplicate(
                post.restaurant_id,
                post.date,
            ));
        }
        tables.group_posts.insert(key, post.clone());
        Ok(())
    }

    async fn update(&self, post: &OfferGroupPost) -> Result<(), GroupPostRepositoryError> {
        let mut tables = self.lock();
        let Some(stored) = tables
            .group_posts
            .values_mut()
            .find(|stored| stored.id == post.id)
        else {
            return Err(GroupPostRepositoryError::query(format!(
                "group post {} not found for update",
                post.id
            )));
        };
        *stored = post.clone();
        Ok(())
    }
}

#[async_trait]
impl RegistrationTokenRepository for InMemoryStore {
    async fn insert(
        &self,
        token: &RegistrationAccessToken,
    ) -> Result<(), RegistrationTokenRepositoryError> {
        self.lock().registration_tokens.push(token.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        token: &str,
    ) -> Result<Option<RegistrationAccessToken>, RegistrationTokenRepositoryError> {
        let now = self.clock.utc();
        Ok(self
            .lock()
            .registration_tokens
            .iter()
            .find(|stored| stored.token() == token && stored.expires_at() > now)
            .cloned())
    }

    async fn purge_expired(&self) -> Result<u64, RegistrationTokenRepositoryError> {
        let now = self.clock.utc();
        let mut tables = self.lock();
        let before = tables.registration_tokens.len();
        tables
            .registration_tokens
            .retain(|stored| stored.expires_at() > now);
        let purged = before - tables.registration_tokens.len();
        Ok(u64::try_from(purged).unwrap_or(u64::MAX))
    }
}
