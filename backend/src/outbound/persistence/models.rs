//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Row-to-domain conversions return
//! `Result<_, String>` so repositories can report corrupt rows through their
//! own error type.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{
    offer_group_posts, offers, regions, registration_tokens, restaurants, users,
};
use crate::domain::{
    AccessToken, FacebookUserId, GroupPostId, Offer, OfferDate, OfferGroupPost, OfferId, PageId,
    PageTokens, PostId, Price, Region, RegionId, RegistrationAccessToken, RegistrationTokenId,
    Restaurant, RestaurantId, SessionId, User, UserId, UserSession,
};

// ---------------------------------------------------------------------------
// Regions and restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = regions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegionRow {
    pub id: Uuid,
    pub name: String,
    pub location: String,
}

impl RegionRow {
    pub(crate) fn into_domain(self) -> Result<Region, String> {
        Region::new(RegionId::from_uuid(self.id), self.name, &self.location)
            .map_err(|err| format!("region {}: {err}", self.id))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub region_id: Uuid,
    pub facebook_page_id: Option<String>,
    pub default_group_post_message_template: String,
}

impl RestaurantRow {
    /// Blank page ids are treated as "not connected".
    pub(crate) fn into_domain(self) -> Restaurant {
        Restaurant {
            id: RestaurantId::from_uuid(self.id),
            name: self.name,
            address: self.address,
            region_id: RegionId::from_uuid(self.region_id),
            page_id: self.facebook_page_id.and_then(|raw| PageId::new(raw).ok()),
            default_group_post_message_template: self.default_group_post_message_template,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub facebook_user_id: String,
    pub restaurant_ids: Vec<Uuid>,
    pub session_id: Option<String>,
    pub access_token: Option<String>,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub page_tokens: serde_json::Value,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let facebook_user_id = FacebookUserId::new(self.facebook_user_id)
            .map_err(|err| format!("user {}: {err}", self.id))?;
        let session = match (self.session_id, self.access_token) {
            (Some(session_id), Some(access_token)) => Some(UserSession {
                session_id: SessionId::new(session_id)
                    .map_err(|err| format!("user {}: {err}", self.id))?,
                access_token: AccessToken::new(access_token),
                expires_at: self.access_token_expires_at,
                page_tokens: decode_page_tokens(self.page_tokens)
                    .map_err(|err| format!("user {}: {err}", self.id))?,
            }),
            _ => None,
        };
        Ok(User {
            id: UserId::from_uuid(self.id),
            facebook_user_id,
            restaurant_ids: self
                .restaurant_ids
                .into_iter()
                .map(RestaurantId::from_uuid)
                .collect(),
            session,
        })
    }
}

/// Session columns written at login, page tokens included.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserSessionUpdate<'a> {
    pub session_id: Option<&'a str>,
    pub access_token: Option<&'a str>,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub page_tokens: serde_json::Value,
}

impl<'a> UserSessionUpdate<'a> {
    pub(crate) fn start(session: &'a UserSession) -> Self {
        Self {
            session_id: Some(session.session_id.as_str()),
            access_token: Some(session.access_token.expose()),
            access_token_expires_at: session.expires_at,
            page_tokens: encode_page_tokens(&session.page_tokens),
        }
    }

    pub(crate) fn cleared() -> Self {
        Self {
            session_id: None,
            access_token: None,
            access_token_expires_at: None,
            page_tokens: encode_page_tokens(&PageTokens::new()),
        }
    }
}

pub(crate) fn encode_page_tokens(tokens: &PageTokens) -> serde_json::Value {
    let map: BTreeMap<&str, &str> = tokens
        .iter()
        .map(|(page_id, token)| (page_id.as_str(), token.expose()))
        .collect();
    serde_json::json!(map)
}

fn decode_page_tokens(value: serde_json::Value) -> Result<PageTokens, String> {
    let map: BTreeMap<String, String> =
        serde_json::from_value(value).map_err(|err| format!("page tokens: {err}"))?;
    map.into_iter()
        .map(|(page_id, token)| {
            PageId::new(page_id)
                .map(|id| (id, AccessToken::new(token)))
                .map_err(|err| format!("page tokens: {err}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

impl OfferRow {
    pub(crate) fn into_domain(self) -> Result<Offer, String> {
        let price = Price::new(self.price).map_err(|err| format!("offer {}: {err}", self.id))?;
        Ok(Offer {
            id: OfferId::from_uuid(self.id),
            restaurant_id: RestaurantId::from_uuid(self.restaurant_id),
            title: self.title,
            description: self.description,
            price,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            tags: self.tags,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = offers)]
pub(crate) struct NewOfferRow<'a> {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub tags: &'a [String],
}

impl<'a> From<&'a Offer> for NewOfferRow<'a> {
    fn from(offer: &'a Offer) -> Self {
        Self {
            id: *offer.id.as_uuid(),
            restaurant_id: *offer.restaurant_id.as_uuid(),
            title: &offer.title,
            description: &offer.description,
            price: offer.price.amount(),
            starts_at: offer.starts_at,
            ends_at: offer.ends_at,
            tags: &offer.tags,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = offers)]
pub(crate) struct OfferUpdate<'a> {
    pub restaurant_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub tags: &'a [String],
}

impl<'a> From<&'a Offer> for OfferUpdate<'a> {
    fn from(offer: &'a Offer) -> Self {
        Self {
            restaurant_id: *offer.restaurant_id.as_uuid(),
            title: &offer.title,
            description: &offer.description,
            price: offer.price.amount(),
            starts_at: offer.starts_at,
            ends_at: offer.ends_at,
            tags: &offer.tags,
        }
    }
}

// ---------------------------------------------------------------------------
// Group posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = offer_group_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupPostRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub date: NaiveDate,
    pub message_template: String,
    pub facebook_post_id: Option<String>,
}

impl GroupPostRow {
    pub(crate) fn into_domain(self) -> OfferGroupPost {
        OfferGroupPost {
            id: GroupPostId::from_uuid(self.id),
            restaurant_id: RestaurantId::from_uuid(self.restaurant_id),
            date: OfferDate::from_naive(self.date),
            message_template: self.message_template,
            facebook_post_id: self.facebook_post_id.and_then(|raw| PostId::new(raw).ok()),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = offer_group_posts)]
pub(crate) struct NewGroupPostRow<'a> {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub date: NaiveDate,
    pub message_template: &'a str,
    pub facebook_post_id: Option<&'a str>,
}

impl<'a> From<&'a OfferGroupPost> for NewGroupPostRow<'a> {
    fn from(post: &'a OfferGroupPost) -> Self {
        Self {
            id: *post.id.as_uuid(),
            restaurant_id: *post.restaurant_id.as_uuid(),
            date: post.date.as_naive(),
            message_template: &post.message_template,
            facebook_post_id: post.facebook_post_id.as_ref().map(PostId::as_str),
        }
    }
}

/// The external id is written even when cleared, so a deleted post never
/// lingers in storage.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = offer_group_posts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupPostUpdate<'a> {
    pub message_template: &'a str,
    pub facebook_post_id: Option<&'a str>,
}

impl<'a> From<&'a OfferGroupPost> for GroupPostUpdate<'a> {
    fn from(post: &'a OfferGroupPost) -> Self {
        Self {
            message_template: &post.message_template,
            facebook_post_id: post.facebook_post_id.as_ref().map(PostId::as_str),
        }
    }
}

// ---------------------------------------------------------------------------
// Registration tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = registration_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationTokenRow {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl RegistrationTokenRow {
    pub(crate) fn into_domain(self) -> RegistrationAccessToken {
        RegistrationAccessToken::from_parts(
            RegistrationTokenId::from_uuid(self.id),
            self.token,
            self.created_at,
        )
    }
}

impl From<&RegistrationAccessToken> for RegistrationTokenRow {
    fn from(token: &RegistrationAccessToken) -> Self {
        Self {
            id: *token.id.as_uuid(),
            token: token.token().to_owned(),
            created_at: token.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::nil(),
            facebook_user_id: "1001".to_owned(),
            restaurant_ids: vec![Uuid::from_u128(7)],
            session_id: Some("abcd".to_owned()),
            access_token: Some("long-lived".to_owned()),
            access_token_expires_at: None,
            page_tokens: json!({ "111": "page-token" }),
        }
    }

    #[test]
    fn user_row_with_session_round_trips_page_tokens() {
        let user = user_row().into_domain().expect("valid row");
        let session = user.session.expect("session");

        let page_id = PageId::new("111").expect("page id");
        assert_eq!(
            session.page_tokens.get(&page_id).map(AccessToken::expose),
            Some("page-token")
        );
        assert_eq!(encode_page_tokens(&session.page_tokens), json!({ "111": "page-token" }));
        assert_eq!(user.restaurant_ids, vec![RestaurantId::from_uuid(Uuid::from_u128(7))]);
    }

    #[test]
    fn user_row_without_token_has_no_session() {
        let row = UserRow {
            access_token: None,
            ..user_row()
        };
        assert!(row.into_domain().expect("valid row").session.is_none());
    }

    #[test]
    fn malformed_page_tokens_are_reported() {
        let row = UserRow {
            page_tokens: json!(["not", "a", "map"]),
            ..user_row()
        };
        assert!(row.into_domain().is_err());
    }

    #[test]
    fn blank_page_id_means_not_connected() {
        let row = RestaurantRow {
            id: Uuid::nil(),
            name: "Soup Kitchen".to_owned(),
            address: String::new(),
            region_id: Uuid::nil(),
            facebook_page_id: Some(String::new()),
            default_group_post_message_template: String::new(),
        };
        assert!(row.into_domain().page_id.is_none());
    }

    #[test]
    fn unknown_region_zone_is_corrupt() {
        let row = RegionRow {
            id: Uuid::nil(),
            name: "Mars".to_owned(),
            location: "Mars/Olympus".to_owned(),
        };
        assert!(row.into_domain().is_err());
    }
}
