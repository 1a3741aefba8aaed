//! Principal data model: restaurant staff authenticated through Facebook.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::facebook::{AccessToken, FacebookUserId, PageId};
use super::ids::{RestaurantId, UserId};
use super::secure_random::random_hex;

const SESSION_ID_BYTES: usize = 32;
const SESSION_ID_MAX_LEN: usize = 128;

/// Validation errors for [`SessionId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdValidationError {
    /// The id was empty.
    Empty,
    /// The id exceeded the maximum length or contained non-hex characters.
    Malformed,
}

impl fmt::Display for SessionIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "session id must not be empty"),
            Self::Malformed => write!(f, "session id is malformed"),
        }
    }
}

impl std::error::Error for SessionIdValidationError {}

/// Opaque session identifier stored in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random session id.
    pub fn generate() -> Self {
        Self(random_hex::<SESSION_ID_BYTES>())
    }

    /// Validate an id read back from a cookie or storage.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionIdValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SessionIdValidationError::Empty);
        }
        if raw.len() > SESSION_ID_MAX_LEN || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SessionIdValidationError::Malformed);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

/// Page-scoped access tokens keyed by Facebook page id.
///
/// Ordered so that persistence and logging are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTokens(BTreeMap<PageId, AccessToken>);

impl PageTokens {
    /// Empty token set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the token for `page_id`, replacing any previous value.
    pub fn insert(&mut self, page_id: PageId, token: AccessToken) {
        self.0.insert(page_id, token);
    }

    /// Token for `page_id`, if the principal administers that page.
    pub fn get(&self, page_id: &PageId) -> Option<&AccessToken> {
        self.0.get(page_id)
    }

    /// Number of pages covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no page tokens are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(page id, token)` pairs in page id order.
    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &AccessToken)> {
        self.0.iter()
    }
}

impl FromIterator<(PageId, AccessToken)> for PageTokens {
    fn from_iter<T: IntoIterator<Item = (PageId, AccessToken)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Authenticated session attached to a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Opaque id carried by the session cookie.
    pub session_id: SessionId,
    /// Long-lived user token obtained at login.
    pub access_token: AccessToken,
    /// Expiry of `access_token`, when reported by the provider.
    pub expires_at: Option<DateTime<Utc>>,
    /// Page tokens owned by the token propagation service.
    pub page_tokens: PageTokens,
}

/// Restaurant staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Identity-provider id used to match logins.
    pub facebook_user_id: FacebookUserId,
    /// Restaurants this user may manage.
    pub restaurant_ids: Vec<RestaurantId>,
    /// Current session, if logged in.
    pub session: Option<UserSession>,
}

impl User {
    /// Whether this user manages `restaurant_id`.
    pub fn manages(&self, restaurant_id: &RestaurantId) -> bool {
        self.restaurant_ids.contains(restaurant_id)
    }

    /// Page token held for `page_id` in the current session.
    pub fn page_token(&self, page_id: &PageId) -> Option<&AccessToken> {
        self.session
            .as_ref()
            .and_then(|session| session.page_tokens.get(page_id))
    }
}
