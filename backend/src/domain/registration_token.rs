//! One-off tokens that bootstrap new restaurant registrations.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use super::ids::RegistrationTokenId;
use super::secure_random::random_hex;

const TOKEN_BYTES: usize = 16;

/// Days a registration token stays usable after creation.
///
/// Storage adapters apply this window in their queries; domain code never
/// compares timestamps itself.
pub const REGISTRATION_TOKEN_TTL_DAYS: i64 = 7;

/// [`REGISTRATION_TOKEN_TTL_DAYS`] as a duration.
pub fn registration_token_ttl() -> TimeDelta {
    TimeDelta::days(REGISTRATION_TOKEN_TTL_DAYS)
}

/// Random 128-bit registration token.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationAccessToken {
    /// Stable identifier.
    pub id: RegistrationTokenId,
    token: String,
    /// Creation instant; the TTL counts from here.
    pub created_at: DateTime<Utc>,
}

impl RegistrationAccessToken {
    /// Issue a new token created at `now`.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            id: RegistrationTokenId::random(),
            token: random_hex::<TOKEN_BYTES>(),
            created_at: now,
        }
    }

    /// Rehydrate a stored token.
    pub fn from_parts(id: RegistrationTokenId, token: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            token,
            created_at,
        }
    }

    /// Hex-encoded token value handed to the registering restaurant.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Instant after which storage stops returning the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + registration_token_ttl()
    }
}

impl fmt::Debug for RegistrationAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationAccessToken")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_are_128_bit_hex() {
        let token = RegistrationAccessToken::issue(Utc::now());
        assert_eq!(token.token().len(), 32);
        assert!(token.token().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn expiry_is_seven_days_after_creation() {
        let created_at = DateTime::parse_from_rfc3339("2024-06-03T12:00:00Z")
            .expect("instant")
            .with_timezone(&Utc);
        let token = RegistrationAccessToken::issue(created_at);
        assert_eq!(token.expires_at().to_rfc3339(), "2024-06-10T12:00:00+00:00");
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = RegistrationAccessToken::issue(Utc::now());
        assert!(!format!("{token:?}").contains(token.token()));
    }
}
