//! Identifiers and credentials issued by the Facebook platform.
//!
//! These values are opaque strings owned by the provider. The domain only
//! guarantees they are non-empty and never logs access tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Validation errors for provider-issued identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacebookIdValidationError {
    /// The identifier was empty or whitespace.
    Empty { kind: &'static str },
}

impl fmt::Display for FacebookIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} must not be empty"),
        }
    }
}

impl std::error::Error for FacebookIdValidationError {}

macro_rules! define_provider_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a provider identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, FacebookIdValidationError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(FacebookIdValidationError::Empty { kind: $kind });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Borrow the identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = FacebookIdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_provider_id!(
    /// Facebook user id of a principal.
    FacebookUserId,
    "facebook user id"
);
define_provider_id!(
    /// Facebook page id a restaurant publishes to.
    PageId,
    "page id"
);
define_provider_id!(
    /// Facebook post id returned after publishing.
    PostId,
    "post id"
);

/// Delegated access token (user or page scoped).
///
/// The token is zeroed on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Expose the raw token for use on the wire or in storage.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Long-lived user token obtained from the provider at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// The delegated user token.
    pub access_token: AccessToken,
    /// Lifetime in seconds reported by the provider, when known.
    pub expires_in: Option<u64>,
}

/// A page administered by the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPage {
    /// Provider page id.
    pub id: PageId,
    /// Display name of the page.
    pub name: String,
}
