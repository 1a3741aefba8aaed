//! UUID-backed entity identifiers.
//!
//! Each aggregate gets its own identifier type so a restaurant id can never be
//! passed where an offer id is expected.

use std::fmt;

/// Validation error raised when parsing an identifier from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdValidationError {
    kind: &'static str,
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id must be a valid UUID", self.kind)
    }
}

impl std::error::Error for IdValidationError {}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Parse an identifier from its hyphenated UUID form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err(IdValidationError { kind: $kind });
                }
                uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId,
    "user"
);
define_uuid_id!(
    /// Identifier of a [`crate::domain::Restaurant`].
    RestaurantId,
    "restaurant"
);
define_uuid_id!(
    /// Identifier of a [`crate::domain::Region`].
    RegionId,
    "region"
);
define_uuid_id!(
    /// Identifier of an [`crate::domain::Offer`].
    OfferId,
    "offer"
);
define_uuid_id!(
    /// Identifier of an [`crate::domain::OfferGroupPost`].
    GroupPostId,
    "group post"
);
define_uuid_id!(
    /// Identifier of a [`crate::domain::RegistrationAccessToken`].
    RegistrationTokenId,
    "registration token"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        let err = OfferId::new(raw).expect_err("malformed id");
        assert_eq!(err.to_string(), "offer id must be a valid UUID");
    }

    #[test]
    fn accepts_hyphenated_uuid() {
        let id = RestaurantId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn serialises_as_plain_string() {
        let id = RegionId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
    }
}
