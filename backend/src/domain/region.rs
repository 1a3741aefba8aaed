//! Regions group restaurants and fix the timezone their calendar days use.

use std::fmt;

use chrono_tz::Tz;

use super::ids::RegionId;

/// Validation errors for [`Region`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionValidationError {
    /// The region name was blank.
    EmptyName,
    /// The location is not an IANA timezone identifier.
    UnknownLocation { location: String },
}

impl fmt::Display for RegionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "region name must not be empty"),
            Self::UnknownLocation { location } => {
                write!(f, "unknown timezone location '{location}'")
            }
        }
    }
}

impl std::error::Error for RegionValidationError {}

/// A geographic region, e.g. a city.
///
/// # Examples
/// ```
/// use backend::domain::{Region, RegionId};
///
/// let region = Region::new(RegionId::random(), "Tallinn", "Europe/Tallinn").unwrap();
/// assert_eq!(region.location().name(), "Europe/Tallinn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: RegionId,
    name: String,
    location: Tz,
}

impl Region {
    /// Validate the name and resolve `location` against the zone database.
    pub fn new(
        id: RegionId,
        name: impl Into<String>,
        location: &str,
    ) -> Result<Self, RegionValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegionValidationError::EmptyName);
        }
        let location = location
            .parse::<Tz>()
            .map_err(|_| RegionValidationError::UnknownLocation {
                location: location.to_owned(),
            })?;
        Ok(Self { id, name, location })
    }

    /// Region identifier.
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Timezone used to turn calendar dates into instants.
    pub fn location(&self) -> Tz {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_location() {
        let err = Region::new(RegionId::random(), "Atlantis", "Ocean/Atlantis")
            .expect_err("unknown zone");
        assert_eq!(
            err,
            RegionValidationError::UnknownLocation {
                location: "Ocean/Atlantis".to_owned()
            }
        );
    }

    #[test]
    fn rejects_blank_name() {
        let err = Region::new(RegionId::random(), " ", "UTC").expect_err("blank");
        assert_eq!(err, RegionValidationError::EmptyName);
    }
}
