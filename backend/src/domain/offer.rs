//! Lunch offer data model.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::ids::{OfferId, RestaurantId};

const PRICE_SCALE: u32 = 2;

/// Validation errors for offer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferValidationError {
    /// Title was blank.
    EmptyTitle,
    /// Price was below zero.
    NegativePrice,
    /// Price carried more than two fraction digits.
    PriceTooPrecise,
    /// `ends_at` did not come after `starts_at`.
    EndsBeforeStart,
}

impl fmt::Display for OfferValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "offer title must not be empty"),
            Self::NegativePrice => write!(f, "offer price must not be negative"),
            Self::PriceTooPrecise => write!(f, "offer price must have at most two decimals"),
            Self::EndsBeforeStart => write!(f, "offer must end after it starts"),
        }
    }
}

impl std::error::Error for OfferValidationError {}

/// Non-negative fixed-point price with at most two fraction digits.
///
/// # Examples
/// ```
/// use backend::domain::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(35, 1)).unwrap();
/// assert_eq!(price.to_two_decimals(), "3.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Validate a decimal amount.
    pub fn new(amount: Decimal) -> Result<Self, OfferValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(OfferValidationError::NegativePrice);
        }
        let normalized = amount.normalize();
        if normalized.scale() > PRICE_SCALE {
            return Err(OfferValidationError::PriceTooPrecise);
        }
        Ok(Self(normalized))
    }

    /// Raw decimal amount.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount rendered with exactly two fraction digits, e.g. `3.50`.
    pub fn to_two_decimals(&self) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(PRICE_SCALE);
        rounded.to_string()
    }
}

impl TryFrom<Decimal> for Price {
    type Error = OfferValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

/// Validated offer fields supplied by restaurant staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    title: String,
    description: String,
    price: Price,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    tags: Vec<String>,
}

impl OfferDraft {
    /// Validate raw offer fields.
    ///
    /// Titles and tags are trimmed; blank tags are dropped.
    pub fn new(
        title: &str,
        description: &str,
        price: Price,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        tags: Vec<String>,
    ) -> Result<Self, OfferValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(OfferValidationError::EmptyTitle);
        }
        if ends_at <= starts_at {
            return Err(OfferValidationError::EndsBeforeStart);
        }
        let tags = tags
            .into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect();
        Ok(Self {
            title: title.to_owned(),
            description: description.trim().to_owned(),
            price,
            starts_at,
            ends_at,
            tags,
        })
    }

    /// Start instant of the draft.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Materialise the draft as an offer with the given identity.
    pub fn into_offer(self, id: OfferId, restaurant_id: RestaurantId) -> Offer {
        Offer {
            id,
            restaurant_id,
            title: self.title,
            description: self.description,
            price: self.price,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            tags: self.tags,
        }
    }
}

/// A lunch offer of one restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Stable identifier.
    pub id: OfferId,
    /// Restaurant serving the offer.
    pub restaurant_id: RestaurantId,
    /// Dish name shown in listings and group posts.
    pub title: String,
    /// Optional longer description.
    pub description: String,
    /// Price in the configured currency.
    pub price: Price,
    /// Start of availability.
    pub starts_at: DateTime<Utc>,
    /// End of availability.
    pub ends_at: DateTime<Utc>,
    /// Free-form tags such as `vegan`.
    pub tags: Vec<String>,
}
