//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every input error becomes `400 invalid_request` with a `details` object
//! naming the offending field, so clients can attach messages to form fields.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{Error, OfferDate, OfferValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidDate,
    InvalidOffer,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidOffer => "invalid_offer",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    ValidationError::new(field, format!("missing required field: {}", field.as_str()))
        .with_code(ErrorCode::MissingField)
}

/// Parse a UUID-backed identifier from a path segment.
pub(crate) fn parse_id<'a, T, E>(
    value: &'a str,
    field: FieldName,
    parse: impl FnOnce(&'a str) -> Result<T, E>,
) -> Result<T, Error> {
    parse(value).map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<OfferDate, Error> {
    OfferDate::parse(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidDate, value)
    })
}

/// Require and parse a `YYYY-MM-DD` query parameter.
pub(crate) fn parse_required_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<OfferDate, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    parse_date(value, field)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::new(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
            )
            .with_value(ErrorCode::InvalidTimestamp, value)
        })
}

/// Map offer validation failures onto the request field that caused them.
pub(crate) fn offer_validation_error(err: OfferValidationError) -> Error {
    let field = match err {
        OfferValidationError::EmptyTitle => FieldName::new("title"),
        OfferValidationError::NegativePrice | OfferValidationError::PriceTooPrecise => {
            FieldName::new("price")
        }
        OfferValidationError::EndsBeforeStart => FieldName::new("endsAt"),
    };
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidOffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, RestaurantId};
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    #[case("2024-6-3")]
    #[case("03.06.2024")]
    #[case("2024-02-30")]
    #[case("")]
    fn malformed_dates_are_invalid_requests(#[case] raw: &str) {
        let err = parse_date(raw, FieldName::new("date")).expect_err("malformed date");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&err, "field"), Some(&Value::from("date")));
        assert_eq!(detail(&err, "code"), Some(&Value::from("invalid_date")));
        assert_eq!(detail(&err, "value"), Some(&Value::from(raw)));
    }

    #[rstest]
    fn missing_date_names_the_field() {
        let err = parse_required_date(None, FieldName::new("date")).expect_err("missing");
        assert_eq!(detail(&err, "code"), Some(&Value::from("missing_field")));
        assert_eq!(err.message(), "missing required field: date");
    }

    #[rstest]
    fn ids_reject_non_uuids() {
        let err = parse_id("nope", FieldName::new("restaurantId"), RestaurantId::new)
            .expect_err("invalid id");
        assert_eq!(err.message(), "restaurantId must be a valid UUID");
        assert_eq!(detail(&err, "code"), Some(&Value::from("invalid_uuid")));
    }

    #[rstest]
    fn timestamps_are_normalised_to_utc() {
        let parsed = parse_rfc3339_timestamp("2024-06-03T11:00:00+03:00", FieldName::new("startsAt"))
            .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2024-06-03T08:00:00+00:00");
    }

    #[rstest]
    #[case(OfferValidationError::EmptyTitle, "title")]
    #[case(OfferValidationError::NegativePrice, "price")]
    #[case(OfferValidationError::PriceTooPrecise, "price")]
    #[case(OfferValidationError::EndsBeforeStart, "endsAt")]
    fn offer_errors_point_at_their_field(
        #[case] err: OfferValidationError,
        #[case] field: &str,
    ) {
        let mapped = offer_validation_error(err);
        assert_eq!(mapped.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&mapped, "field"), Some(&Value::from(field)));
    }
}
