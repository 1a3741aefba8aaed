//! Calendar dates and their region-local absolute bounds.
//!
//! Group posts and offer listings are keyed by a calendar date written as
//! `YYYY-MM-DD`. Turning that date into instants always goes through the
//! region's IANA timezone so days that cross a daylight-saving transition are
//! 23 or 25 hours long rather than a fixed 24.

use std::fmt;

use chrono::offset::LocalResult;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const DATE_LAYOUT: &str = "%Y-%m-%d";
const DATE_LEN: usize = 10;

/// Validation errors for [`OfferDate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferDateValidationError {
    /// The value does not follow the exact `YYYY-MM-DD` layout.
    Malformed { value: String },
    /// The following day cannot be represented.
    OutOfRange,
}

impl fmt::Display for OfferDateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { value } => {
                write!(f, "date '{value}' must use the YYYY-MM-DD layout")
            }
            Self::OutOfRange => write!(f, "date is out of the supported range"),
        }
    }
}

impl std::error::Error for OfferDateValidationError {}

/// A calendar date without time of day.
///
/// # Examples
/// ```
/// use backend::domain::OfferDate;
///
/// assert!(OfferDate::parse("2024-06-03").is_ok());
/// assert!(OfferDate::parse("2024-6-3").is_err());
/// assert!(OfferDate::parse("2024/06/03").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OfferDate(NaiveDate);

impl OfferDate {
    /// Parse a date written exactly as `YYYY-MM-DD`.
    ///
    /// Digits must be zero padded and separated by hyphens; chrono's parser
    /// alone would accept unpadded fields.
    pub fn parse(raw: &str) -> Result<Self, OfferDateValidationError> {
        let malformed = || OfferDateValidationError::Malformed {
            value: raw.to_owned(),
        };
        let well_shaped = raw.len() == DATE_LEN
            && raw.bytes().enumerate().all(|(index, byte)| match index {
                4 | 7 => byte == b'-',
                _ => byte.is_ascii_digit(),
            });
        if !well_shaped {
            return Err(malformed());
        }
        NaiveDate::parse_from_str(raw, DATE_LAYOUT)
            .map(Self)
            .map_err(|_| malformed())
    }

    /// Wrap an already validated date.
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The local calendar date of `instant` in `zone`.
    pub fn containing(instant: DateTime<Utc>, zone: Tz) -> Self {
        Self(instant.with_timezone(&zone).date_naive())
    }

    /// Every local calendar date in `zone` that an activity running over
    /// `[starts_at, ends_at)` touches, in order.
    ///
    /// An empty or inverted interval yields the date of `starts_at` only.
    pub fn spanning(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, zone: Tz) -> Vec<Self> {
        let first = Self::containing(starts_at, zone);
        let last = if ends_at > starts_at {
            Self::containing(ends_at - TimeDelta::nanoseconds(1), zone)
        } else {
            first
        };
        first.0.iter_days().take_while(|day| *day <= last.0).map(Self).collect()
    }

    /// Underlying chrono date.
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Absolute interval from local midnight of this date to local midnight
    /// of the next date in `zone`.
    pub fn bounds(&self, zone: Tz) -> Result<DayBounds, OfferDateValidationError> {
        let next = self
            .0
            .checked_add_days(Days::new(1))
            .ok_or(OfferDateValidationError::OutOfRange)?;
        Ok(DayBounds {
            start: local_midnight(self.0, zone),
            end: local_midnight(next, zone),
        })
    }
}

impl fmt::Display for OfferDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_LAYOUT))
    }
}

impl TryFrom<String> for OfferDate {
    type Error = OfferDateValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OfferDate> for String {
    fn from(value: OfferDate) -> Self {
        value.to_string()
    }
}

/// Half-open interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    /// First instant of the day.
    pub start: DateTime<Utc>,
    /// First instant of the following day.
    pub end: DateTime<Utc>,
}

impl DayBounds {
    /// Absolute length of the day.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether an activity running over `[starts_at, ends_at)` overlaps the
    /// day.
    pub fn overlaps(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        starts_at < self.end && ends_at > self.start
    }
}

fn local_midnight(date: NaiveDate, zone: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&midnight) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight falls in a forward jump: the day starts at the transition,
        // which is midnight read with the offset in force before it.
        LocalResult::None => start_of_gap(midnight, zone),
    }
}

fn start_of_gap(midnight: NaiveDateTime, zone: Tz) -> DateTime<Utc> {
    let day_before = midnight - TimeDelta::days(1);
    let offset = zone.offset_from_utc_datetime(&day_before).fix();
    let utc = midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(raw: &str) -> OfferDate {
        OfferDate::parse(raw).expect("valid date")
    }

    #[rstest]
    #[case("2024-6-3")]
    #[case("2024/06/03")]
    #[case("24-06-03")]
    #[case("2024-06-03T00:00")]
    #[case("2024-02-30")]
    #[case(" 2024-06-03")]
    #[case("")]
    fn rejects_anything_but_the_exact_layout(#[case] raw: &str) {
        assert!(OfferDate::parse(raw).is_err(), "{raw} should be rejected");
    }

    #[test]
    fn displays_in_the_parsed_layout() {
        assert_eq!(date("2024-06-03").to_string(), "2024-06-03");
    }

    #[test]
    fn utc_day_is_twenty_four_hours() {
        let bounds = date("2024-06-03").bounds(Tz::UTC).expect("bounds");
        assert_eq!(bounds.start.to_rfc3339(), "2024-06-03T00:00:00+00:00");
        assert_eq!(bounds.end.to_rfc3339(), "2024-06-04T00:00:00+00:00");
    }

    #[test]
    fn tallinn_day_starts_at_local_midnight() {
        let bounds = date("2024-06-03")
            .bounds(chrono_tz::Europe::Tallinn)
            .expect("bounds");
        assert_eq!(bounds.start.to_rfc3339(), "2024-06-02T21:00:00+00:00");
    }

    #[rstest]
    #[case("2024-03-31", 23)]
    #[case("2024-10-27", 25)]
    #[case("2024-06-03", 24)]
    fn tallinn_day_length_follows_dst(#[case] raw: &str, #[case] hours: i64) {
        let bounds = date(raw)
            .bounds(chrono_tz::Europe::Tallinn)
            .expect("bounds");
        assert_eq!(bounds.duration(), TimeDelta::hours(hours));
    }

    #[test]
    fn skipped_midnight_starts_day_at_transition() {
        // Santiago moved clocks from 00:00 to 01:00 on 2022-09-11.
        let bounds = date("2022-09-11")
            .bounds(chrono_tz::America::Santiago)
            .expect("bounds");
        assert_eq!(bounds.start.to_rfc3339(), "2022-09-11T04:00:00+00:00");
        assert_eq!(bounds.duration(), TimeDelta::hours(23));
    }

    #[test]
    fn containing_uses_the_local_calendar() {
        let instant = DateTime::parse_from_rfc3339("2024-06-02T22:30:00Z")
            .expect("instant")
            .with_timezone(&Utc);
        assert_eq!(
            OfferDate::containing(instant, chrono_tz::Europe::Tallinn),
            date("2024-06-03")
        );
        assert_eq!(OfferDate::containing(instant, Tz::UTC), date("2024-06-02"));
    }

    #[rstest]
    #[case("2024-06-03T08:00:00Z", "2024-06-03T11:00:00Z", &["2024-06-03"])]
    #[case("2024-06-03T17:00:00Z", "2024-06-04T09:00:00Z", &["2024-06-03", "2024-06-04"])]
    #[case("2024-06-03T17:00:00Z", "2024-06-05T09:00:00Z", &["2024-06-03", "2024-06-04", "2024-06-05"])]
    #[case("2024-06-03T08:00:00Z", "2024-06-03T21:00:00Z", &["2024-06-03"])]
    #[case("2024-06-03T08:00:00Z", "2024-06-03T08:00:00Z", &["2024-06-03"])]
    fn spanning_lists_every_touched_local_day(
        #[case] starts_at: &str,
        #[case] ends_at: &str,
        #[case] expected: &[&str],
    ) {
        let at = |raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .expect("instant")
                .with_timezone(&Utc)
        };
        let dates = OfferDate::spanning(at(starts_at), at(ends_at), chrono_tz::Europe::Tallinn);
        let expected: Vec<OfferDate> = expected.iter().map(|raw| date(raw)).collect();
        assert_eq!(dates, expected);
    }

    #[test]
    fn overlap_is_half_open() {
        let bounds = date("2024-06-03").bounds(Tz::UTC).expect("bounds");
        let at = |raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .expect("instant")
                .with_timezone(&Utc)
        };
        assert!(bounds.overlaps(at("2024-06-03T11:00:00Z"), at("2024-06-03T14:00:00Z")));
        assert!(!bounds.overlaps(at("2024-06-04T00:00:00Z"), at("2024-06-04T02:00:00Z")));
        assert!(!bounds.overlaps(at("2024-06-02T20:00:00Z"), at("2024-06-03T00:00:00Z")));
    }
}
