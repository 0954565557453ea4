//! (De)serialization of a [`DateTime`] as an ISO8601 TAI string.
//!
//! This module is meant to be used with `#[serde(with = "...")]`. An invalid
//! date-time is represented by the `INVALID` string.
//!
//! Unlike [`DateTime::from_iso8601`], deserialization accepts any year, so
//! that every valid date-time can be read back.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use tai_date_time::DateTime;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Exposure {
//!     #[serde(with = "tai_date_time::tai_iso8601")]
//!     start: DateTime,
//! }
//!
//! let exposure = Exposure {
//!     start: DateTime::from_tai_nsecs(1_234_567_890_123_456_789),
//! };
//!
//! assert_eq!(
//!     serde_json::to_string(&exposure).unwrap(),
//!     r#"{"start":"2009-02-13T23:31:30.123456789"}"#
//! );
//! ```

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

use crate::date_time::{parse_iso8601, unbounded_fields_to_secs};
use crate::{DateTime, DateTimeError, ParseDateTimeError, INVALID_NSECS, NSECS_PER_SEC};

const INVALID: &str = "INVALID";

/// Serializes a date-time as an ISO8601 TAI string.
pub fn serialize<S: Serializer>(date_time: &DateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date_time)
}

/// Deserializes a date-time from an ISO8601 TAI string.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime, D::Error> {
    deserializer.deserialize_str(Iso8601Visitor)
}

struct Iso8601Visitor;

impl<'de> Visitor<'de> for Iso8601Visitor {
    type Value = DateTime;

    fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("an ISO8601 TAI date-time string")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
        if s == INVALID {
            return Ok(DateTime::INVALID);
        }

        parse_tai(s).map_err(E::custom)
    }
}

/// Parses an ISO8601 TAI string over the whole range of `DateTime`.
fn parse_tai(s: &str) -> Result<DateTime, ParseDateTimeError> {
    let (year, month, day, hour, min, sec, nano) = parse_iso8601(s, false)?;
    let secs = unbounded_fields_to_secs(year, month, day, hour, min, sec)?;
    let nsecs = i128::from(secs) * i128::from(NSECS_PER_SEC) + i128::from(nano);

    i64::try_from(nsecs)
        .ok()
        .filter(|&nsecs| nsecs != INVALID_NSECS)
        .map(DateTime::from_tai_nsecs)
        .ok_or(ParseDateTimeError::RangeError(DateTimeError::OutOfRange))
}
