//! Error types.

use std::fmt;

/// The error type returned when a conversion to or from a
/// [`DateTime`](crate::DateTime) cannot be performed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateTimeError {
    /// A UTC date-time was requested or provided for an instant that predates
    /// the first entry of the leap second table (1961-01-01 for the bundled
    /// table).
    UtcBeforeLeapSeconds,
    /// The result cannot be represented as a 64-bit number of nanoseconds, or
    /// the provided floating-point date is not finite.
    OutOfRange,
    /// A value was requested from an invalid date-time.
    NotValid,
    /// The year is not between 1902 and 2261.
    InvalidYear(i32),
    /// The month is not between 1 and 12.
    InvalidMonth(u8),
    /// The day of the month is less than 1, or more than the maximum value for
    /// this combination of year and month.
    InvalidDayOfMonth(u8),
    /// The hour field value is not between 0 and 23.
    InvalidHour(u8),
    /// The minute field value is not between 0 and 59.
    InvalidMinute(u8),
    /// The second field value is not between 0 and 60.
    InvalidSecond(u8),
    /// The system clock could not be read.
    ClockUnavailable,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UtcBeforeLeapSeconds => {
                "UTC is not defined before the start of the leap second table".fmt(fmt)
            }
            Self::OutOfRange => "timestamp outside representable range".fmt(fmt),
            Self::NotValid => "date-time is not valid".fmt(fmt),
            Self::InvalidYear(year) => {
                write!(fmt, "year '{}' is outside the range [1902, 2261]", year)
            }
            Self::InvalidMonth(month) => write!(fmt, "month numeral '{}' is not valid", month),
            Self::InvalidDayOfMonth(day) => {
                write!(fmt, "day of month '{}' is not valid for this date", day)
            }
            Self::InvalidHour(hour) => write!(fmt, "hour numeral '{}' is not valid", hour),
            Self::InvalidMinute(min) => write!(fmt, "minute numeral '{}' is not valid", min),
            Self::InvalidSecond(sec) => write!(fmt, "second numeral '{}' is not valid", sec),
            Self::ClockUnavailable => "the system clock could not be read".fmt(fmt),
        }
    }
}

impl std::error::Error for DateTimeError {}

/// The error type returned when an ISO8601 date-time string is invalid or
/// corresponds to a date-time that cannot be represented.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseDateTimeError {
    /// A field contains a character that is not a decimal digit.
    InvalidFieldValue,
    /// A fixed-width field has too few digits.
    InvalidFieldWidth,
    /// A field is missing.
    MissingField,
    /// The time scale is UTC but the string lacks the trailing `Z`.
    MissingUtcDesignator,
    /// The time scale is not UTC but the string ends with a `Z`.
    UnexpectedUtcDesignator,
    /// Unexpected characters follow the date-time.
    TrailingCharacters,
    /// One of the field values is out of its expected range, or the
    /// corresponding date-time cannot be represented.
    RangeError(DateTimeError),
}

impl fmt::Display for ParseDateTimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFieldValue => "one of the fields is invalid".fmt(fmt),
            Self::InvalidFieldWidth => "the width of one of the fields is invalid".fmt(fmt),
            Self::MissingField => "a field is missing".fmt(fmt),
            Self::MissingUtcDesignator => "a UTC date-time must end with 'Z'".fmt(fmt),
            Self::UnexpectedUtcDesignator => {
                "only UTC date-times may end with 'Z'".fmt(fmt)
            }
            Self::TrailingCharacters => "unexpected trailing characters".fmt(fmt),
            Self::RangeError(err) => err.fmt(fmt),
        }
    }
}

impl std::error::Error for ParseDateTimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RangeError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DateTimeError> for ParseDateTimeError {
    fn from(err: DateTimeError) -> Self {
        Self::RangeError(err)
    }
}

/// The reason why a leap second table was rejected.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeapSecondsErrorKind {
    /// The line does not follow the USNO `tai-utc.dat` layout.
    MalformedLine,
    /// The line does not take effect strictly after the previous one.
    NotAscending,
    /// The table does not contain any entry.
    Empty,
}

/// The error type returned when a leap second table cannot be parsed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseLeapSecondsError {
    pub(crate) line: usize,
    pub(crate) kind: LeapSecondsErrorKind,
}

impl ParseLeapSecondsError {
    /// Returns the 1-based number of the offending line, or 0 if the table is
    /// empty.
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the reason why the table was rejected.
    pub const fn kind(&self) -> LeapSecondsErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseLeapSecondsError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LeapSecondsErrorKind::MalformedLine => {
                write!(fmt, "malformed leap second entry at line {}", self.line)
            }
            LeapSecondsErrorKind::NotAscending => write!(
                fmt,
                "leap second entry at line {} does not follow the previous entry",
                self.line
            ),
            LeapSecondsErrorKind::Empty => "the leap second table is empty".fmt(fmt),
        }
    }
}

impl std::error::Error for ParseLeapSecondsError {}
