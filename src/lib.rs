//! A nanosecond-precision date-time for astronomical data, convertible between
//! the TAI, UTC and TT time scales.
//!
//! # Overview
//!
//! A [`DateTime`] specifies a point in time as a 64-bit signed number of
//! nanoseconds since 1970-01-01 00:00:00 TAI. Because TAI is a uniform time
//! scale, this representation is canonical: two date-times are equal if and
//! only if they designate the same instant, regardless of the time scale or
//! date system used to construct them.
//!
//! A date-time can be constructed from, and converted to:
//!
//! - a number of nanoseconds since 1970-01-01 00:00:00 in any [`TimeScale`],
//! - a floating-point date in any [`DateSystem`] (Julian Date, Modified Julian
//!   Date or Julian epoch year) and any [`TimeScale`],
//! - calendar fields in the proleptic Gregorian calendar,
//! - an ISO8601 string.
//!
//! TT is always exactly 32.184s ahead of TAI. UTC follows TAI by an offset
//! that changes at each leap second and is looked up in a
//! [leap second table](leap_seconds). Since UTC is not defined before the
//! first entry of this table (1961-01-01), any UTC conversion of an earlier
//! date-time is an error.
//!
//! [`DateTime::default()`] is an *invalid* date-time, represented by the
//! reserved [`INVALID_NSECS`] value. All methods producing a value from an
//! invalid date-time return an error rather than a sentinel value.
//!
//!
//! # Features flags
//!
//! ### Support for time-related crates
//!
//! Conversion methods to and from UTC date-time stamps from the [chrono] crate
//! are available with the `chrono` feature.
//!
//! ### Serialization
//!
//! `DateTime` and related error types can be (de)serialized with `serde` by
//! activating the `serde` feature. A `DateTime` is serialized as its raw
//! number of TAI nanoseconds; the [`tai_iso8601`] module can be used with
//! `#[serde(with = "...")]` to serialize it as an ISO8601 TAI string instead.
//!
//! ### TAI system clock
//!
//! On Linux, the `tai_clock` feature provides
//! `DateTime::now_from_tai_clock()`, which reads the `CLOCK_TAI` system clock.
//!
//! [chrono]: https://crates.io/crates/chrono
//!
//!
//! # Examples
//!
//! ```
//! use tai_date_time::{DateSystem, DateTime, TimeScale};
//!
//! // The first second of 2017, right after the last leap second.
//! let t = DateTime::from_iso8601("2017-01-01T00:00:00Z", TimeScale::Utc).unwrap();
//!
//! assert_eq!(
//!     t.to_iso8601(TimeScale::Tai).unwrap(),
//!     "2017-01-01T00:00:37.000000000"
//! );
//! assert_eq!(
//!     t.to_iso8601(TimeScale::Tt).unwrap(),
//!     "2017-01-01T00:01:09.184000000"
//! );
//! assert_eq!(t.get(DateSystem::Mjd, TimeScale::Utc).unwrap(), 57_754.0);
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod date_time;
mod errors;
pub mod leap_seconds;
mod scales;
#[cfg(all(feature = "tai_clock", any(target_os = "linux", target_os = "android")))]
mod tai_clock;
#[cfg(feature = "serde")]
pub mod tai_iso8601;

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use std::time::SystemTime;

use date_time::{fields_to_secs, format_iso8601, parse_iso8601, secs_to_fields};
use scales::{mjd_to_nsecs, nsecs_to_mjd, split_nsecs};

pub use date_time::{CalendarFields, MAX_YEAR, MIN_YEAR};
pub use errors::{DateTimeError, LeapSecondsErrorKind, ParseDateTimeError, ParseLeapSecondsError};
pub use leap_seconds::LeapSecondTable;
pub use scales::{DateSystem, TimeScale, UnknownNameError, TT_MINUS_TAI_NSECS};

/// The reserved number of nanoseconds of an invalid [`DateTime`].
pub const INVALID_NSECS: i64 = i64::MIN;

pub(crate) const NSECS_PER_SEC: i64 = 1_000_000_000;
const NSECS_PER_DAY: i64 = 86_400 * NSECS_PER_SEC;

/// A point in time with nanosecond precision.
///
/// A date-time is stored as the number of nanoseconds since 1970-01-01
/// 00:00:00 TAI. Comparison and hashing only depend on this number.
///
/// A date-time is either valid, or invalid if constructed with
/// [`DateTime::default()`], [`DateTime::INVALID`] or from [`INVALID_NSECS`].
/// An invalid date-time never becomes valid.
///
/// # Examples
///
/// ```
/// use tai_date_time::{DateSystem, DateTime, TimeScale};
///
/// // J2000.0, i.e. 2000-01-01 12:00:00 TT.
/// let j2000 = DateTime::from_date(2000.0, DateSystem::Epoch, TimeScale::Tt).unwrap();
///
/// assert_eq!(j2000.get(DateSystem::Jd, TimeScale::Tt).unwrap(), 2_451_545.0);
/// assert_eq!(
///     j2000.to_iso8601(TimeScale::Tai).unwrap(),
///     "2000-01-01T11:59:27.816000000"
/// );
/// assert_eq!(
///     j2000.to_iso8601(TimeScale::Utc).unwrap(),
///     "2000-01-01T11:58:55.816000000Z"
/// );
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct DateTime {
    /// The number of nanoseconds since 1970-01-01 00:00:00 TAI, or
    /// `INVALID_NSECS`.
    nsecs: i64,
}

/// A number of seconds and nanoseconds since 1970-01-01 00:00:00, the
/// counterpart of the POSIX `struct timespec`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timespec {
    /// Whole seconds, rounded towards `-∞`.
    pub secs: i64,
    /// Nanoseconds in the future of `secs`.
    pub nanos: u32,
}

/// A number of seconds and microseconds since 1970-01-01 00:00:00, the
/// counterpart of the POSIX `struct timeval`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timeval {
    /// Whole seconds, rounded towards `-∞`.
    pub secs: i64,
    /// Whole microseconds in the future of `secs`.
    pub micros: u32,
}

impl DateTime {
    /// The invalid date-time.
    pub const INVALID: Self = Self {
        nsecs: INVALID_NSECS,
    };

    /// Creates a date-time from the number of nanoseconds since 1970-01-01
    /// 00:00:00 TAI.
    ///
    /// This is the lossless counterpart of [`tai_nsecs`](Self::tai_nsecs) and
    /// never fails; [`INVALID_NSECS`] gives an invalid date-time.
    pub const fn from_tai_nsecs(nsecs: i64) -> Self {
        Self { nsecs }
    }

    /// Creates a date-time from the number of nanoseconds since 1970-01-01
    /// 00:00:00 in the specified time scale.
    ///
    /// [`INVALID_NSECS`] gives an invalid date-time, whatever the time scale.
    ///
    /// Returns an error if the time scale is UTC and the date-time predates
    /// the leap second table, or if the date-time is outside the
    /// representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateTime, TimeScale};
    ///
    /// // 2009-02-13 23:31:30.987654321 UTC.
    /// let t = DateTime::from_nsecs(1_234_567_890_987_654_321, TimeScale::Utc).unwrap();
    ///
    /// // TAI − UTC was 34s in 2009.
    /// assert_eq!(t.nsecs(TimeScale::Tai).unwrap(), 1_234_567_924_987_654_321);
    ///
    /// // UTC is not defined in 1960.
    /// assert!(DateTime::from_nsecs(-300_000_000_000_000_000, TimeScale::Utc).is_err());
    /// ```
    pub fn from_nsecs(nsecs: i64, scale: TimeScale) -> Result<Self, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| Self::from_nsecs_with(nsecs, scale, table))
    }

    /// Creates a date-time from the number of nanoseconds since 1970-01-01
    /// 00:00:00 in the specified time scale, using the provided leap second
    /// table.
    ///
    /// See [`from_nsecs`](Self::from_nsecs).
    pub fn from_nsecs_with(
        nsecs: i64,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Self, DateTimeError> {
        if nsecs == INVALID_NSECS {
            return Ok(Self::INVALID);
        }

        scale
            .scale_to_tai(nsecs, leap_seconds)
            .map(Self::from_tai_nsecs)
    }

    /// Creates a date-time from a floating-point date in the specified date
    /// system and time scale.
    ///
    /// The date is rounded to the nearest nanosecond.
    ///
    /// Returns an error if the time scale is UTC and the date-time predates
    /// the leap second table, or if the date is not finite or outside the
    /// representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateSystem, DateTime, TimeScale};
    ///
    /// let t = DateTime::from_date(51_544.0, DateSystem::Mjd, TimeScale::Tai).unwrap();
    ///
    /// assert_eq!(t.to_iso8601(TimeScale::Tai).unwrap(), "2000-01-01T00:00:00.000000000");
    /// ```
    pub fn from_date(
        date: f64,
        system: DateSystem,
        scale: TimeScale,
    ) -> Result<Self, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| {
            Self::from_date_with(date, system, scale, table)
        })
    }

    /// Creates a date-time from a floating-point date in the specified date
    /// system and time scale, using the provided leap second table.
    ///
    /// See [`from_date`](Self::from_date).
    pub fn from_date_with(
        date: f64,
        system: DateSystem,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Self, DateTimeError> {
        let nsecs = mjd_to_nsecs(system.date_to_mjd(date))?;

        scale
            .scale_to_tai(nsecs, leap_seconds)
            .map(Self::from_tai_nsecs)
    }

    /// Creates a date-time from calendar fields in the specified time scale.
    ///
    /// The year must be within [`MIN_YEAR`] and [`MAX_YEAR`]. A second
    /// numeral of 60 is accepted and carries over to the next minute.
    ///
    /// Returns an error if a field is out of range, or if the time scale is
    /// UTC and the date-time predates the leap second table.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateSystem, DateTime, DateTimeError, TimeScale};
    ///
    /// let t = DateTime::from_calendar(2000, 1, 1, 0, 0, 0, TimeScale::Tai).unwrap();
    /// assert_eq!(t.get(DateSystem::Mjd, TimeScale::Tai).unwrap(), 51_544.0);
    ///
    /// assert_eq!(
    ///     DateTime::from_calendar(1900, 1, 1, 0, 0, 0, TimeScale::Tai),
    ///     Err(DateTimeError::InvalidYear(1900))
    /// );
    /// ```
    pub fn from_calendar(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        min: u8,
        sec: u8,
        scale: TimeScale,
    ) -> Result<Self, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| {
            Self::from_calendar_with(year, month, day, hour, min, sec, scale, table)
        })
    }

    /// Creates a date-time from calendar fields in the specified time scale,
    /// using the provided leap second table.
    ///
    /// See [`from_calendar`](Self::from_calendar).
    #[allow(clippy::too_many_arguments)]
    pub fn from_calendar_with(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        min: u8,
        sec: u8,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Self, DateTimeError> {
        // No overflow is possible within the supported range of years.
        let secs = fields_to_secs(year, month, day, hour, min, sec)?;

        scale
            .scale_to_tai(secs * NSECS_PER_SEC, leap_seconds)
            .map(Self::from_tai_nsecs)
    }

    /// Creates a date-time from an ISO8601 string in the specified time
    /// scale.
    ///
    /// The accepted format is the following subset of ISO8601:
    ///
    /// `YYYY-MM-DD'T'hh:mm:ss[.d[d]...[d]][Z]`
    ///
    /// where:
    ///
    /// - the `-` and `:` delimiters are optional,
    /// - the fractional part is optional and its delimiter may be either `.`
    ///   or `,`; digits beyond the nanosecond are ignored,
    /// - the trailing `Z` is required if the time scale is UTC, and forbidden
    ///   otherwise.
    ///
    /// Returns an error if the string does not conform to this format, if the
    /// year is not within [`MIN_YEAR`] and [`MAX_YEAR`], or if the time scale
    /// is UTC and the date-time predates the leap second table.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateTime, TimeScale};
    ///
    /// let t0 = DateTime::from_iso8601("2009-02-13T23:31:30.5Z", TimeScale::Utc).unwrap();
    /// let t1 = DateTime::from_iso8601("20090213T233130,5Z", TimeScale::Utc).unwrap();
    /// assert_eq!(t0, t1);
    ///
    /// // The UTC designator must match the time scale.
    /// assert!(DateTime::from_iso8601("2009-02-13T23:31:30.5", TimeScale::Utc).is_err());
    /// assert!(DateTime::from_iso8601("2009-02-13T23:31:30.5Z", TimeScale::Tai).is_err());
    /// ```
    pub fn from_iso8601(s: &str, scale: TimeScale) -> Result<Self, ParseDateTimeError> {
        leap_seconds::with_table_for(scale, |table| Self::from_iso8601_with(s, scale, table))
    }

    /// Creates a date-time from an ISO8601 string in the specified time
    /// scale, using the provided leap second table.
    ///
    /// See [`from_iso8601`](Self::from_iso8601).
    pub fn from_iso8601_with(
        s: &str,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Self, ParseDateTimeError> {
        let (year, month, day, hour, min, sec, nano) =
            parse_iso8601(s, scale == TimeScale::Utc)?;
        let secs = fields_to_secs(year, month, day, hour, min, sec)?;

        Ok(scale
            .scale_to_tai(secs * NSECS_PER_SEC + nano as i64, leap_seconds)
            .map(Self::from_tai_nsecs)?)
    }

    /// Creates a date-time from the system clock.
    ///
    /// The system clock is assumed to keep UTC, as almost all computers do.
    /// This is a shorthand for `from_system_time(&SystemTime::now())`.
    ///
    /// Returns an error if the system clock predates the leap second table
    /// or if the date-time is outside the representable range.
    pub fn now() -> Result<Self, DateTimeError> {
        Self::from_system_time(&SystemTime::now())
    }

    /// Creates a date-time from a `SystemTime` timestamp, assumed to keep
    /// UTC.
    ///
    /// Returns an error if the date-time predates the leap second table or is
    /// outside the representable range.
    pub fn from_system_time(system_time: &SystemTime) -> Result<Self, DateTimeError> {
        Self::from_system_time_with(system_time, &leap_seconds::current())
    }

    /// Creates a date-time from a `SystemTime` timestamp, assumed to keep
    /// UTC, using the provided leap second table.
    ///
    /// See [`from_system_time`](Self::from_system_time).
    pub fn from_system_time_with(
        system_time: &SystemTime,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Self, DateTimeError> {
        let nsecs = match system_time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => i64::try_from(duration.as_nanos()).ok(),
            Err(err) => i64::try_from(err.duration().as_nanos())
                .ok()
                .map(|nsecs| -nsecs),
        }
        .ok_or(DateTimeError::OutOfRange)?;

        Self::from_nsecs_with(nsecs, TimeScale::Utc, leap_seconds)
    }

    /// Creates a date-time from a `chrono::DateTime`.
    ///
    /// Returns an error if the date-time predates the leap second table or is
    /// outside the representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::TimeZone;
    /// use tai_date_time::{DateTime, TimeScale};
    ///
    /// let date_time = chrono::Utc.with_ymd_and_hms(2001, 9, 15, 5, 5, 0).unwrap();
    /// let t = DateTime::from_chrono_date_time(&date_time).unwrap();
    ///
    /// assert_eq!(
    ///     t.to_iso8601(TimeScale::Tai).unwrap(),
    ///     "2001-09-15T05:05:32.000000000"
    /// );
    /// ```
    #[cfg(feature = "chrono")]
    pub fn from_chrono_date_time<Tz: chrono::TimeZone>(
        date_time: &chrono::DateTime<Tz>,
    ) -> Result<Self, DateTimeError> {
        // The `chrono` crate adds leap seconds to the nanoseconds part, which
        // then carry over to the next second like a second numeral of 60.
        let nsecs = date_time
            .timestamp()
            .checked_mul(NSECS_PER_SEC)
            .and_then(|nsecs| nsecs.checked_add(date_time.timestamp_subsec_nanos() as i64))
            .ok_or(DateTimeError::OutOfRange)?;

        Self::from_nsecs(nsecs, TimeScale::Utc)
    }

    /// Returns whether the date-time is valid.
    pub const fn is_valid(&self) -> bool {
        self.nsecs != INVALID_NSECS
    }

    /// Returns the number of nanoseconds since 1970-01-01 00:00:00 TAI, or
    /// [`INVALID_NSECS`] if the date-time is invalid.
    ///
    /// This is the lossless counterpart of
    /// [`from_tai_nsecs`](Self::from_tai_nsecs), meant for persistence. Use
    /// [`nsecs`](Self::nsecs) for computations.
    pub const fn tai_nsecs(&self) -> i64 {
        self.nsecs
    }

    /// Returns the number of nanoseconds since 1970-01-01 00:00:00 in the
    /// specified time scale.
    ///
    /// Returns an error if the date-time is invalid, if the time scale is UTC
    /// and the date-time predates the leap second table, or if the result is
    /// outside the representable range.
    pub fn nsecs(&self, scale: TimeScale) -> Result<i64, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.nsecs_with(scale, table))
    }

    /// Returns the number of nanoseconds since 1970-01-01 00:00:00 in the
    /// specified time scale, using the provided leap second table.
    ///
    /// See [`nsecs`](Self::nsecs).
    pub fn nsecs_with(
        &self,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<i64, DateTimeError> {
        if !self.is_valid() {
            return Err(DateTimeError::NotValid);
        }

        scale.tai_to_scale(self.nsecs, leap_seconds)
    }

    /// Returns the date as a floating-point number in the specified date
    /// system and time scale.
    ///
    /// Returns an error if the date-time is invalid or if the time scale is
    /// UTC and the date-time predates the leap second table.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateSystem, DateTime, TimeScale};
    ///
    /// let t = DateTime::from_tai_nsecs(0);
    ///
    /// assert_eq!(t.get(DateSystem::Jd, TimeScale::Tai).unwrap(), 2_440_587.5);
    /// assert_eq!(t.get(DateSystem::Mjd, TimeScale::Tai).unwrap(), 40_587.0);
    /// ```
    pub fn get(&self, system: DateSystem, scale: TimeScale) -> Result<f64, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.get_with(system, scale, table))
    }

    /// Returns the date as a floating-point number in the specified date
    /// system and time scale, using the provided leap second table.
    ///
    /// See [`get`](Self::get).
    pub fn get_with(
        &self,
        system: DateSystem,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<f64, DateTimeError> {
        let nsecs = self.nsecs_with(scale, leap_seconds)?;

        Ok(system.mjd_to_date(nsecs_to_mjd(nsecs)))
    }

    /// Returns the Julian Date in the specified time scale.
    ///
    /// This is a shorthand for `get(DateSystem::Jd, scale)`.
    pub fn jd(&self, scale: TimeScale) -> Result<f64, DateTimeError> {
        self.get(DateSystem::Jd, scale)
    }

    /// Returns the Modified Julian Date in the specified time scale.
    ///
    /// This is a shorthand for `get(DateSystem::Mjd, scale)`.
    pub fn mjd(&self, scale: TimeScale) -> Result<f64, DateTimeError> {
        self.get(DateSystem::Mjd, scale)
    }

    /// Returns the Julian epoch year in the specified time scale.
    ///
    /// This is a shorthand for `get(DateSystem::Epoch, scale)`.
    pub fn epoch(&self, scale: TimeScale) -> Result<f64, DateTimeError> {
        self.get(DateSystem::Epoch, scale)
    }

    /// Returns the date-time as an ISO8601 string in the specified time
    /// scale.
    ///
    /// The format is `YYYY-MM-DD'T'hh:mm:ss.nnnnnnnnn`, followed by `Z` if
    /// the time scale is UTC.
    ///
    /// Returns an error if the date-time is invalid or if the time scale is
    /// UTC and the date-time predates the leap second table.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateTime, TimeScale};
    ///
    /// let t = DateTime::from_iso8601("2000-01-01T00:00:00Z", TimeScale::Utc).unwrap();
    ///
    /// assert_eq!(t.to_iso8601(TimeScale::Utc).unwrap(), "2000-01-01T00:00:00.000000000Z");
    /// ```
    pub fn to_iso8601(&self, scale: TimeScale) -> Result<String, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.to_iso8601_with(scale, table))
    }

    /// Returns the date-time as an ISO8601 string in the specified time
    /// scale, using the provided leap second table.
    ///
    /// See [`to_iso8601`](Self::to_iso8601).
    pub fn to_iso8601_with(
        &self,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<String, DateTimeError> {
        let (secs, nanos) = split_nsecs(self.nsecs_with(scale, leap_seconds)?);

        Ok(format_iso8601(secs, nanos, scale == TimeScale::Utc))
    }

    /// Returns the calendar fields in the specified time scale, with
    /// fractional seconds truncated.
    ///
    /// Returns an error if the date-time is invalid or if the time scale is
    /// UTC and the date-time predates the leap second table.
    pub fn gmtime(&self, scale: TimeScale) -> Result<CalendarFields, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.gmtime_with(scale, table))
    }

    /// Returns the calendar fields in the specified time scale, with
    /// fractional seconds truncated, using the provided leap second table.
    ///
    /// See [`gmtime`](Self::gmtime).
    pub fn gmtime_with(
        &self,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<CalendarFields, DateTimeError> {
        let (secs, _) = split_nsecs(self.nsecs_with(scale, leap_seconds)?);

        Ok(secs_to_fields(secs))
    }

    /// Returns the number of seconds and nanoseconds since 1970-01-01
    /// 00:00:00 in the specified time scale.
    ///
    /// Returns an error if the date-time is invalid or if the time scale is
    /// UTC and the date-time predates the leap second table.
    pub fn timespec(&self, scale: TimeScale) -> Result<Timespec, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.timespec_with(scale, table))
    }

    /// Returns the number of seconds and nanoseconds since 1970-01-01
    /// 00:00:00 in the specified time scale, using the provided leap second
    /// table.
    ///
    /// See [`timespec`](Self::timespec).
    pub fn timespec_with(
        &self,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Timespec, DateTimeError> {
        let (secs, nanos) = split_nsecs(self.nsecs_with(scale, leap_seconds)?);

        Ok(Timespec { secs, nanos })
    }

    /// Returns the number of seconds and microseconds since 1970-01-01
    /// 00:00:00 in the specified time scale, with fractional microseconds
    /// truncated.
    ///
    /// Returns an error if the date-time is invalid or if the time scale is
    /// UTC and the date-time predates the leap second table.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::{DateTime, TimeScale, Timeval};
    ///
    /// let t = DateTime::from_tai_nsecs(1_234_567_890_987_654_321);
    ///
    /// assert_eq!(
    ///     t.timeval(TimeScale::Tai).unwrap(),
    ///     Timeval { secs: 1_234_567_890, micros: 987_654 }
    /// );
    /// ```
    pub fn timeval(&self, scale: TimeScale) -> Result<Timeval, DateTimeError> {
        leap_seconds::with_table_for(scale, |table| self.timeval_with(scale, table))
    }

    /// Returns the number of seconds and microseconds since 1970-01-01
    /// 00:00:00 in the specified time scale, with fractional microseconds
    /// truncated, using the provided leap second table.
    ///
    /// See [`timeval`](Self::timeval).
    pub fn timeval_with(
        &self,
        scale: TimeScale,
        leap_seconds: &LeapSecondTable,
    ) -> Result<Timeval, DateTimeError> {
        let (secs, nanos) = split_nsecs(self.nsecs_with(scale, leap_seconds)?);

        Ok(Timeval {
            secs,
            micros: nanos / 1000,
        })
    }

    /// Returns a `SystemTime` based on the UTC date-time.
    ///
    /// Returns an error if the date-time is invalid, predates the leap second
    /// table or cannot be represented as a `SystemTime`.
    pub fn to_system_time(&self) -> Result<SystemTime, DateTimeError> {
        let (secs, nanos) = split_nsecs(self.nsecs(TimeScale::Utc)?);

        let whole_secs = if secs >= 0 {
            SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(secs as u64))
        } else {
            SystemTime::UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))
        };

        whole_secs
            .and_then(|t| t.checked_add(Duration::from_nanos(nanos as u64)))
            .ok_or(DateTimeError::OutOfRange)
    }

    /// Returns a `chrono::DateTime` based on the UTC date-time.
    ///
    /// Returns an error if the date-time is invalid, predates the leap second
    /// table or is outside the range of `chrono::DateTime`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tai_date_time::DateTime;
    ///
    /// // 2000-01-01 00:00:00.123 TAI (1999-12-31 23:59:28.123 UTC).
    /// let t = DateTime::from_tai_nsecs(946_684_800_123_000_000);
    ///
    /// let date_time = t.to_chrono_date_time().unwrap();
    /// assert_eq!(date_time.timestamp(), 946_684_768);
    /// assert_eq!(date_time.timestamp_subsec_millis(), 123);
    /// ```
    #[cfg(feature = "chrono")]
    pub fn to_chrono_date_time(&self) -> Result<chrono::DateTime<chrono::Utc>, DateTimeError> {
        let (secs, nanos) = split_nsecs(self.nsecs(TimeScale::Utc)?);

        chrono::DateTime::from_timestamp(secs, nanos).ok_or(DateTimeError::OutOfRange)
    }
}

impl Default for DateTime {
    /// Returns an invalid date-time.
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for DateTime {
    /// Formats the date-time as an ISO8601 TAI string, or as `INVALID`.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return "INVALID".fmt(fmt);
        }
        let (secs, nanos) = split_nsecs(self.nsecs);

        format_iso8601(secs, nanos, false).fmt(fmt)
    }
}

impl FromStr for DateTime {
    type Err = ParseDateTimeError;

    /// Parses an ISO8601 TAI string.
    ///
    /// See [`DateTime::from_iso8601`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso8601(s, TimeScale::Tai)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const SCALES: [TimeScale; 3] = [TimeScale::Tai, TimeScale::Utc, TimeScale::Tt];
    const SYSTEMS: [DateSystem; 3] = [DateSystem::Jd, DateSystem::Mjd, DateSystem::Epoch];

    // TAI timestamps, all later than the start of the leap second table.
    const SAMPLES: [i64; 7] = [
        -149_999_999_999_999_013,
        0,
        946_684_832_000_000_000,
        1_234_567_924_123_456_789,
        1_483_228_837_000_000_000,
        2_000_000_000_000_000_555,
        4_000_000_000_123_456_789,
    ];

    #[test]
    fn mjd_from_calendar() {
        let t = DateTime::from_calendar(2000, 1, 1, 0, 0, 0, TimeScale::Tai).unwrap();

        assert_eq!(t.get(DateSystem::Mjd, TimeScale::Tai), Ok(51_544.0));
        assert_eq!(t.mjd(TimeScale::Tai), Ok(51_544.0));
    }

    #[test]
    fn jd_of_unix_epoch() {
        let t = DateTime::from_nsecs(0, TimeScale::Tai).unwrap();

        assert_eq!(t.get(DateSystem::Jd, TimeScale::Tai), Ok(2_440_587.5));
        assert_eq!(t.jd(TimeScale::Tai), Ok(2_440_587.5));
    }

    #[test]
    fn j2000_epoch() {
        let t = DateTime::from_date(2_451_545.0, DateSystem::Jd, TimeScale::Tt).unwrap();

        assert_eq!(t.epoch(TimeScale::Tt), Ok(2000.0));
        assert_eq!(t.mjd(TimeScale::Tt), Ok(51_544.5));
        assert_eq!(
            t.to_iso8601(TimeScale::Tt).unwrap(),
            "2000-01-01T12:00:00.000000000"
        );
    }

    #[test]
    fn calendar_year_range() {
        assert_eq!(
            DateTime::from_calendar(1900, 1, 1, 0, 0, 0, TimeScale::Tai),
            Err(DateTimeError::InvalidYear(1900))
        );
        assert_eq!(
            DateTime::from_calendar(2262, 1, 1, 0, 0, 0, TimeScale::Tai),
            Err(DateTimeError::InvalidYear(2262))
        );
        assert!(DateTime::from_calendar(1902, 1, 1, 0, 0, 0, TimeScale::Tai).is_ok());
        assert!(DateTime::from_calendar(2261, 12, 31, 23, 59, 59, TimeScale::Tt).is_ok());
    }

    #[test]
    fn tt_minus_tai() {
        for nsecs in SAMPLES {
            let t = DateTime::from_tai_nsecs(nsecs);

            assert_eq!(
                t.nsecs(TimeScale::Tt).unwrap() - t.nsecs(TimeScale::Tai).unwrap(),
                32_184_000_000
            );
        }
    }

    #[test]
    fn utc_offsets() {
        // 2000-01-01 00:00:00 UTC, with TAI − UTC = 32s.
        let t = DateTime::from_calendar(2000, 1, 1, 0, 0, 0, TimeScale::Utc).unwrap();
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(946_684_832_000_000_000));

        // 1970-01-01 00:00:00 UTC, with TAI − UTC = 8.000082s.
        let t = DateTime::from_nsecs(0, TimeScale::Utc).unwrap();
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(8_000_082_000));
        assert_eq!(t.nsecs(TimeScale::Utc), Ok(0));
    }

    #[test]
    fn utc_leap_second() {
        let before = DateTime::from_calendar(2016, 12, 31, 23, 59, 59, TimeScale::Utc).unwrap();
        let leap = DateTime::from_calendar(2016, 12, 31, 23, 59, 60, TimeScale::Utc).unwrap();
        let after = DateTime::from_calendar(2017, 1, 1, 0, 0, 0, TimeScale::Utc).unwrap();

        assert_eq!(
            after.nsecs(TimeScale::Tai).unwrap() - before.nsecs(TimeScale::Tai).unwrap(),
            2 * NSECS_PER_SEC
        );
        assert_eq!(leap, after);

        // The inserted TAI second is reported as the following UTC second.
        let inserted = DateTime::from_tai_nsecs(before.tai_nsecs() + NSECS_PER_SEC);
        assert_eq!(
            inserted.to_iso8601(TimeScale::Utc).unwrap(),
            "2017-01-01T00:00:00.000000000Z"
        );
    }

    #[test]
    fn utc_before_1961() {
        const ERR: DateTimeError = DateTimeError::UtcBeforeLeapSeconds;

        assert_eq!(
            DateTime::from_calendar(1960, 12, 31, 23, 59, 59, TimeScale::Utc),
            Err(ERR)
        );
        assert_eq!(
            DateTime::from_nsecs(-283_996_800_000_000_001, TimeScale::Utc),
            Err(ERR)
        );
        assert_eq!(
            DateTime::from_date(37_299.99, DateSystem::Mjd, TimeScale::Utc),
            Err(ERR)
        );
        assert_eq!(
            DateTime::from_date(1960.5, DateSystem::Epoch, TimeScale::Utc),
            Err(ERR)
        );
        assert_eq!(
            DateTime::from_iso8601("1960-06-01T00:00:00Z", TimeScale::Utc),
            Err(ParseDateTimeError::RangeError(ERR))
        );
        assert!(DateTime::from_nsecs(-283_996_800_000_000_000, TimeScale::Utc).is_ok());

        let t = DateTime::from_calendar(1960, 6, 1, 0, 0, 0, TimeScale::Tai).unwrap();
        assert_eq!(t.nsecs(TimeScale::Utc), Err(ERR));
        assert_eq!(t.get(DateSystem::Mjd, TimeScale::Utc), Err(ERR));
        assert_eq!(t.get(DateSystem::Jd, TimeScale::Utc), Err(ERR));
        assert_eq!(t.to_iso8601(TimeScale::Utc), Err(ERR));
        assert_eq!(t.gmtime(TimeScale::Utc), Err(ERR));
        assert_eq!(t.timespec(TimeScale::Utc), Err(ERR));
        assert_eq!(t.timeval(TimeScale::Utc), Err(ERR));
        assert!(t.nsecs(TimeScale::Tai).is_ok());
        assert!(t.nsecs(TimeScale::Tt).is_ok());
    }

    #[test]
    fn invalid_date_time() {
        let t = DateTime::default();

        assert!(!t.is_valid());
        assert_eq!(t, DateTime::INVALID);
        assert_eq!(t.tai_nsecs(), INVALID_NSECS);
        for scale in SCALES {
            assert_eq!(t.nsecs(scale), Err(DateTimeError::NotValid));
            assert_eq!(t.to_iso8601(scale), Err(DateTimeError::NotValid));
            assert_eq!(t.gmtime(scale), Err(DateTimeError::NotValid));
            assert_eq!(t.timespec(scale), Err(DateTimeError::NotValid));
            assert_eq!(t.timeval(scale), Err(DateTimeError::NotValid));
            for system in SYSTEMS {
                assert_eq!(t.get(system, scale), Err(DateTimeError::NotValid));
            }
        }
        assert_eq!(t.to_system_time(), Err(DateTimeError::NotValid));
    }

    #[test]
    fn invalid_from_sentinel() {
        for scale in SCALES {
            let t = DateTime::from_nsecs(INVALID_NSECS, scale).unwrap();
            assert!(!t.is_valid());
        }
        assert!(!DateTime::from_tai_nsecs(INVALID_NSECS).is_valid());
        assert!(DateTime::from_tai_nsecs(INVALID_NSECS + 1).is_valid());
    }

    #[test]
    fn nsecs_round_trip() {
        for nsecs in SAMPLES {
            let t = DateTime::from_tai_nsecs(nsecs);

            for scale in SCALES {
                let t_nsecs = t.nsecs(scale).unwrap();
                assert_eq!(DateTime::from_nsecs(t_nsecs, scale), Ok(t));
            }
        }
    }

    #[test]
    fn date_round_trip() {
        for nsecs in SAMPLES {
            let t = DateTime::from_tai_nsecs(nsecs);

            for scale in SCALES {
                for system in SYSTEMS {
                    let tolerance = match system {
                        DateSystem::Mjd => 1_000,
                        DateSystem::Jd | DateSystem::Epoch => 100_000,
                    };
                    let date = t.get(system, scale).unwrap();
                    let t_back = DateTime::from_date(date, system, scale).unwrap();

                    assert!(
                        (t_back.tai_nsecs() - nsecs).abs() <= tolerance,
                        "{} {} {}: {} != {}",
                        system,
                        scale,
                        date,
                        t_back.tai_nsecs(),
                        nsecs
                    );
                }
            }
        }
    }

    #[test]
    fn date_out_of_range() {
        assert_eq!(
            DateTime::from_date(f64::NAN, DateSystem::Mjd, TimeScale::Tai),
            Err(DateTimeError::OutOfRange)
        );
        assert_eq!(
            DateTime::from_date(f64::NEG_INFINITY, DateSystem::Jd, TimeScale::Tt),
            Err(DateTimeError::OutOfRange)
        );
        assert_eq!(
            DateTime::from_date(3000.0, DateSystem::Epoch, TimeScale::Tai),
            Err(DateTimeError::OutOfRange)
        );
        assert!(DateTime::from_date(2200.0, DateSystem::Epoch, TimeScale::Tai).is_ok());
    }

    #[test]
    fn iso8601_utc_round_trip() {
        let t = DateTime::from_iso8601("2000-01-01T00:00:00Z", TimeScale::Utc).unwrap();

        assert_eq!(
            t.to_iso8601(TimeScale::Utc).unwrap(),
            "2000-01-01T00:00:00.000000000Z"
        );
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(946_684_832_000_000_000));

        for nsecs in SAMPLES {
            let t = DateTime::from_tai_nsecs(nsecs);

            for scale in SCALES {
                let s = t.to_iso8601(scale).unwrap();
                assert_eq!(DateTime::from_iso8601(&s, scale), Ok(t), "{}", s);
            }
        }
    }

    #[test]
    fn iso8601_errors() {
        assert_eq!(
            DateTime::from_iso8601("2000-01-01T00:00:00", TimeScale::Utc),
            Err(ParseDateTimeError::MissingUtcDesignator)
        );
        assert_eq!(
            DateTime::from_iso8601("2000-01-01T00:00:00Z", TimeScale::Tt),
            Err(ParseDateTimeError::UnexpectedUtcDesignator)
        );
        assert_eq!(
            DateTime::from_iso8601("1900-01-01T00:00:00", TimeScale::Tai),
            Err(ParseDateTimeError::RangeError(DateTimeError::InvalidYear(1900)))
        );
        assert_eq!(
            DateTime::from_iso8601("2000-02-30T00:00:00", TimeScale::Tai),
            Err(ParseDateTimeError::RangeError(
                DateTimeError::InvalidDayOfMonth(30)
            ))
        );
        assert_eq!(
            DateTime::from_iso8601("2000-01-01", TimeScale::Tai),
            Err(ParseDateTimeError::MissingField)
        );
    }

    #[test]
    fn gmtime_smoke() {
        let t = DateTime::from_iso8601("2009-02-13T23:31:30.987654321Z", TimeScale::Utc).unwrap();

        let fields = t.gmtime(TimeScale::Utc).unwrap();
        assert_eq!(
            (fields.year, fields.month, fields.day),
            (2009, 2, 13)
        );
        assert_eq!(
            (fields.hour, fields.minute, fields.second),
            (23, 31, 30)
        );

        // TAI − UTC was 34s in 2009.
        let fields = t.gmtime(TimeScale::Tai).unwrap();
        assert_eq!(
            (fields.hour, fields.minute, fields.second),
            (23, 32, 4)
        );
    }

    #[test]
    fn timespec_and_timeval() {
        let t = DateTime::from_nsecs(1_234_567_890_987_654_321, TimeScale::Utc).unwrap();

        assert_eq!(
            t.timespec(TimeScale::Utc),
            Ok(Timespec {
                secs: 1_234_567_890,
                nanos: 987_654_321
            })
        );
        assert_eq!(
            t.timeval(TimeScale::Utc),
            Ok(Timeval {
                secs: 1_234_567_890,
                micros: 987_654
            })
        );
        assert_eq!(
            t.timespec(TimeScale::Tai),
            Ok(Timespec {
                secs: 1_234_567_924,
                nanos: 987_654_321
            })
        );
    }

    #[test]
    fn timeval_before_epoch() {
        let t = DateTime::from_tai_nsecs(-1);

        assert_eq!(
            t.timespec(TimeScale::Tai),
            Ok(Timespec {
                secs: -1,
                nanos: 999_999_999
            })
        );
        assert_eq!(
            t.timeval(TimeScale::Tai),
            Ok(Timeval {
                secs: -1,
                micros: 999_999
            })
        );
    }

    #[test]
    fn equality_ignores_construction_scale() {
        let t0 = DateTime::from_iso8601("2012-07-01T00:00:00Z", TimeScale::Utc).unwrap();
        let t1 = DateTime::from_iso8601("2012-07-01T00:00:35", TimeScale::Tai).unwrap();
        let t2 = DateTime::from_iso8601("2012-07-01T00:01:07.184", TimeScale::Tt).unwrap();

        assert_eq!(t0, t1);
        assert_eq!(t1, t2);

        let set: HashSet<DateTime> = [t0, t1, t2].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering() {
        let t0 = DateTime::from_tai_nsecs(-1);
        let t1 = DateTime::from_tai_nsecs(0);

        assert!(t1 > t0);
    }

    #[test]
    fn display_and_from_str() {
        let t = DateTime::from_tai_nsecs(1_234_567_890_123_456_789);

        assert_eq!(t.to_string(), "2009-02-13T23:31:30.123456789");
        assert_eq!("2009-02-13T23:31:30.123456789".parse(), Ok(t));
        assert_eq!(DateTime::INVALID.to_string(), "INVALID");
    }

    #[test]
    fn injected_leap_seconds() {
        let table: LeapSecondTable =
            " 1972 JAN  1 =JD 2441317.5  TAI-UTC=  10.0       S + (MJD - 41317.) X 0.0      S"
                .parse()
                .unwrap();

        // The custom table ignores all leap seconds after 1972.
        let t = DateTime::from_calendar_with(2000, 1, 1, 0, 0, 0, TimeScale::Utc, &table).unwrap();
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(946_684_810_000_000_000));
        assert_eq!(
            t.to_iso8601_with(TimeScale::Utc, &table).unwrap(),
            "2000-01-01T00:00:00.000000000Z"
        );
        assert_eq!(
            t.to_iso8601(TimeScale::Utc).unwrap(),
            "1999-12-31T23:59:38.000000000Z"
        );

        // UTC now starts in 1972.
        assert_eq!(
            DateTime::from_nsecs_with(0, TimeScale::Utc, &table),
            Err(DateTimeError::UtcBeforeLeapSeconds)
        );
        assert_eq!(
            DateTime::from_tai_nsecs(0).get_with(DateSystem::Mjd, TimeScale::Utc, &table),
            Err(DateTimeError::UtcBeforeLeapSeconds)
        );
    }

    #[test]
    fn now_smoke() {
        const START_OF_2022: i64 = 1_640_995_200 * NSECS_PER_SEC;
        const START_OF_2100: i64 = 4_102_444_800 * NSECS_PER_SEC;

        let now = DateTime::now().unwrap().nsecs(TimeScale::Utc).unwrap();

        assert!(now > START_OF_2022);
        assert!(now < START_OF_2100);
    }

    #[test]
    fn system_time_round_trip() {
        // 2001-01-01 12:34:56.789 UTC, with TAI − UTC = 32s.
        let system_time = SystemTime::UNIX_EPOCH + Duration::new(978_352_496, 789_000_000);

        let t = DateTime::from_system_time(&system_time).unwrap();
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(978_352_528_789_000_000));
        assert_eq!(t.to_system_time(), Ok(system_time));

        // 1965-03-31 UTC.
        let system_time = SystemTime::UNIX_EPOCH - Duration::new(150_000_000, 0);
        let t = DateTime::from_system_time(&system_time).unwrap();
        assert_eq!(t.to_system_time(), Ok(system_time));
    }

    #[test]
    fn system_time_before_1961() {
        // 1960-06-30 UTC.
        let system_time = SystemTime::UNIX_EPOCH - Duration::new(300_000_000, 0);

        assert_eq!(
            DateTime::from_system_time(&system_time),
            Err(DateTimeError::UtcBeforeLeapSeconds)
        );
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn chrono_round_trip() {
        use chrono::TimeZone;

        // 2001-01-01 12:34:56 UTC, with TAI − UTC = 32s.
        let date_time = chrono::Utc.with_ymd_and_hms(2001, 1, 1, 12, 34, 56).unwrap();

        let t = DateTime::from_chrono_date_time(&date_time).unwrap();
        assert_eq!(t.nsecs(TimeScale::Tai), Ok(978_352_528_000_000_000));
        assert_eq!(t.to_chrono_date_time(), Ok(date_time));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_raw_nsecs() {
        let t = DateTime::from_tai_nsecs(946_684_832_000_000_000);

        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "946684832000000000");
        assert_eq!(serde_json::from_str::<DateTime>(&json).unwrap(), t);

        let json = serde_json::to_string(&DateTime::INVALID).unwrap();
        assert!(!serde_json::from_str::<DateTime>(&json).unwrap().is_valid());
    }
}
