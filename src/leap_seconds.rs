//! Leap second table.
//!
//! UTC is not a uniform time scale: it follows TAI by a number of seconds
//! that changes at the dates listed in the USNO
//! [`tai-utc.dat`](https://maia.usno.navy.mil/ser7/tai-utc.dat) table. Before
//! 1972 the offset was not a whole number of seconds and drifted linearly
//! between table entries:
//!
//! ```text
//! TAI − UTC = offset + (MJD(UTC) − mjd_ref) × drift
//! ```
//!
//! Since 1972 the drift is null and the offset only changes by whole leap
//! seconds.
//!
//! A [`LeapSecondTable`] may be used directly with the `*_with` methods of
//! [`DateTime`](crate::DateTime), but the other conversion methods consult a
//! process-wide table. This table is initially the bundled
//! [`DEFAULT_LEAP_SECONDS`] table and may be replaced with [`initialize`] or
//! [`install`] whenever the bundled table becomes outdated.
//!
//! Replacing the process-wide table while other threads perform UTC
//! conversions is memory-safe, but those conversions may use either the old
//! or the new table. Applications should install their table once, before
//! performing any conversion.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::date_time::secs_to_fields;
use crate::errors::{LeapSecondsErrorKind, ParseLeapSecondsError};
use crate::scales::{mjd_to_nsecs, nsecs_to_mjd, JD_MINUS_MJD};
use crate::{DateTimeError, TimeScale, NSECS_PER_DAY, NSECS_PER_SEC};

/// The bundled leap second table, in the USNO `tai-utc.dat` layout.
///
/// The last entry is the leap second introduced on 2017-01-01.
pub const DEFAULT_LEAP_SECONDS: &str = "\
 1961 JAN  1 =JD 2437300.5  TAI-UTC=   1.4228180 S + (MJD - 37300.) X 0.001296 S
 1961 AUG  1 =JD 2437512.5  TAI-UTC=   1.3728180 S + (MJD - 37300.) X 0.001296 S
 1962 JAN  1 =JD 2437665.5  TAI-UTC=   1.8458580 S + (MJD - 37665.) X 0.0011232S
 1963 NOV  1 =JD 2438334.5  TAI-UTC=   1.9458580 S + (MJD - 37665.) X 0.0011232S
 1964 JAN  1 =JD 2438395.5  TAI-UTC=   3.2401300 S + (MJD - 38761.) X 0.001296 S
 1964 APR  1 =JD 2438486.5  TAI-UTC=   3.3401300 S + (MJD - 38761.) X 0.001296 S
 1964 SEP  1 =JD 2438639.5  TAI-UTC=   3.4401300 S + (MJD - 38761.) X 0.001296 S
 1965 JAN  1 =JD 2438761.5  TAI-UTC=   3.5401300 S + (MJD - 38761.) X 0.001296 S
 1965 MAR  1 =JD 2438820.5  TAI-UTC=   3.6401300 S + (MJD - 38761.) X 0.001296 S
 1965 JUL  1 =JD 2438942.5  TAI-UTC=   3.7401300 S + (MJD - 38761.) X 0.001296 S
 1965 SEP  1 =JD 2439004.5  TAI-UTC=   3.8401300 S + (MJD - 38761.) X 0.001296 S
 1966 JAN  1 =JD 2439126.5  TAI-UTC=   4.3131700 S + (MJD - 39126.) X 0.002592 S
 1968 FEB  1 =JD 2439887.5  TAI-UTC=   4.2131700 S + (MJD - 39126.) X 0.002592 S
 1972 JAN  1 =JD 2441317.5  TAI-UTC=  10.0       S + (MJD - 41317.) X 0.0      S
 1972 JUL  1 =JD 2441499.5  TAI-UTC=  11.0       S + (MJD - 41317.) X 0.0      S
 1973 JAN  1 =JD 2441683.5  TAI-UTC=  12.0       S + (MJD - 41317.) X 0.0      S
 1974 JAN  1 =JD 2442048.5  TAI-UTC=  13.0       S + (MJD - 41317.) X 0.0      S
 1975 JAN  1 =JD 2442413.5  TAI-UTC=  14.0       S + (MJD - 41317.) X 0.0      S
 1976 JAN  1 =JD 2442778.5  TAI-UTC=  15.0       S + (MJD - 41317.) X 0.0      S
 1977 JAN  1 =JD 2443144.5  TAI-UTC=  16.0       S + (MJD - 41317.) X 0.0      S
 1978 JAN  1 =JD 2443509.5  TAI-UTC=  17.0       S + (MJD - 41317.) X 0.0      S
 1979 JAN  1 =JD 2443874.5  TAI-UTC=  18.0       S + (MJD - 41317.) X 0.0      S
 1980 JAN  1 =JD 2444239.5  TAI-UTC=  19.0       S + (MJD - 41317.) X 0.0      S
 1981 JUL  1 =JD 2444786.5  TAI-UTC=  20.0       S + (MJD - 41317.) X 0.0      S
 1982 JUL  1 =JD 2445151.5  TAI-UTC=  21.0       S + (MJD - 41317.) X 0.0      S
 1983 JUL  1 =JD 2445516.5  TAI-UTC=  22.0       S + (MJD - 41317.) X 0.0      S
 1985 JUL  1 =JD 2446247.5  TAI-UTC=  23.0       S + (MJD - 41317.) X 0.0      S
 1988 JAN  1 =JD 2447161.5  TAI-UTC=  24.0       S + (MJD - 41317.) X 0.0      S
 1990 JAN  1 =JD 2447892.5  TAI-UTC=  25.0       S + (MJD - 41317.) X 0.0      S
 1991 JAN  1 =JD 2448257.5  TAI-UTC=  26.0       S + (MJD - 41317.) X 0.0      S
 1992 JUL  1 =JD 2448804.5  TAI-UTC=  27.0       S + (MJD - 41317.) X 0.0      S
 1993 JUL  1 =JD 2449169.5  TAI-UTC=  28.0       S + (MJD - 41317.) X 0.0      S
 1994 JUL  1 =JD 2449534.5  TAI-UTC=  29.0       S + (MJD - 41317.) X 0.0      S
 1996 JAN  1 =JD 2450083.5  TAI-UTC=  30.0       S + (MJD - 41317.) X 0.0      S
 1997 JUL  1 =JD 2450630.5  TAI-UTC=  31.0       S + (MJD - 41317.) X 0.0      S
 1999 JAN  1 =JD 2451179.5  TAI-UTC=  32.0       S + (MJD - 41317.) X 0.0      S
 2006 JAN  1 =JD 2453736.5  TAI-UTC=  33.0       S + (MJD - 41317.) X 0.0      S
 2009 JAN  1 =JD 2454832.5  TAI-UTC=  34.0       S + (MJD - 41317.) X 0.0      S
 2012 JUL  1 =JD 2456109.5  TAI-UTC=  35.0       S + (MJD - 41317.) X 0.0      S
 2015 JUL  1 =JD 2457204.5  TAI-UTC=  36.0       S + (MJD - 41317.) X 0.0      S
 2017 JAN  1 =JD 2457754.5  TAI-UTC=  37.0       S + (MJD - 41317.) X 0.0      S
";

/// A change of the TAI − UTC offset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeapSecond {
    /// Julian Date at which the entry takes effect, as listed in the table.
    jd: f64,
    /// UTC nanoseconds since the Unix epoch at which the entry takes effect.
    utc: i64,
    /// The same instant in TAI nanoseconds since the Unix epoch.
    tai: i64,
    /// TAI − UTC in seconds at `mjd_ref`.
    offset: f64,
    /// Reference UTC Modified Julian Date of the drift term.
    mjd_ref: f64,
    /// Drift of TAI − UTC in seconds per day.
    drift: f64,
}

impl LeapSecond {
    /// Returns the UTC nanoseconds since the Unix epoch at which this entry
    /// takes effect.
    pub const fn utc_nsecs(&self) -> i64 {
        self.utc
    }

    /// Returns the TAI nanoseconds since the Unix epoch at which this entry
    /// takes effect.
    pub const fn tai_nsecs(&self) -> i64 {
        self.tai
    }

    /// Returns TAI − UTC in seconds at the provided UTC Modified Julian Date,
    /// assuming this entry applies at that date.
    pub fn offset_at(&self, utc_mjd: f64) -> f64 {
        self.offset + (utc_mjd - self.mjd_ref) * self.drift
    }

    /// Returns TAI − UTC in seconds at the provided TAI Modified Julian Date,
    /// assuming this entry applies at that date.
    ///
    /// The drift term is expressed per UTC day, so the TAI date must be
    /// corrected by the (unknown) offset itself.
    fn offset_at_tai(&self, tai_mjd: f64) -> f64 {
        self.offset_at(tai_mjd) / (1.0 + self.drift * NSECS_PER_SEC as f64 / NSECS_PER_DAY as f64)
    }
}

/// An ordered table of TAI − UTC offsets.
///
/// # Examples
///
/// ```
/// use tai_date_time::leap_seconds::LeapSecondTable;
///
/// let table: LeapSecondTable =
///     " 2017 JAN  1 =JD 2457754.5  TAI-UTC=  37.0       S + (MJD - 41317.) X 0.0      S"
///         .parse()
///         .unwrap();
///
/// // 2020-01-01 00:00:00 UTC.
/// assert_eq!(table.offset_for_utc(1_577_836_800_000_000_000), Ok(37.0));
///
/// // 2016-01-01 00:00:00 UTC predates the table.
/// assert!(table.offset_for_utc(1_451_606_400_000_000_000).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LeapSecondTable {
    leaps: Vec<LeapSecond>,
}

impl LeapSecondTable {
    /// Parses a table in the USNO `tai-utc.dat` layout.
    ///
    /// Each non-blank line must have the form:
    ///
    /// ```text
    ///  1968 FEB  1 =JD 2439887.5  TAI-UTC=   4.2131700 S + (MJD - 39126.) X 0.002592 S
    /// ```
    ///
    /// where the drift term `+ (MJD - ...) X ... S` may be omitted. Entries
    /// must be listed in chronological order.
    pub fn parse(text: &str) -> Result<Self, ParseLeapSecondsError> {
        let mut leaps: Vec<LeapSecond> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let error = |kind| ParseLeapSecondsError {
                line: idx + 1,
                kind,
            };

            let leap = parse_line(line).ok_or(error(LeapSecondsErrorKind::MalformedLine))?;
            if let Some(last) = leaps.last() {
                if leap.utc <= last.utc {
                    return Err(error(LeapSecondsErrorKind::NotAscending));
                }
            }
            leaps.push(leap);
        }

        if leaps.is_empty() {
            return Err(ParseLeapSecondsError {
                line: 0,
                kind: LeapSecondsErrorKind::Empty,
            });
        }

        Ok(Self { leaps })
    }

    /// Returns the bundled table.
    ///
    /// See [`DEFAULT_LEAP_SECONDS`].
    pub fn builtin() -> Self {
        Self::parse(DEFAULT_LEAP_SECONDS).expect("the bundled leap second table is well-formed")
    }

    /// Returns the UTC nanoseconds since the Unix epoch of the first entry,
    /// before which UTC is undefined.
    pub fn horizon(&self) -> i64 {
        self.leaps[0].utc
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.leaps.len()
    }

    /// Always returns `false` since a table has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.leaps.is_empty()
    }

    /// Returns an iterator over the entries in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &LeapSecond> {
        self.leaps.iter()
    }

    /// Returns TAI − UTC in seconds at the provided UTC nanoseconds since the
    /// Unix epoch.
    ///
    /// Returns an error if the date predates the first entry.
    pub fn offset_for_utc(&self, utc: i64) -> Result<f64, DateTimeError> {
        let leap = self.find(|leap| leap.utc <= utc)?;

        Ok(leap.offset_at(nsecs_to_mjd(utc)))
    }

    /// Returns TAI − UTC in seconds at the provided TAI nanoseconds since the
    /// Unix epoch.
    ///
    /// Returns an error if the date predates the first entry.
    pub fn offset_for_tai(&self, tai: i64) -> Result<f64, DateTimeError> {
        let leap = self.find(|leap| leap.tai <= tai)?;

        Ok(leap.offset_at_tai(nsecs_to_mjd(tai)))
    }

    /// Converts UTC nanoseconds since the Unix epoch to TAI nanoseconds since
    /// the Unix epoch.
    ///
    /// The offset is rounded to the nearest nanosecond.
    pub fn utc_to_tai(&self, utc: i64) -> Result<i64, DateTimeError> {
        let offset = offset_to_nsecs(self.offset_for_utc(utc)?);

        utc.checked_add(offset).ok_or(DateTimeError::OutOfRange)
    }

    /// Converts TAI nanoseconds since the Unix epoch to UTC nanoseconds since
    /// the Unix epoch.
    ///
    /// During an inserted leap second, the UTC date-time repeats the first
    /// second that follows the leap second.
    pub fn tai_to_utc(&self, tai: i64) -> Result<i64, DateTimeError> {
        let offset = offset_to_nsecs(self.offset_for_tai(tai)?);

        tai.checked_sub(offset).ok_or(DateTimeError::OutOfRange)
    }

    /// Returns the last entry that satisfies the predicate, assuming the
    /// predicate holds for a prefix of the table.
    fn find(&self, is_before: impl FnMut(&LeapSecond) -> bool) -> Result<&LeapSecond, DateTimeError> {
        match self.leaps.partition_point(is_before) {
            0 => Err(DateTimeError::UtcBeforeLeapSeconds),
            idx => Ok(&self.leaps[idx - 1]),
        }
    }
}

impl FromStr for LeapSecondTable {
    type Err = ParseLeapSecondsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for LeapSecondTable {
    /// Writes the table in the USNO `tai-utc.dat` layout, one entry per line.
    ///
    /// Numbers are written with as many digits as needed for the table to be
    /// parsed back identically.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MONTHS: [&str; 12] = [
            "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
        ];

        for leap in &self.leaps {
            let date = secs_to_fields(leap.utc.div_euclid(NSECS_PER_SEC));
            writeln!(
                fmt,
                " {:4} {} {:2} =JD {}  TAI-UTC= {} S + (MJD - {}) X {} S",
                date.year,
                MONTHS[date.month as usize - 1],
                date.day,
                leap.jd,
                leap.offset,
                leap.mjd_ref,
                leap.drift
            )?;
        }

        Ok(())
    }
}

/// Parses a single line of a `tai-utc.dat` table.
fn parse_line(line: &str) -> Option<LeapSecond> {
    fn number(token: &str) -> Option<f64> {
        token.trim().parse().ok().filter(|x: &f64| x.is_finite())
    }

    // The leading calendar date is redundant with the Julian Date.
    let (_, stream) = line.split_once("=JD")?;
    let (jd, stream) = stream.split_once("TAI-UTC=")?;
    let (offset, stream) = stream.split_once('S')?;
    let (jd, offset) = (number(jd)?, number(offset)?);

    let (mjd_ref, drift) = if stream.trim().is_empty() {
        (0.0, 0.0)
    } else {
        let stream = stream
            .trim_start()
            .strip_prefix('+')?
            .trim_start()
            .strip_prefix("(MJD")?
            .trim_start()
            .strip_prefix('-')?;
        let (mjd_ref, stream) = stream.split_once(')')?;
        let drift = stream
            .trim_start()
            .strip_prefix('X')?
            .trim_end()
            .strip_suffix('S')?;

        (number(mjd_ref)?, number(drift)?)
    };

    let mjd = jd - JD_MINUS_MJD;
    let utc = mjd_to_nsecs(mjd).ok()?;
    let offset_nsecs = offset_to_nsecs(offset + (mjd - mjd_ref) * drift);

    Some(LeapSecond {
        jd,
        utc,
        tai: utc.checked_add(offset_nsecs)?,
        offset,
        mjd_ref,
        drift,
    })
}

/// Converts an offset in seconds to the nearest number of nanoseconds.
fn offset_to_nsecs(offset: f64) -> i64 {
    (offset * NSECS_PER_SEC as f64).round() as i64
}

/// Returns the process-wide table, loading the bundled table on first use.
fn shared() -> &'static RwLock<Arc<LeapSecondTable>> {
    static SHARED: OnceLock<RwLock<Arc<LeapSecondTable>>> = OnceLock::new();

    SHARED.get_or_init(|| {
        log::debug!("loading the bundled leap second table");

        RwLock::new(Arc::new(LeapSecondTable::builtin()))
    })
}

/// Returns the process-wide leap second table.
pub fn current() -> Arc<LeapSecondTable> {
    shared()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Calls `f` with the leap second table needed by a conversion to or from the
/// provided time scale.
///
/// Only UTC conversions consult the table, so the process-wide table is not
/// fetched for other scales and an empty table is passed instead.
pub(crate) fn with_table_for<T>(
    scale: TimeScale,
    f: impl FnOnce(&LeapSecondTable) -> T,
) -> T {
    static NO_LEAP_SECONDS: LeapSecondTable = LeapSecondTable { leaps: Vec::new() };

    match scale {
        TimeScale::Utc => f(&current()),
        TimeScale::Tai | TimeScale::Tt => f(&NO_LEAP_SECONDS),
    }
}

/// Replaces the process-wide leap second table.
pub fn install(table: LeapSecondTable) {
    if let Some(last) = table.leaps.last() {
        log::info!(
            "installing a leap second table with {} entries, TAI-UTC={}s since MJD {}",
            table.len(),
            last.offset,
            nsecs_to_mjd(last.utc)
        );
    }

    *shared().write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
}

/// Parses a table in the USNO `tai-utc.dat` layout and makes it the
/// process-wide leap second table.
///
/// The current table is left untouched if the text cannot be parsed.
///
/// See [`LeapSecondTable::parse`] for the expected format.
///
/// # Examples
///
/// ```
/// use tai_date_time::leap_seconds::{self, DEFAULT_LEAP_SECONDS};
///
/// leap_seconds::initialize(DEFAULT_LEAP_SECONDS).unwrap();
///
/// assert!(leap_seconds::initialize("not a table").is_err());
/// ```
pub fn initialize(text: &str) -> Result<(), ParseLeapSecondsError> {
    let table = LeapSecondTable::parse(text).map_err(|err| {
        log::warn!("rejected leap second table: {}", err);
        err
    })?;

    install(table);

    Ok(())
}
