//! Time scales and date systems.

use std::fmt;
use std::str::FromStr;

use crate::leap_seconds::LeapSecondTable;
use crate::{DateTimeError, INVALID_NSECS, NSECS_PER_DAY, NSECS_PER_SEC};

/// Difference TT − TAI in nanoseconds.
pub const TT_MINUS_TAI_NSECS: i64 = 32_184_000_000;

/// Modified Julian Date of 1970-01-01 00:00:00.
pub(crate) const MJD_OF_UNIX_EPOCH: f64 = 40_587.0;

/// Difference JD − MJD in days.
pub(crate) const JD_MINUS_MJD: f64 = 2_400_000.5;

/// Julian Date of the J2000.0 epoch.
pub(crate) const JD_OF_J2000: f64 = 2_451_545.0;

/// Number of days in a Julian year.
pub(crate) const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Largest number of days away from the Unix epoch that fits in a 64-bit
/// nanosecond count.
const MAX_DAYS: f64 = 106_751.99;

/// A time scale.
///
/// TAI and TT are uniform scales separated by a constant offset, while UTC
/// follows TAI by a whole number of leap seconds (and by a drifting
/// fractional offset before 1972).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeScale {
    /// International Atomic Time.
    Tai,
    /// Coordinated Universal Time.
    Utc,
    /// Terrestrial Time.
    Tt,
}

impl TimeScale {
    /// Converts nanoseconds since the Unix epoch in this scale to nanoseconds
    /// since the Unix epoch in TAI.
    pub(crate) fn scale_to_tai(
        self,
        nsecs: i64,
        leap_seconds: &LeapSecondTable,
    ) -> Result<i64, DateTimeError> {
        let tai = match self {
            Self::Tai => Some(nsecs),
            Self::Tt => nsecs.checked_sub(TT_MINUS_TAI_NSECS),
            Self::Utc => Some(leap_seconds.utc_to_tai(nsecs)?),
        };

        // The sentinel is reserved for invalid date-times.
        match tai {
            Some(tai) if tai != INVALID_NSECS => Ok(tai),
            _ => Err(DateTimeError::OutOfRange),
        }
    }

    /// Converts nanoseconds since the Unix epoch in TAI to nanoseconds since
    /// the Unix epoch in this scale.
    pub(crate) fn tai_to_scale(
        self,
        tai: i64,
        leap_seconds: &LeapSecondTable,
    ) -> Result<i64, DateTimeError> {
        match self {
            Self::Tai => Ok(tai),
            Self::Tt => tai
                .checked_add(TT_MINUS_TAI_NSECS)
                .ok_or(DateTimeError::OutOfRange),
            Self::Utc => leap_seconds.tai_to_utc(tai),
        }
    }

    /// Returns the conventional abbreviation of the scale.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tai => "TAI",
            Self::Utc => "UTC",
            Self::Tt => "TT",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(fmt)
    }
}

/// The error type returned when a time scale or date system name is not
/// recognized.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct UnknownNameError(());

impl fmt::Display for UnknownNameError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        "unknown time scale or date system".fmt(fmt)
    }
}

impl std::error::Error for UnknownNameError {}

impl FromStr for TimeScale {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TAI" | "tai" => Ok(Self::Tai),
            "UTC" | "utc" => Ok(Self::Utc),
            "TT" | "tt" => Ok(Self::Tt),
            _ => Err(UnknownNameError(())),
        }
    }
}

/// A representation of a date as a floating-point number of days or years.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateSystem {
    /// Julian Date.
    Jd,
    /// Modified Julian Date, i.e. `JD − 2400000.5`.
    Mjd,
    /// Julian epoch year, i.e. `2000.0 + (JD − 2451545.0) / 365.25`.
    Epoch,
}

impl DateSystem {
    /// Converts a date in this system to a Modified Julian Date.
    pub(crate) fn date_to_mjd(self, date: f64) -> f64 {
        match self {
            Self::Jd => date - JD_MINUS_MJD,
            Self::Mjd => date,
            Self::Epoch => {
                DAYS_PER_JULIAN_YEAR * (date - 2000.0) + JD_OF_J2000 - JD_MINUS_MJD
            }
        }
    }

    /// Converts a Modified Julian Date to a date in this system.
    pub(crate) fn mjd_to_date(self, mjd: f64) -> f64 {
        match self {
            Self::Jd => mjd + JD_MINUS_MJD,
            Self::Mjd => mjd,
            Self::Epoch => 2000.0 + (mjd + JD_MINUS_MJD - JD_OF_J2000) / DAYS_PER_JULIAN_YEAR,
        }
    }

    /// Returns the conventional abbreviation of the system.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jd => "JD",
            Self::Mjd => "MJD",
            Self::Epoch => "EPOCH",
        }
    }
}

impl fmt::Display for DateSystem {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(fmt)
    }
}

impl FromStr for DateSystem {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JD" | "jd" => Ok(Self::Jd),
            "MJD" | "mjd" => Ok(Self::Mjd),
            "EPOCH" | "epoch" => Ok(Self::Epoch),
            _ => Err(UnknownNameError(())),
        }
    }
}

/// Converts nanoseconds since the Unix epoch to a Modified Julian Date within
/// the same scale.
pub(crate) fn nsecs_to_mjd(nsecs: i64) -> f64 {
    let days = nsecs.div_euclid(NSECS_PER_DAY);
    let frac_nsecs = nsecs.rem_euclid(NSECS_PER_DAY);

    days as f64 + MJD_OF_UNIX_EPOCH + frac_nsecs as f64 / NSECS_PER_DAY as f64
}

/// Converts a Modified Julian Date to the nearest number of nanoseconds since
/// the Unix epoch within the same scale.
pub(crate) fn mjd_to_nsecs(mjd: f64) -> Result<i64, DateTimeError> {
    let days = mjd - MJD_OF_UNIX_EPOCH;

    // Also rejects NaN.
    if !(-MAX_DAYS..=MAX_DAYS).contains(&days) {
        return Err(DateTimeError::OutOfRange);
    }

    // Days and nanoseconds are split to avoid losing the nanosecond digits
    // of large dates.
    let whole_days = days.floor();
    let frac_nsecs = ((days - whole_days) * NSECS_PER_DAY as f64).round() as i64;

    (whole_days as i64)
        .checked_mul(NSECS_PER_DAY)
        .and_then(|nsecs| nsecs.checked_add(frac_nsecs))
        .filter(|&nsecs| nsecs != INVALID_NSECS)
        .ok_or(DateTimeError::OutOfRange)
}

/// Splits nanoseconds since the Unix epoch into whole seconds rounded towards
/// `-∞` and a positive number of nanoseconds.
pub(crate) const fn split_nsecs(nsecs: i64) -> (i64, u32) {
    (
        nsecs.div_euclid(NSECS_PER_SEC),
        nsecs.rem_euclid(NSECS_PER_SEC) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tt_is_ahead_of_tai() {
        let table = LeapSecondTable::builtin();

        assert_eq!(
            TimeScale::Tt.tai_to_scale(0, &table),
            Ok(TT_MINUS_TAI_NSECS)
        );
        assert_eq!(
            TimeScale::Tt.scale_to_tai(TT_MINUS_TAI_NSECS, &table),
            Ok(0)
        );
    }

    #[test]
    fn tai_is_identity() {
        let table = LeapSecondTable::builtin();

        assert_eq!(TimeScale::Tai.scale_to_tai(-123, &table), Ok(-123));
        assert_eq!(TimeScale::Tai.tai_to_scale(456, &table), Ok(456));
    }

    #[test]
    fn tt_overflow() {
        let table = LeapSecondTable::builtin();

        assert_eq!(
            TimeScale::Tt.tai_to_scale(i64::MAX, &table),
            Err(DateTimeError::OutOfRange)
        );
        assert_eq!(
            TimeScale::Tt.scale_to_tai(INVALID_NSECS + 1, &table),
            Err(DateTimeError::OutOfRange)
        );
    }

    #[test]
    fn sentinel_is_never_produced() {
        let table = LeapSecondTable::builtin();

        assert_eq!(
            TimeScale::Tt.scale_to_tai(INVALID_NSECS + TT_MINUS_TAI_NSECS, &table),
            Err(DateTimeError::OutOfRange)
        );
    }

    #[test]
    fn date_systems() {
        assert_eq!(DateSystem::Jd.mjd_to_date(51_544.5), JD_OF_J2000);
        assert_eq!(DateSystem::Jd.date_to_mjd(JD_OF_J2000), 51_544.5);
        assert_eq!(DateSystem::Epoch.mjd_to_date(51_544.5), 2000.0);
        assert_eq!(DateSystem::Epoch.date_to_mjd(2000.0), 51_544.5);
        assert_eq!(DateSystem::Mjd.date_to_mjd(12.25), 12.25);
    }

    #[test]
    fn mjd_nsecs() {
        assert_eq!(nsecs_to_mjd(0), MJD_OF_UNIX_EPOCH);
        assert_eq!(mjd_to_nsecs(MJD_OF_UNIX_EPOCH), Ok(0));
        assert_eq!(mjd_to_nsecs(MJD_OF_UNIX_EPOCH - 0.5), Ok(-NSECS_PER_DAY / 2));
        assert_eq!(mjd_to_nsecs(51_544.0), Ok(946_684_800 * NSECS_PER_SEC));
    }

    #[test]
    fn mjd_out_of_range() {
        assert_eq!(mjd_to_nsecs(f64::NAN), Err(DateTimeError::OutOfRange));
        assert_eq!(mjd_to_nsecs(f64::INFINITY), Err(DateTimeError::OutOfRange));
        assert_eq!(
            mjd_to_nsecs(MJD_OF_UNIX_EPOCH + 106_752.0),
            Err(DateTimeError::OutOfRange)
        );
        assert_eq!(
            mjd_to_nsecs(MJD_OF_UNIX_EPOCH - 106_752.0),
            Err(DateTimeError::OutOfRange)
        );
    }

    #[test]
    fn split() {
        assert_eq!(split_nsecs(1_500_000_000), (1, 500_000_000));
        assert_eq!(split_nsecs(-1), (-1, 999_999_999));
        assert_eq!(split_nsecs(-2_000_000_000), (-2, 0));
    }

    #[test]
    fn names() {
        assert_eq!("UTC".parse(), Ok(TimeScale::Utc));
        assert_eq!("mjd".parse(), Ok(DateSystem::Mjd));
        assert!("GPS".parse::<TimeScale>().is_err());
        assert_eq!(TimeScale::Tt.to_string(), "TT");
        assert_eq!(DateSystem::Epoch.to_string(), "EPOCH");
    }
}
