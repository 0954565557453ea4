//! Date-time processing.

use crate::{DateTimeError, ParseDateTimeError};

/// Earliest year accepted when constructing from calendar fields.
pub const MIN_YEAR: i32 = 1902;

/// Latest year accepted when constructing from calendar fields.
pub const MAX_YEAR: i32 = 2261;

const SECS_PER_DAY: i64 = 86_400;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_IN_MONTH_LEAP: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DOY_AT_MONTH: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DOY_AT_MONTH_LEAP: [i32; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Number of days from 0000-01-01 to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_YEAR_0: i64 = days_from_year_0(1970);

/// Broken-down calendar date and time in the proleptic Gregorian calendar.
///
/// This is the counterpart of the POSIX `struct tm`, with a 1-based month
/// and an actual year number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CalendarFields {
    /// Year number, e.g. 2009.
    pub year: i32,
    /// Month, from 1 (January) to 12.
    pub month: u8,
    /// Day of the month, from 1.
    pub day: u8,
    /// Hour, from 0 to 23.
    pub hour: u8,
    /// Minute, from 0 to 59.
    pub minute: u8,
    /// Second, from 0 to 59.
    pub second: u8,
    /// Day of the week, from 0 (Sunday) to 6.
    pub weekday: u8,
    /// Day of the year, from 0 (January 1st) to 365.
    pub day_of_year: u16,
}

/// Returns whether the year is a leap year for a 64-bit signed year.
///
/// The argument is the proleptic Gregorian year, with the ISO 8601
/// interpretation of year 0 as year 1 BC. Year 0 does not obey the usual rule
/// and is considered a leap year.
///
/// The whole `i64` value range is supported.
pub(crate) const fn is_leap(year: i64) -> bool {
    (year & 0b11) == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Calculates the number of days in a month.
pub(crate) const fn days_in_month(year: i32, month: u8) -> u8 {
    let month_idx = (month - 1) as usize;

    if is_leap(year as i64) {
        DAYS_IN_MONTH_LEAP[month_idx]
    } else {
        DAYS_IN_MONTH[month_idx]
    }
}

/// Calculates the 0-based day of the year.
pub(crate) const fn day_of_year(year: i32, month: u8, day: u8) -> i32 {
    let month_idx = (month - 1) as usize;
    let table = if is_leap(year as i64) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    (day - 1) as i32 + table[month_idx]
}

/// Calculates the month and the day of the month for a 0-based day of the year.
pub(crate) fn month_and_day_of_month(year: i64, doy: i32) -> (u8, u8) {
    let table = if is_leap(year) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    let idx = table.binary_search(&doy).unwrap_or_else(|e| e - 1);
    let month = idx as u8 + 1;
    let day = (doy - table[idx]) as u8 + 1;

    (month, day)
}

/// Returns the number of elapsed days since the first day of year 0 to the
/// first day of the provided year.
///
/// The argument is the proleptic Gregorian year, with the ISO 8601
/// interpretation of year 0 as year 1 BC.
///
/// The result is negative for negative years.
pub(crate) const fn days_from_year_0(year: i32) -> i64 {
    let year = year as i64;
    let offset = (year > 0) as i64;
    let y = year - offset;
    let m4 = y / 4 + offset;
    let m100 = y / 100;
    let m400 = m100 / 4;

    year * 365 + m4 - m100 + m400
}

/// Returns the year, the day of the year and the second of the day for the
/// provided timestamp.
///
/// This will not overflow provided that the timestamp is in the range ±2^97.
pub(crate) fn secs_to_date_time(secs_from_year_0: i128) -> (i64, i32, i64) {
    // Find the nearest 400-year boundary that is before or at the date. This
    // requires a division with rounding-down behavior even when the timestamp
    // is negative.
    let mut n_period = (secs_from_year_0 / (146097 * 86400)) as i64;
    let mut sec = (secs_from_year_0 % (146097 * 86400)) as i64;
    if sec < 0 {
        n_period -= 1;
        sec += 146097 * 86400;
    }

    // -- `sec` is now guaranteed to be positive.

    let mut year = 400 * n_period;
    let mut day = sec / 86400;
    let sec = sec - day * 86400;
    if day < 366 {
        return (year, day as i32, sec);
    }

    // Find the nearest 100-year, 4-year and 1-year boundaries that are before
    // or at the date.
    for (years_in_period, days_in_period, starts_with_non_leap_year) in
        [(100, 36524, 1), (4, 1461, 0), (1, 365, 1)]
    {
        day -= starts_with_non_leap_year;
        let n_period = day / days_in_period;
        year += years_in_period * n_period;
        day -= n_period * days_in_period;
        if day < (366 - starts_with_non_leap_year) {
            return (year, day as i32, sec);
        }
        day += starts_with_non_leap_year;
    }

    unreachable!();
}

/// Converts calendar fields to the number of seconds since 1970-01-01
/// 00:00:00 within the same time scale.
///
/// A second numeral of 60 is accepted and carries over to the next minute.
pub(crate) fn fields_to_secs(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    min: u8,
    sec: u8,
) -> Result<i64, DateTimeError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(DateTimeError::InvalidYear(year));
    }

    unbounded_fields_to_secs(year, month, day, hour, min, sec)
}

/// Converts calendar fields to the number of seconds since 1970-01-01
/// 00:00:00 within the same time scale, accepting any year from 0 to 9999.
pub(crate) fn unbounded_fields_to_secs(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    min: u8,
    sec: u8,
) -> Result<i64, DateTimeError> {
    if !(0..=9999).contains(&year) {
        return Err(DateTimeError::InvalidYear(year));
    }
    if !(1..=12).contains(&month) {
        return Err(DateTimeError::InvalidMonth(month));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(DateTimeError::InvalidDayOfMonth(day));
    }
    if hour > 23 {
        return Err(DateTimeError::InvalidHour(hour));
    }
    if min > 59 {
        return Err(DateTimeError::InvalidMinute(min));
    }
    if sec > 60 {
        return Err(DateTimeError::InvalidSecond(sec));
    }

    let days = days_from_year_0(year) - UNIX_EPOCH_DAYS_FROM_YEAR_0
        + day_of_year(year, month, day) as i64;

    Ok(days * SECS_PER_DAY + hour as i64 * 3600 + min as i64 * 60 + sec as i64)
}

/// Converts a number of seconds since 1970-01-01 00:00:00 to calendar fields
/// within the same time scale.
pub(crate) fn secs_to_fields(secs: i64) -> CalendarFields {
    let (year, doy, sec) =
        secs_to_date_time(secs as i128 + (UNIX_EPOCH_DAYS_FROM_YEAR_0 * SECS_PER_DAY) as i128);
    let (month, day) = month_and_day_of_month(year, doy);

    // 1970-01-01 was a Thursday.
    let weekday = (secs.div_euclid(SECS_PER_DAY) + 4).rem_euclid(7);

    CalendarFields {
        year: year as i32,
        month,
        day,
        hour: (sec / 3600) as u8,
        minute: (sec / 60 % 60) as u8,
        second: (sec % 60) as u8,
        weekday: weekday as u8,
        day_of_year: doy as u16,
    }
}

/// Parses a restricted subset of ISO8601.
///
/// Expected format:
///
/// `YYYY-MM-DD'T'hh:mm:ss[.d[d]...[d]][Z]`
///
/// where:
///
/// - the `-` and `:` delimiters are optional,
/// - the fractional part is optional and its delimiter may be either `.` or
///   `,`; digits beyond the nanosecond are ignored,
/// - the trailing `Z` is required if `utc` is `true` and forbidden otherwise.
///
/// Field values are not range-checked.
#[allow(clippy::type_complexity)]
pub(crate) fn parse_iso8601(
    stream: &str,
    utc: bool,
) -> Result<(i32, u8, u8, u8, u8, u8, u32), ParseDateTimeError> {
    // Expect exactly `width` leading digits and return them as a single
    // number, together with the remaining part of the stream.
    fn pull_digits(stream: &str, width: usize) -> Result<(u32, &str), ParseDateTimeError> {
        let digits = stream
            .bytes()
            .take(width)
            .take_while(u8::is_ascii_digit)
            .count();

        if digits < width {
            return Err(if digits == 0 && stream.is_empty() {
                ParseDateTimeError::MissingField
            } else if digits == 0 {
                ParseDateTimeError::InvalidFieldValue
            } else {
                ParseDateTimeError::InvalidFieldWidth
            });
        }

        let (token, stream) = stream.split_at(width);
        token
            .parse()
            .map_err(|_| ParseDateTimeError::InvalidFieldValue)
            .map(|token| (token, stream))
    }

    // Skip an optional delimiter.
    fn skip(stream: &str, delimiter: char) -> &str {
        stream.strip_prefix(delimiter).unwrap_or(stream)
    }

    // Pull the date.
    let (year, stream) = pull_digits(stream, 4)?;
    let (month, stream) = pull_digits(skip(stream, '-'), 2)?;
    let (day, stream) = pull_digits(skip(stream, '-'), 2)?;

    // Pull the mandatory date-time delimiter and the time.
    let stream = match stream.strip_prefix('T') {
        Some(stream) => stream,
        None if stream.is_empty() => return Err(ParseDateTimeError::MissingField),
        None => return Err(ParseDateTimeError::InvalidFieldValue),
    };
    let (hour, stream) = pull_digits(stream, 2)?;
    let (min, stream) = pull_digits(skip(stream, ':'), 2)?;
    let (sec, stream) = pull_digits(skip(stream, ':'), 2)?;

    // Parse the fraction.
    let mut nano = 0u32;
    let stream = match stream.strip_prefix(&['.', ','][..]) {
        Some(stream) => {
            let digits = stream.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                return Err(ParseDateTimeError::MissingField);
            }
            let (fraction, stream) = stream.split_at(digits);
            let mut weight = 100_000_000;
            for c in fraction.bytes() {
                nano += (c - b'0') as u32 * weight;
                weight /= 10;
            }

            stream
        }
        None => stream,
    };

    // Check the UTC designator.
    let stream = match (stream.strip_prefix('Z'), utc) {
        (Some(stream), true) => stream,
        (Some(_), false) => return Err(ParseDateTimeError::UnexpectedUtcDesignator),
        (None, true) if stream.is_empty() => {
            return Err(ParseDateTimeError::MissingUtcDesignator)
        }
        (None, _) => stream,
    };
    if !stream.is_empty() {
        return Err(ParseDateTimeError::TrailingCharacters);
    }

    // All values fit: at most 4 digits for the year and 2 for other fields.
    Ok((
        year as i32,
        month as u8,
        day as u8,
        hour as u8,
        min as u8,
        sec as u8,
        nano,
    ))
}

/// Formats a date-time as `YYYY-MM-DD'T'hh:mm:ss.nnnnnnnnn`, followed by `Z`
/// if `utc` is `true`.
pub(crate) fn format_iso8601(secs: i64, nanos: u32, utc: bool) -> String {
    let fields = secs_to_fields(secs);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}{}",
        fields.year,
        fields.month,
        fields.day,
        fields.hour,
        fields.minute,
        fields.second,
        nanos,
        if utc { "Z" } else { "" }
    )
}
