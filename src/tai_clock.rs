use nix::time::{clock_gettime, ClockId};

use crate::{DateTime, DateTimeError, TimeScale, NSECS_PER_SEC};

impl DateTime {
    /// Creates a date-time from the `CLOCK_TAI` system clock.
    ///
    /// Unlike [`DateTime::now`], this does not depend on the leap second
    /// table. Note however that the kernel only keeps TAI if the TAI − UTC
    /// offset was set, typically by an NTP or PTP daemon; otherwise
    /// `CLOCK_TAI` silently returns UTC.
    ///
    /// Returns an error if the clock cannot be read or if the date-time is
    /// outside the representable range.
    pub fn now_from_tai_clock() -> Result<Self, DateTimeError> {
        let ts = clock_gettime(ClockId::CLOCK_TAI).map_err(|err| {
            log::debug!("CLOCK_TAI is not readable: {}", err);

            DateTimeError::ClockUnavailable
        })?;

        let nsecs = i64::from(ts.tv_sec())
            .checked_mul(NSECS_PER_SEC)
            .and_then(|nsecs| nsecs.checked_add(i64::from(ts.tv_nsec())))
            .ok_or(DateTimeError::OutOfRange)?;

        Self::from_nsecs(nsecs, TimeScale::Tai)
    }
}
