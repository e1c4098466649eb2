//! Simulated-clock projection for recorded steps.
//!
//! A step's timestamp is `start + step * seconds_per_step`, computed as a
//! single duration addition. The projection is strictly increasing in the
//! step index because a zero step duration is rejected up front.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use reverie_types::Step;

/// Date-only formats written by the simulation engine.
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%Y-%m-%d"];

/// Date-time formats written by the simulation engine.
const DATE_TIME_FORMATS: &[&str] = &[
    "%B %d, %Y, %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Errors that can occur while projecting steps onto the calendar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Steps must advance the clock by at least one second.
    #[error("seconds_per_step must be at least 1")]
    ZeroStepDuration,

    /// The recorded start date is not in a recognised format.
    #[error("unrecognised start date {0:?}")]
    UnparseableDate(String),

    /// The projected timestamp does not fit in the calendar.
    #[error("timestamp for step {step} overflows")]
    Overflow {
        /// The step that could not be projected.
        step: Step,
    },
}

/// Maps step indices to calendar timestamps for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockProjector {
    start: DateTime<Utc>,
    seconds_per_step: u64,
}

impl ClockProjector {
    /// Create a projector anchored at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::ZeroStepDuration`] if `seconds_per_step` is 0.
    pub const fn new(start: DateTime<Utc>, seconds_per_step: u64) -> Result<Self, ClockError> {
        if seconds_per_step == 0 {
            return Err(ClockError::ZeroStepDuration);
        }
        Ok(Self {
            start,
            seconds_per_step,
        })
    }

    /// Create a projector from an engine-formatted start date.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::UnparseableDate`] or
    /// [`ClockError::ZeroStepDuration`].
    pub fn from_start_date(raw: &str, seconds_per_step: u64) -> Result<Self, ClockError> {
        Self::new(parse_start_date(raw)?, seconds_per_step)
    }

    /// Simulated seconds between consecutive steps.
    pub const fn seconds_per_step(&self) -> u64 {
        self.seconds_per_step
    }

    /// Timestamp of `step`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the offset or the resulting
    /// date is out of range.
    pub fn project(&self, step: Step) -> Result<DateTime<Utc>, ClockError> {
        let overflow = || ClockError::Overflow { step };
        let seconds = step.checked_mul(self.seconds_per_step).ok_or_else(overflow)?;
        let seconds = i64::try_from(seconds).ok().ok_or_else(overflow)?;
        let offset = TimeDelta::try_seconds(seconds).ok_or_else(overflow)?;
        self.start.checked_add_signed(offset).ok_or_else(overflow)
    }
}

/// Parse a start date as written by the simulation engine.
///
/// Accepts `"January 1, 2024"`, `"January 1, 2024, 08:30:00"`, ISO dates
/// and date-times, and RFC 3339. Values without an offset are taken as UTC;
/// date-only values are midnight.
///
/// # Errors
///
/// Returns [`ClockError::UnparseableDate`] if no format matches.
pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, ClockError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
        }
    }
    Err(ClockError::UnparseableDate(raw.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn step_zero_is_start() {
        let clock = ClockProjector::new(jan_first(), 60).unwrap();
        assert_eq!(clock.project(0).unwrap(), jan_first());
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        let start = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 50).unwrap();
        let clock = ClockProjector::new(start, 10).unwrap();
        assert_eq!(clock.project(1).unwrap(), jan_first());

        let feb = Utc.with_ymd_and_hms(2024, 2, 28, 23, 0, 0).unwrap();
        let clock = ClockProjector::new(feb, 3600).unwrap();
        assert_eq!(
            clock.project(25).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert_eq!(
            ClockProjector::new(jan_first(), 0),
            Err(ClockError::ZeroStepDuration)
        );
    }

    #[test]
    fn overflow_is_an_error() {
        let clock = ClockProjector::new(jan_first(), u64::MAX).unwrap();
        assert_eq!(clock.project(2), Err(ClockError::Overflow { step: 2 }));
    }

    #[test]
    fn parses_engine_formats() {
        assert_eq!(parse_start_date("January 1, 2024").unwrap(), jan_first());
        assert_eq!(parse_start_date("2024-01-01").unwrap(), jan_first());
        assert_eq!(
            parse_start_date("February 13, 2023, 08:30:00").unwrap(),
            Utc.with_ymd_and_hms(2023, 2, 13, 8, 30, 0).unwrap()
        );
        assert_eq!(
            parse_start_date("2024-01-01T00:00:00Z").unwrap(),
            jan_first()
        );
        assert!(matches!(
            parse_start_date("sometime"),
            Err(ClockError::UnparseableDate(_))
        ));
    }

    proptest! {
        #[test]
        fn projection_is_strictly_increasing(
            step in 0u64..10_000_000,
            seconds_per_step in 1u64..86_400,
        ) {
            let clock = ClockProjector::new(jan_first(), seconds_per_step).unwrap();
            let here = clock.project(step).unwrap();
            let next = clock.project(step + 1).unwrap();
            prop_assert!(next > here);
            prop_assert_eq!(
                (next - here).num_seconds(),
                i64::try_from(seconds_per_step).unwrap()
            );
        }
    }
}
