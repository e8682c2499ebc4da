//! Correlate the low-tide time with an hourly forecast period.
//!
//! Matching compares hour numbers only. The tide time is station-local wall
//! clock with no offset; the period start is read in whatever offset it
//! carries. The two are assumed to be the same local zone.

use crate::{ForecastPeriod, TideTempError};
use chrono::{DateTime, FixedOffset, NaiveTime, Timelike};

/// Temperature forecast for the low-tide hour.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedPeriod {
    pub start: DateTime<FixedOffset>,
    pub temperature: i64,
    pub unit: String,
}

/// First period, in payload order, whose start hour equals `tide_time`'s hour.
pub fn match_period(
    periods: &[ForecastPeriod],
    tide_time: NaiveTime,
) -> Result<MatchedPeriod, TideTempError> {
    let hour = tide_time.hour();
    periods
        .iter()
        .find(|p| p.start.hour() == hour)
        .map(|p| MatchedPeriod {
            start: p.start,
            temperature: p.temperature,
            unit: p.unit.clone(),
        })
        .ok_or(TideTempError::NoMatchingPeriod { hour })
}
