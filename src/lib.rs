//! # Tide Pool Temperature Core Library
//!
//! For a fixed table of coastal tide-pool locations, this library finds the
//! time of the day's lowest tide and the forecast air temperature at that hour.
//!
//! ## Data Flow
//!
//! One task per location runs the correlation pipeline:
//! 1. **Tide**: fetch NOAA high/low predictions for a 24-hour window → pick the lowest
//! 2. **Locate**: resolve the weather.gov hourly-forecast endpoint for the primary
//!    and the backup coordinates
//! 3. **Forecast**: fetch hourly periods from the primary endpoint, falling back to
//!    the backup endpoint
//! 4. **Match**: take the first period whose start hour equals the low-tide hour
//!
//! Each task yields one [`orchestrator::OrchestrationResult`]; the
//! [`driver`] collects them and writes one line per location.
//!
//! ## Core Types
//!
//! - [`Location`]: one row of the location table
//! - [`TidePrediction`] / [`LowestTide`]: tide data before and after selection
//! - [`ForecastPeriod`]: one hour of forecast

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod forecast;
pub mod locations;
pub mod matcher;
pub mod orchestrator;
pub mod tide_data;

pub use error::TideTempError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A tide-pool location: where to look up tides and where to look up weather.
///
/// The backup coordinates cover gaps in weather.gov forecast coverage at the
/// primary point (offshore grid cells, islands).
///
/// # Example
/// ```
/// use tidetemp_lib::{Coordinates, Location};
///
/// let loc = Location {
///     name: "Point Loma Tide Pools".to_string(),
///     city: "San Diego".to_string(),
///     state: "CA".to_string(),
///     primary: Coordinates { lat: 32.6731, lon: -117.2425 },
///     station: "9410170".to_string(),
///     backup: Coordinates { lat: 32.7157, lon: -117.1611 },
/// };
/// assert_eq!(loc.station, "9410170");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub city: String,
    pub state: String,
    /// Coordinates tried first for the forecast endpoint
    pub primary: Coordinates,
    /// NOAA tide station id (e.g. "9410170")
    pub station: String,
    /// Coordinates tried when the primary point has no usable forecast
    pub backup: Coordinates,
}

/// High or low extremum, from NOAA's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TideKind {
    Low,
    High,
}

impl TideKind {
    /// Decode NOAA's `"L"` / `"H"` codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "L" => Some(TideKind::Low),
            "H" => Some(TideKind::High),
            _ => None,
        }
    }
}

/// A single well-formed tide prediction in station-local time.
#[derive(Clone, Debug, PartialEq)]
pub struct TidePrediction {
    /// Station-local wall-clock time; NOAA gives no offset
    pub timestamp: NaiveDateTime,
    /// Height in feet above MLLW
    pub value: f64,
    /// `None` for type codes other than L/H
    pub kind: Option<TideKind>,
}

/// The day's lowest tide, reduced to a time of day for hour matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LowestTide {
    /// Hour and minute only; the date is dropped
    pub time: NaiveTime,
    pub value: f64,
}

impl fmt::Display for LowestTide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} ft at {}", self.value, self.time.format("%H:%M"))
    }
}

/// One hourly forecast period.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastPeriod {
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
    pub temperature: i64,
    /// Usually "F"
    pub unit: String,
}
