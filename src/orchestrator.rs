//! # Location Orchestrator
//!
//! Runs the whole pipeline for one location and reduces it to a single
//! [`OrchestrationResult`]:
//!
//! 1. Fetch tide predictions for the station; failure aborts the location
//! 2. Select the lowest tide; failure aborts the location
//! 3. Resolve the hourly forecast endpoint for the primary coordinates, then
//!    for the backup coordinates. Both lookups always run.
//! 4. Fetch the hourly forecast from the primary endpoint; if that fails and a
//!    backup endpoint exists, fetch from the backup endpoint
//! 5. Match the period starting in the low-tide hour
//!
//! Failures carry every locator and fetch diagnostic gathered on the way so the
//! output line alone says which stage and which coordinate pair broke.

use crate::client::ApiClient;
use crate::matcher::{self, MatchedPeriod};
use crate::{forecast, tide_data, Coordinates, Location, LowestTide, TideTempError};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info, warn};

/// Which coordinate pair served the forecast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForecastSource {
    Primary,
    Backup,
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastSource::Primary => f.write_str("primary"),
            ForecastSource::Backup => f.write_str("backup"),
        }
    }
}

/// What a successful run found.
#[derive(Clone, Debug, PartialEq)]
pub struct TideTemp {
    pub lowest: LowestTide,
    pub period: MatchedPeriod,
    pub source: ForecastSource,
}

/// Pipeline step a location failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    TideFetch,
    TideSelect,
    HourlyFetch,
    PeriodMatch,
    /// The location's task panicked
    Task,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::TideFetch => "error fetching tide API",
            Stage::TideSelect => "error parsing tide data",
            Stage::HourlyFetch => "error fetching hourly weather API",
            Stage::PeriodMatch => "error parsing hourly weather data",
            Stage::Task => "location task panicked",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub stage: Stage,
    pub reason: String,
    /// Upstream diagnostics, one clause each
    pub context: Vec<String>,
}

impl Failure {
    fn new(stage: Stage, reason: impl fmt::Display, context: Vec<String>) -> Self {
        Failure {
            stage,
            reason: reason.to_string(),
            context,
        }
    }

    pub fn panicked(message: impl fmt::Display) -> Self {
        Failure::new(Stage::Task, message, Vec::new())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}.", self.stage, self.reason)?;
        for clause in &self.context {
            write!(f, " {clause}.")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Ok(TideTemp),
    Failed(Failure),
}

/// The one result each location produces per run.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestrationResult {
    pub name: String,
    pub outcome: Outcome,
}

impl OrchestrationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Ok(_) => None,
        }
    }

    /// Status line with the tide and temperature spelled out on success.
    pub fn detailed_line(&self) -> String {
        match &self.outcome {
            Outcome::Ok(found) => format!(
                "{}: OK (lowest tide {}, {}{} from {} forecast)",
                self.name, found.lowest, found.period.temperature, found.period.unit, found.source
            ),
            Outcome::Failed(_) => self.to_string(),
        }
    }
}

/// `"<name>: OK"` or `"<name>: <diagnostic>"`.
impl fmt::Display for OrchestrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Ok(_) => write!(f, "{}: OK", self.name),
            Outcome::Failed(failure) => write!(f, "{}: {}", self.name, failure),
        }
    }
}

/// Outcome of resolving and fetching one coordinate pair's forecast.
#[derive(Debug)]
struct ForecastAttempt {
    source: ForecastSource,
    endpoint: Option<String>,
    locate_error: Option<TideTempError>,
    fetch_error: Option<TideTempError>,
}

impl ForecastAttempt {
    async fn resolve(client: &ApiClient, source: ForecastSource, coords: Coordinates) -> Self {
        let (endpoint, locate_error) = match forecast::locate(client, coords).await {
            Ok(endpoint) => {
                debug!(%source, %endpoint, "resolved hourly forecast endpoint");
                (Some(endpoint), None)
            }
            Err(e) => {
                warn!(
                    %source,
                    lat = coords.lat,
                    lon = coords.lon,
                    error = %e,
                    "forecast lookup failed"
                );
                (None, Some(e))
            }
        };
        ForecastAttempt {
            source,
            endpoint,
            locate_error,
            fetch_error: None,
        }
    }

    async fn fetch(&mut self, client: &ApiClient) -> Option<String> {
        match forecast::fetch_hourly(client, self.endpoint.as_deref()).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(source = %self.source, error = %e, "hourly forecast fetch failed");
                self.fetch_error = Some(e);
                None
            }
        }
    }
}

/// Locator errors, fetch errors, and resolved endpoints of both attempts.
fn diagnostics(primary: &ForecastAttempt, backup: &ForecastAttempt) -> Vec<String> {
    let mut clauses = Vec::new();
    for attempt in [primary, backup] {
        if let Some(e) = &attempt.locate_error {
            clauses.push(format!("{} location lookup error: {}", attempt.source, e));
        }
    }
    for attempt in [primary, backup] {
        // NoEndpoint only restates the lookup failure above
        match &attempt.fetch_error {
            Some(TideTempError::NoEndpoint) | None => {}
            Some(e) => clauses.push(format!("{} hourly fetch error: {}", attempt.source, e)),
        }
    }
    for attempt in [primary, backup] {
        if let Some(endpoint) = &attempt.endpoint {
            clauses.push(format!("{} URL: {}", attempt.source, endpoint));
        }
    }
    clauses
}

/// Run the full pipeline for `location`, tides for `date`.
pub async fn process_location(
    client: &ApiClient,
    location: &Location,
    date: NaiveDate,
) -> OrchestrationResult {
    let outcome = match correlate(client, location, date).await {
        Ok(found) => {
            info!(
                location = %location.name,
                lowest = %found.lowest,
                temperature = found.period.temperature,
                unit = %found.period.unit,
                source = %found.source,
                "location ok"
            );
            Outcome::Ok(found)
        }
        Err(failure) => {
            info!(location = %location.name, stage = ?failure.stage, "location failed");
            Outcome::Failed(failure)
        }
    };

    OrchestrationResult {
        name: location.name.clone(),
        outcome,
    }
}

async fn correlate(
    client: &ApiClient,
    location: &Location,
    date: NaiveDate,
) -> Result<TideTemp, Failure> {
    let payload = tide_data::fetch(client, &location.station, date)
        .await
        .map_err(|e| Failure::new(Stage::TideFetch, e, Vec::new()))?;

    let lowest = tide_data::select_lowest(&payload)
        .map_err(|e| Failure::new(Stage::TideSelect, e, Vec::new()))?;
    debug!(location = %location.name, station = %location.station, %lowest, "selected lowest tide");

    let mut primary =
        ForecastAttempt::resolve(client, ForecastSource::Primary, location.primary).await;
    let mut backup =
        ForecastAttempt::resolve(client, ForecastSource::Backup, location.backup).await;

    let primary_hourly = primary.fetch(client).await;
    let (hourly, source) = match primary_hourly {
        Some(hourly) => (hourly, ForecastSource::Primary),
        None if backup.endpoint.is_some() => {
            let backup_hourly = backup.fetch(client).await;
            match backup_hourly {
                Some(hourly) => (hourly, ForecastSource::Backup),
                None => {
                    let reason = backup.fetch_error.take().unwrap_or(TideTempError::NoEndpoint);
                    let context = diagnostics(&primary, &backup);
                    return Err(Failure::new(Stage::HourlyFetch, reason, context));
                }
            }
        }
        None => {
            let reason = primary.fetch_error.take().unwrap_or(TideTempError::NoEndpoint);
            let context = diagnostics(&primary, &backup);
            return Err(Failure::new(Stage::HourlyFetch, reason, context));
        }
    };

    let period = forecast::parse_periods(&hourly)
        .and_then(|periods| matcher::match_period(&periods, lowest.time))
        .map_err(|e| Failure::new(Stage::PeriodMatch, e, diagnostics(&primary, &backup)))?;

    Ok(TideTemp {
        lowest,
        period,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(
        source: ForecastSource,
        endpoint: Option<&str>,
        locate_error: Option<TideTempError>,
        fetch_error: Option<TideTempError>,
    ) -> ForecastAttempt {
        ForecastAttempt {
            source,
            endpoint: endpoint.map(str::to_string),
            locate_error,
            fetch_error,
        }
    }

    #[test]
    fn test_diagnostics_list_both_lookups() {
        let primary = attempt(
            ForecastSource::Primary,
            None,
            Some(TideTempError::MalformedResponse("missing forecastHourly".into())),
            Some(TideTempError::NoEndpoint),
        );
        let backup = attempt(
            ForecastSource::Backup,
            Some("https://api.weather.gov/gridpoints/LOX/1,2/forecast/hourly"),
            None,
            None,
        );

        let clauses = diagnostics(&primary, &backup);
        assert_eq!(
            clauses,
            vec![
                "primary location lookup error: malformed response: missing forecastHourly"
                    .to_string(),
                "backup URL: https://api.weather.gov/gridpoints/LOX/1,2/forecast/hourly"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_failure_line_joins_clauses() {
        let result = OrchestrationResult {
            name: "Cape Kiwanda Tide Pools".to_string(),
            outcome: Outcome::Failed(Failure::new(
                Stage::PeriodMatch,
                TideTempError::NoMatchingPeriod { hour: 5 },
                vec!["primary URL: http://a".to_string()],
            )),
        };
        assert_eq!(
            result.to_string(),
            "Cape Kiwanda Tide Pools: error parsing hourly weather data: \
             no matching period found for the lowest tide hour (05). primary URL: http://a."
        );
        assert_eq!(result.detailed_line(), result.to_string());
        assert!(!result.is_ok());
    }
}
