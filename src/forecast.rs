//! # weather.gov Hourly Forecasts
//!
//! Forecasts are a two-step lookup:
//! - `/points/{lat},{lon}` returns `properties.forecastHourly`, the URL of the
//!   hourly forecast for the grid cell containing that point
//! - that URL returns `properties.periods[]`, one entry per hour with
//!   `startTime`/`endTime` (RFC 3339 with offset), `temperature`, `temperatureUnit`
//!
//! Points offshore or on small islands often have no grid cell, which is why
//! every location carries backup coordinates.

use crate::client::ApiClient;
use crate::{Coordinates, ForecastPeriod, TideTempError};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    periods: Vec<RawPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    start_time: String,
    #[serde(default)]
    end_time: Option<String>,
    temperature: i64,
    #[serde(default)]
    temperature_unit: String,
}

/// Points lookup URL for `coords`, at the four decimals weather.gov canonicalises to.
pub fn points_url(base: &str, coords: Coordinates) -> String {
    format!(
        "{}/{:.4},{:.4}",
        base.trim_end_matches('/'),
        coords.lat,
        coords.lon
    )
}

/// Resolve the hourly forecast endpoint serving `coords`.
pub async fn locate(client: &ApiClient, coords: Coordinates) -> Result<String, TideTempError> {
    let url = points_url(&client.api().points_url, coords);
    let body = client.get_text(&url).await?;
    parse_forecast_hourly(&body)
}

/// Extract `properties.forecastHourly` from a points response.
pub fn parse_forecast_hourly(payload: &str) -> Result<String, TideTempError> {
    let value: Value = serde_json::from_str(payload)?;

    let properties = value
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            TideTempError::MalformedResponse("missing properties in points response".to_string())
        })?;

    let endpoint = properties
        .get("forecastHourly")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TideTempError::MalformedResponse(
                "missing forecastHourly in points properties".to_string(),
            )
        })?;

    if endpoint.trim().is_empty() {
        return Err(TideTempError::MalformedResponse(
            "empty forecastHourly in points properties".to_string(),
        ));
    }
    Ok(endpoint.to_string())
}

/// Fetch the hourly forecast payload from a resolved endpoint.
///
/// `None` (or a blank endpoint) means no endpoint was resolved and fails with
/// [`TideTempError::NoEndpoint`] without touching the network.
pub async fn fetch_hourly(
    client: &ApiClient,
    endpoint: Option<&str>,
) -> Result<String, TideTempError> {
    let endpoint = endpoint
        .filter(|e| !e.trim().is_empty())
        .ok_or(TideTempError::NoEndpoint)?;
    client.get_text(endpoint).await
}

/// Parse an hourly forecast payload into periods, in payload order.
///
/// Periods whose `startTime` is not RFC 3339 are dropped.
pub fn parse_periods(payload: &str) -> Result<Vec<ForecastPeriod>, TideTempError> {
    let response: HourlyResponse = serde_json::from_str(payload)?;

    let periods = response
        .properties
        .periods
        .into_iter()
        .filter_map(|raw| {
            let start = match DateTime::parse_from_rfc3339(&raw.start_time) {
                Ok(start) => start,
                Err(e) => {
                    debug!(start = %raw.start_time, error = %e, "skipping forecast period");
                    return None;
                }
            };
            let end = raw
                .end_time
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok());

            Some(ForecastPeriod {
                start,
                end,
                temperature: raw.temperature,
                unit: raw.temperature_unit,
            })
        })
        .collect();

    Ok(periods)
}
