//! # NOAA Tide Predictions
//!
//! Fetches high/low tide predictions from NOAA's CO-OPS datagetter API and
//! selects the lowest one.
//!
//! ## Data Source
//!
//! ### NOAA Tides and Currents
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Window**: 24 hours starting at the requested date
//! - **Product**: `predictions` at `interval=hilo` (extrema only), datum MLLW,
//!   station-local standard/daylight time, English units
//! - **Format**: JSON
//!
//! ```json
//! {"predictions": [
//!   {"t": "2024-06-01 05:10", "v": "0.421", "type": "L"},
//!   {"t": "2024-06-01 17:42", "v": "3.902", "type": "H"}
//! ]}
//! ```
//!
//! Unknown stations and bad parameters come back as `200 OK` with an
//! `{"error": {"message": ...}}` object instead of `predictions`.
//!
//! ## Selection
//!
//! Records whose value or timestamp does not parse are skipped. The lowest
//! value wins; on a tie the record that appears first in the payload wins.

use crate::client::ApiClient;
use crate::{LowestTide, TideKind, TidePrediction, TideTempError};
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

/// Timestamp layout of the `t` field
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
struct TideResponse {
    #[serde(default)]
    predictions: Vec<RawPrediction>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    t: String,
    v: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Build the datagetter URL for a 24-hour hilo window starting at `date`.
pub fn prediction_url(
    base: &str,
    application: &str,
    station: &str,
    date: NaiveDate,
) -> Result<Url, TideTempError> {
    let begin_date = date.format("%Y%m%d").to_string();
    Url::parse_with_params(
        base,
        &[
            ("begin_date", begin_date.as_str()),
            ("range", "24"),
            ("station", station),
            ("product", "predictions"),
            ("datum", "MLLW"),
            ("time_zone", "lst_ldt"),
            ("interval", "hilo"),
            ("units", "english"),
            ("application", application),
            ("format", "json"),
        ],
    )
    .map_err(|e| TideTempError::MalformedResponse(format!("invalid tide API URL {base}: {e}")))
}

/// Fetch the raw prediction payload for `station` on `date`.
pub async fn fetch(
    client: &ApiClient,
    station: &str,
    date: NaiveDate,
) -> Result<String, TideTempError> {
    let api = client.api();
    let url = prediction_url(&api.tide_url, &api.application, station, date)?;
    client.get_text(url.as_str()).await
}

/// Parse a prediction payload, keeping only well-formed records in payload order.
pub fn parse_predictions(payload: &str) -> Result<Vec<TidePrediction>, TideTempError> {
    let response: TideResponse = serde_json::from_str(payload)?;

    if let Some(err) = response.error {
        return Err(TideTempError::MalformedResponse(format!(
            "tide API reported: {}",
            err.message.trim()
        )));
    }

    let predictions = response
        .predictions
        .into_iter()
        .filter_map(|raw| {
            let value = raw.v.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            let timestamp = NaiveDateTime::parse_from_str(raw.t.trim(), TIMESTAMP_FORMAT).ok();
            match (timestamp, value) {
                (Some(timestamp), Some(value)) => Some(TidePrediction {
                    timestamp,
                    value,
                    kind: TideKind::from_code(&raw.kind),
                }),
                _ => {
                    debug!(t = %raw.t, v = %raw.v, "skipping malformed tide prediction");
                    None
                }
            }
        })
        .collect();

    Ok(predictions)
}

/// Pick the lowest prediction; ties go to the earliest in `predictions`.
pub fn lowest(predictions: &[TidePrediction]) -> Result<LowestTide, TideTempError> {
    let mut best: Option<&TidePrediction> = None;
    for prediction in predictions {
        match best {
            Some(current) if prediction.value >= current.value => {}
            _ => best = Some(prediction),
        }
    }

    best.map(|p| LowestTide {
        time: p.timestamp.time(),
        value: p.value,
    })
    .ok_or(TideTempError::NoValidPredictions)
}

/// Parse `payload` and select its lowest tide.
pub fn select_lowest(payload: &str) -> Result<LowestTide, TideTempError> {
    let predictions = parse_predictions(payload)?;
    lowest(&predictions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn hm(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn test_selects_lowest_of_sample_day() {
        let payload = r#"{"predictions": [
            {"t": "2024-06-01 05:10", "v": "0.421", "type": "L"},
            {"t": "2024-06-01 17:42", "v": "3.902", "type": "H"}
        ]}"#;

        let low = select_lowest(payload).unwrap();
        assert_eq!(low.time, hm(5, 10));
        assert_eq!(low.value, 0.421);
        assert_eq!(low.to_string(), "0.421 ft at 05:10");
    }

    #[test]
    fn test_negative_tide_beats_positive() {
        let payload = r#"{"predictions": [
            {"t": "2024-06-01 00:12", "v": "4.100", "type": "H"},
            {"t": "2024-06-01 06:48", "v": "-1.203", "type": "L"},
            {"t": "2024-06-01 13:30", "v": "3.870", "type": "H"},
            {"t": "2024-06-01 19:02", "v": "1.554", "type": "L"}
        ]}"#;

        let low = select_lowest(payload).unwrap();
        assert_eq!(low.time, hm(6, 48));
        assert_eq!(low.value, -1.203);
    }

    #[test]
    fn test_tie_goes_to_first_occurrence() {
        let payload = r#"{"predictions": [
            {"t": "2024-06-01 03:00", "v": "0.500", "type": "L"},
            {"t": "2024-06-01 09:00", "v": "2.000", "type": "H"},
            {"t": "2024-06-01 15:00", "v": "0.500", "type": "L"}
        ]}"#;

        let low = select_lowest(payload).unwrap();
        assert_eq!(low.time, hm(3, 0));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let payload = r#"{"predictions": [
            {"t": "2024-06-01 02:00", "v": "", "type": "L"},
            {"t": "2024-06-01 08:00", "v": "n/a", "type": "L"},
            {"t": "not a time", "v": "-3.0", "type": "L"},
            {"t": "2024-06-01 14:00", "v": "1.250", "type": "L"}
        ]}"#;

        let predictions = parse_predictions(payload).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].kind, Some(TideKind::Low));

        let low = lowest(&predictions).unwrap();
        assert_eq!(low.time, hm(14, 0));
        assert_eq!(low.value, 1.25);
    }

    #[test]
    fn test_empty_payload_has_no_valid_predictions() {
        assert_eq!(
            select_lowest(r#"{"predictions": []}"#),
            Err(TideTempError::NoValidPredictions)
        );
        assert_eq!(select_lowest("{}"), Err(TideTempError::NoValidPredictions));
    }

    #[test]
    fn test_all_non_numeric_has_no_valid_predictions() {
        let payload = r#"{"predictions": [
            {"t": "2024-06-01 05:10", "v": "low", "type": "L"},
            {"t": "2024-06-01 17:42", "v": "high", "type": "H"}
        ]}"#;
        assert_eq!(select_lowest(payload), Err(TideTempError::NoValidPredictions));
    }

    #[test]
    fn test_api_error_object_is_reported() {
        let payload = r#"{"error": {"message": "No Predictions data was found. Please make sure the Datum input is valid."}}"#;
        match select_lowest(payload) {
            Err(TideTempError::MalformedResponse(msg)) => {
                assert!(msg.contains("No Predictions data was found"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            select_lowest("<html>busy</html>"),
            Err(TideTempError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unknown_type_code_is_kept() {
        let payload = r#"{"predictions": [{"t": "2024-06-01 05:10", "v": "0.1", "type": "X"}]}"#;
        let predictions = parse_predictions(payload).unwrap();
        assert_eq!(predictions[0].kind, None);
    }

    #[test]
    fn test_prediction_url_carries_query() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let url = prediction_url(
            "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter",
            "TidePool",
            "9410170",
            date,
        )
        .unwrap();

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("begin_date"), Some("20240601"));
        assert_eq!(get("range"), Some("24"));
        assert_eq!(get("station"), Some("9410170"));
        assert_eq!(get("product"), Some("predictions"));
        assert_eq!(get("datum"), Some("MLLW"));
        assert_eq!(get("time_zone"), Some("lst_ldt"));
        assert_eq!(get("interval"), Some("hilo"));
        assert_eq!(get("units"), Some("english"));
        assert_eq!(get("application"), Some("TidePool"));
        assert_eq!(get("format"), Some("json"));
    }
}
