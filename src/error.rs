//! # Pipeline Errors
//!
//! Every step of the tide/forecast correlation pipeline reports failures through
//! [`TideTempError`]. None of these are fatal to the process: the orchestrator
//! turns them into diagnostic text for the location that produced them.

use thiserror::Error;

/// Failure modes of the fetch → select → locate → match pipeline.
///
/// Variants carry rendered messages rather than the underlying `reqwest` or
/// `serde_json` errors so they can be cloned into diagnostics and compared in
/// tests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TideTempError {
    /// Transport-level failure reaching a remote API
    #[error("network error: {0}")]
    Network(String),

    /// Remote API answered with a non-success status code
    #[error("received non-success status code {status} from {url}")]
    Http { status: u16, url: String },

    /// JSON present but missing or mistyped expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Tide payload empty or entirely unparseable
    #[error("no valid tide predictions found")]
    NoValidPredictions,

    /// No hourly forecast endpoint was resolved to fetch from
    #[error("no hourly forecast endpoint resolved")]
    NoEndpoint,

    /// Forecast fetched, but no period starts in the lowest-tide hour
    #[error("no matching period found for the lowest tide hour ({hour:02})")]
    NoMatchingPeriod { hour: u32 },
}

impl From<serde_json::Error> for TideTempError {
    fn from(err: serde_json::Error) -> Self {
        TideTempError::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for TideTempError {
    fn from(err: reqwest::Error) -> Self {
        TideTempError::Network(err.to_string())
    }
}
