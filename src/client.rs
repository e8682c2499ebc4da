//! # HTTP Transport
//!
//! A thin wrapper over a shared `reqwest::Client` used by every fetcher. It
//! owns the endpoint configuration and the one transport timeout the system
//! has, and it classifies failures into [`TideTempError::Network`] and
//! [`TideTempError::Http`]. There is no retry at this layer or any other.

use crate::config::ApiConfig;
use crate::TideTempError;
use anyhow::Context;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP client plus the remote endpoints it talks to.
///
/// `reqwest::Client` is internally reference counted, so an `ApiClient` behind
/// an `Arc` is cheap to share across every location task.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api: ApiConfig,
}

impl ApiClient {
    /// Build the client from `[api]` configuration.
    ///
    /// Failing here means the process cannot start (e.g. TLS backend
    /// initialisation failed), so this returns `anyhow::Result`.
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(api.user_agent.clone())
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(ApiClient {
            http,
            api: api.clone(),
        })
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, TideTempError> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TideTempError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| TideTempError::Network(format!("error reading body: {e}")))?;
        Ok(body)
    }
}
