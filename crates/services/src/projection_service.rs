use std::env;

use chrono::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProjectionError;

#[derive(Clone, Debug)]
pub struct ProjectionConfig {
    pub base_url: String,
}

impl ProjectionConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("AAC_PROJECTION_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }
}

/// One element of the duration series sent to the smoothing endpoint,
/// expressed in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndependenceDuration {
    #[serde(rename = "timeTakenIndependence")]
    pub time_taken_independence: f64,
}

impl IndependenceDuration {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            time_taken_independence: duration.num_milliseconds() as f64,
        }
    }
}

/// Client for the external exponential-smoothing forecast endpoint.
///
/// This service owns request/response shaping only; the forecasting
/// algorithm lives on the other side of the wire. The naive estimate in the
/// phase aggregator is the fallback surface when this service is
/// unconfigured or failing — this client never invents a value itself.
#[derive(Clone)]
pub struct ProjectionService {
    client: Client,
    config: Option<ProjectionConfig>,
}

impl ProjectionService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ProjectionConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ProjectionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Request a forecast of the summed remaining duration for the given
    /// ordered series and index window.
    ///
    /// # Errors
    ///
    /// Returns `ProjectionError::Disabled` when no endpoint is configured,
    /// `HttpStatus` on a non-2xx response, and `Http` when the request fails
    /// or the body does not match the contract. Failures are surfaced to the
    /// caller: no retry, no client-side substitute value.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn predict_remaining(
        &self,
        durations: &[IndependenceDuration],
        start: usize,
        end: usize,
    ) -> Result<Duration, ProjectionError> {
        let config = self.config.as_ref().ok_or(ProjectionError::Disabled)?;
        let url = format!(
            "{}/simple-exponential-smoothing/",
            config.base_url.trim_end_matches('/')
        );
        let payload = SmoothingRequest {
            data: durations,
            start,
            end,
        };

        debug!(points = durations.len(), start, end, "requesting projection");
        let response = self.client.post(url).json(&payload).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "projection request rejected");
            return Err(ProjectionError::HttpStatus(response.status()));
        }

        let body: SmoothingResponse = response.json().await?;
        Ok(Duration::milliseconds(body.predicted_sum as i64))
    }
}

#[derive(Debug, Serialize)]
struct SmoothingRequest<'a> {
    data: &'a [IndependenceDuration],
    start: usize,
    end: usize,
}

#[derive(Debug, Deserialize)]
struct SmoothingResponse {
    #[serde(rename = "predictedSum")]
    predicted_sum: f64,
}
