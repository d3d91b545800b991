//! National Weather Service client.
//!
//! api.weather.gov needs two hops per location: `/points/{lat},{lon}` yields
//! the gridpoint forecast URL, and that URL yields the forecast periods.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::data::{ForecastError, ForecastSource};
use crate::weather::Coordinates;

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(7);
pub const SOURCE_NAME: &str = "National Weather Service";

#[derive(Debug, Error)]
pub enum NwsError {
    #[error("points endpoint returned {}", .0.as_u16())]
    PointsStatus(StatusCode),

    #[error("forecast endpoint returned {}", .0.as_u16())]
    ForecastStatus(StatusCode),

    #[error("no forecast URL in response")]
    MissingForecastUrl,

    #[error("no periods in forecast")]
    NoPeriods,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// One forecast period as published by the NWS.
///
/// Absent and `null` fields both decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Period {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_daytime: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature_unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_forecast: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct NwsClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NwsClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/geo+json"),
        );

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build NWS HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Step 1: resolve the forecast URL for a point.
    #[instrument(skip(self, coords), fields(coords = %coords))]
    pub async fn forecast_url(&self, coords: Coordinates) -> Result<String, NwsError> {
        let url = format!("{}/points/{:.4},{:.4}", self.base_url, coords.lat, coords.lon);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NwsError::PointsStatus(status));
        }

        let points: PointsResponse = response.json().await?;
        match points.properties.forecast {
            Some(forecast) if !forecast.is_empty() => {
                debug!(forecast = %forecast, "Resolved forecast URL");
                Ok(forecast)
            }
            _ => Err(NwsError::MissingForecastUrl),
        }
    }

    /// Step 2: fetch the forecast and return the period nearest to now.
    #[instrument(skip(self))]
    pub async fn current_period_at(&self, forecast_url: &str) -> Result<Period, NwsError> {
        let response = self.client.get(forecast_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NwsError::ForecastStatus(status));
        }

        let forecast: ForecastResponse = response.json().await?;
        forecast
            .properties
            .periods
            .into_iter()
            .next()
            .ok_or(NwsError::NoPeriods)
    }
}

#[async_trait]
impl ForecastSource for NwsClient {
    async fn current_period(&self, coords: Coordinates) -> Result<Period, ForecastError> {
        // One deadline covers both hops.
        let deadline = Instant::now() + self.timeout;

        let forecast_url = tokio::time::timeout_at(deadline, self.forecast_url(coords))
            .await
            .map_err(|_| NwsError::Timeout(self.timeout))
            .and_then(|r| r)
            .map_err(ForecastError::Resolve)?;

        tokio::time::timeout_at(deadline, self.current_period_at(&forecast_url))
            .await
            .map_err(|_| NwsError::Timeout(self.timeout))
            .and_then(|r| r)
            .map_err(ForecastError::Fetch)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// --- api.weather.gov response types ---

#[derive(Debug, Deserialize)]
struct PointsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    properties: PointsProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PointsProperties {
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    properties: ForecastProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastProperties {
    #[serde(default, deserialize_with = "null_as_default")]
    periods: Vec<Period>,
}
