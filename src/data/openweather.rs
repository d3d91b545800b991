//! OpenWeatherMap current-conditions client.
//!
//! Used by the console poller only. Requests imperial units so temperatures
//! arrive in Fahrenheit and wind in miles per hour.

use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::weather::TemperatureClass;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum OpenWeatherError {
    #[error("openweathermap returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenWeatherMap HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Current conditions at a point, in imperial units.
    #[instrument(skip(self))]
    pub async fn current(&self, lat: f64, lon: f64) -> Result<CurrentWeather, OpenWeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("units", "imperial".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.expose_secret().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(OpenWeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// --- OpenWeatherMap response types ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentWeather {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub base: String,
    pub main: MainReadings,
    pub visibility: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: Sys,
    pub timezone: i64,
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
    pub sea_level: i64,
    pub grnd_level: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
    pub gust: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

impl CurrentWeather {
    pub fn classification(&self) -> TemperatureClass {
        TemperatureClass::from_fahrenheit(self.main.temp)
    }

    /// One console line describing the conditions.
    pub fn summary(&self, label: &str) -> String {
        let description = self
            .weather
            .first()
            .map(|c| c.description.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or("no conditions reported");

        format!(
            "{label}: {:.1}°F (feels like {:.1}°F), {description}, humidity {}%, wind {:.1} mph, {}",
            self.main.temp,
            self.main.feels_like,
            self.main.humidity,
            self.wind.speed,
            self.classification(),
        )
    }
}
