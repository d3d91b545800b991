pub mod locations;
pub mod nws;
pub mod openweather;

use async_trait::async_trait;
use thiserror::Error;

use crate::data::nws::{NwsError, Period};
use crate::weather::Coordinates;

/// Failure of a two-step forecast lookup, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("failed to resolve forecast URL: {0}")]
    Resolve(#[source] NwsError),

    #[error("failed to fetch forecast: {0}")]
    Fetch(#[source] NwsError),
}

/// Anything that can produce the nearest forecast period for a point.
///
/// The HTTP handler only talks to this trait, so tests can swap the live
/// api.weather.gov client for a canned one.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Resolve and fetch the forecast period closest to now.
    async fn current_period(&self, coords: Coordinates) -> Result<Period, ForecastError>;

    /// Attribution reported to clients alongside the data.
    fn name(&self) -> &str;
}
