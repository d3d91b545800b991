//! HTTP surface: `/healthz` and `/weather`.

pub mod error;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::data::ForecastSource;
use crate::weather::{parse_coordinates, round1, to_fahrenheit, TemperatureClass};

pub use error::ApiError;

/// Shared state accessible by all route handlers.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn ForecastSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self { source }
    }
}

/// Body returned by a successful `/weather` lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub short_forecast: String,
    pub temperature_f: f64,
    pub characterization: TemperatureClass,
    pub source: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", any(healthz_handler))
        .route("/weather", any(weather_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(addr = %addr, "weather-service listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// First value for `key`; later repeats are ignored.
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// -- Route Handlers --

async fn healthz_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "ok")
}

async fn weather_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let coords = parse_coordinates(first_param(&params, "lat"), first_param(&params, "lon"))?;

    let period = state.source.current_period(coords).await.map_err(|e| {
        warn!(coords = %coords, error = %e, "Forecast lookup failed");
        e
    })?;

    let temp_f = to_fahrenheit(period.temperature, &period.temperature_unit);

    Ok(Json(WeatherResponse {
        short_forecast: period.short_forecast,
        temperature_f: round1(temp_f),
        characterization: TemperatureClass::from_fahrenheit(temp_f),
        source: state.source.name().to_string(),
    }))
}
