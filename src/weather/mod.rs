//! Coordinate validation and temperature handling.
//!
//! Everything here is pure; the HTTP handler and the console poller both
//! build on it.

pub mod units;

use std::fmt;

use thiserror::Error;

pub use units::{round1, to_fahrenheit, TemperatureClass};

/// A latitude/longitude pair that passed range validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatOutOfRange);
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::LonOutOfRange);
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing lat or lon query params")]
    Missing,

    #[error("invalid lat: {0}")]
    InvalidLat(String),

    #[error("invalid lon: {0}")]
    InvalidLon(String),

    #[error("lat must be between -90 and 90")]
    LatOutOfRange,

    #[error("lon must be between -180 and 180")]
    LonOutOfRange,
}

/// Parse raw query values into validated coordinates.
///
/// Empty strings count as missing. Latitude is checked before longitude at
/// each stage, so a request with two bad values reports the latitude.
pub fn parse_coordinates(
    lat: Option<&str>,
    lon: Option<&str>,
) -> Result<Coordinates, ValidationError> {
    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => (lat, lon),
        _ => return Err(ValidationError::Missing),
    };

    let lat = parse_float(lat).map_err(ValidationError::InvalidLat)?;
    let lon = parse_float(lon).map_err(ValidationError::InvalidLon)?;

    Coordinates::new(lat, lon)
}

fn parse_float(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|e: std::num::ParseFloatError| format!("{raw:?}: {e}"))?;
    if !value.is_finite() {
        return Err(format!("{raw:?}: not a finite number"));
    }
    Ok(value)
}
