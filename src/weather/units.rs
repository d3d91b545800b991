use std::fmt;

use serde::{Deserialize, Serialize};

/// Convert a temperature to Fahrenheit.
///
/// Only Celsius is converted. Any other unit string, including unknown ones,
/// is assumed to already be Fahrenheit.
pub fn to_fahrenheit(value: f64, unit: &str) -> f64 {
    match unit.trim().to_ascii_uppercase().as_str() {
        "C" => value * 9.0 / 5.0 + 32.0,
        _ => value,
    }
}

/// Round to one decimal place, half away from zero.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Coarse temperature bucket reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureClass {
    Cold,
    Moderate,
    Hot,
}

impl TemperatureClass {
    /// Below 50°F is cold, 50 through 77°F is moderate, above that is hot.
    pub fn from_fahrenheit(temp_f: f64) -> Self {
        if temp_f < 50.0 {
            Self::Cold
        } else if temp_f <= 77.0 {
            Self::Moderate
        } else {
            Self::Hot
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Moderate => "moderate",
            Self::Hot => "hot",
        }
    }
}

impl fmt::Display for TemperatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
