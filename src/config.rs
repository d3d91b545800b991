use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

use crate::data::{nws, openweather};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub nws: NwsConfig,
    pub openweather: OpenWeatherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. A bare `:port` binds every interface.
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: ":8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Address in a form `TcpListener::bind` accepts.
    pub fn bind_addr(&self) -> String {
        match self.addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.addr.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NwsConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: nws::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: nws::DEFAULT_TIMEOUT.as_secs(),
            user_agent: concat!("weather-service/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NwsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub poll_interval_seconds: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            base_url: openweather::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: openweather::DEFAULT_TIMEOUT.as_secs(),
            poll_interval_seconds: 600,
        }
    }
}

impl OpenWeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// The OpenWeatherMap key, read from `API_KEY` (process env or `.env`).
/// Never part of the TOML config.
#[derive(Debug)]
pub struct Secrets {
    pub openweather_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            openweather_api_key: std::env::var("API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// With no explicit path, `config/default.toml` is optional and built-in
    /// defaults are used when it is absent. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok((config, Secrets::from_env()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// `ADDR`, `NWS_BASE` and `LOG_LEVEL` win over the file. Empty values
    /// are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(addr) = get("ADDR") {
            self.server.addr = addr;
        }
        if let Some(base) = get("NWS_BASE") {
            self.nws.base_url = base;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }

        self.nws.base_url = self.nws.base_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_default_config() {
        let contents = std::fs::read_to_string("config/default.toml")
            .expect("config/default.toml should exist");
        let config: AppConfig = toml::from_str(&contents).expect("should parse");
        assert_eq!(config.server.addr, ":8080");
        assert_eq!(config.nws.base_url, "https://api.weather.gov");
        assert_eq!(config.nws.timeout_seconds, 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.addr, ":8080");
        assert_eq!(config.nws.timeout(), Duration::from_secs(7));
        assert_eq!(config.openweather.poll_interval(), Duration::from_secs(600));
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_section() {
        let config: AppConfig = toml::from_str("[nws]\ntimeout_seconds = 3\n").unwrap();
        assert_eq!(config.nws.timeout_seconds, 3);
        assert_eq!(config.nws.base_url, "https://api.weather.gov");
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = AppConfig::load(Some(Path::new("config/does-not-exist.toml"))).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to read config file: config/does-not-exist.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ADDR", "127.0.0.1:9000"),
            ("NWS_BASE", "http://localhost:4000/"),
            ("LOG_LEVEL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.nws.base_url, "http://localhost:4000");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_bind_addr() {
        let mut server = ServerConfig::default();
        assert_eq!(server.bind_addr(), "0.0.0.0:8080");
        server.addr = "127.0.0.1:3000".to_string();
        assert_eq!(server.bind_addr(), "127.0.0.1:3000");
    }
}
