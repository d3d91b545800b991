use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use weather_service::config::{AppConfig, Secrets};
use weather_service::data::locations;
use weather_service::data::nws::NwsClient;
use weather_service::data::openweather::OpenWeatherClient;
use weather_service::monitoring::logger;
use weather_service::poller;
use weather_service::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "weather-service", version, about = "Coordinates in, weather summary out")]
struct Cli {
    /// Path to a TOML config file (default: config/default.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Print current conditions for the built-in city list
    Poll {
        /// Sweep once and exit
        #[arg(long)]
        once: bool,
        /// Seconds between sweeps (overrides the config file)
        #[arg(long)]
        interval: Option<u64>,
        /// Restrict the sweep to these cities (repeatable)
        #[arg(long = "city")]
        cities: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, secrets) = AppConfig::load(cli.config.as_deref())?;

    logger::init_logging(&config.logging)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(&config).await,
        Command::Poll {
            once,
            interval,
            cities,
        } => {
            let interval = if once {
                None
            } else {
                Some(interval.map_or_else(|| config.openweather.poll_interval(), Duration::from_secs))
            };
            run_poller(&config, secrets, interval, &cities).await
        }
    }
}

/// Run the HTTP service until Ctrl-C or SIGTERM.
async fn run_server(config: &AppConfig) -> Result<()> {
    let nws = NwsClient::new(
        &config.nws.base_url,
        config.nws.timeout(),
        &config.nws.user_agent,
    )?;

    tracing::info!(
        addr = %config.server.addr,
        nws_base = %nws.base_url(),
        "weather-service starting"
    );

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    let state = AppState::new(Arc::new(nws));
    server::serve(listener, state, server::shutdown_signal()).await
}

/// Sweep the city list against OpenWeatherMap and print to stdout.
async fn run_poller(
    config: &AppConfig,
    secrets: Secrets,
    interval: Option<Duration>,
    cities: &[String],
) -> Result<()> {
    let Some(api_key) = secrets.openweather_api_key else {
        bail!("api key required");
    };

    let selected = locations::select(cities)?;

    tracing::info!(
        cities = selected.len(),
        interval_s = interval.map(|d| d.as_secs()),
        "Poller starting"
    );

    let client = OpenWeatherClient::new(
        &config.openweather.base_url,
        api_key,
        config.openweather.timeout(),
    )?;

    let mut stdout = std::io::stdout().lock();
    poller::run(
        &client,
        &selected,
        interval,
        &mut stdout,
        server::shutdown_signal(),
    )
    .await
}
