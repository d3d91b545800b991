//! Console sweep over the named locations using OpenWeatherMap.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::data::locations::Location;
use crate::data::openweather::OpenWeatherClient;

/// Outcome of one pass over the location list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Fetch and print every location once. A failing location is reported in
/// its own line and does not stop the sweep.
pub async fn sweep<W: Write>(
    client: &OpenWeatherClient,
    locations: &[Location],
    out: &mut W,
) -> Result<SweepStats> {
    let mut stats = SweepStats::default();

    for location in locations {
        match client.current(location.lat, location.lon).await {
            Ok(weather) => {
                writeln!(out, "{}", weather.summary(location.name))
                    .context("Failed to write summary")?;
                stats.succeeded += 1;
            }
            Err(e) => {
                warn!(city = location.name, error = %e, "Failed to fetch weather for city");
                writeln!(out, "{}: error: {e}", location.name)
                    .context("Failed to write summary")?;
                stats.failed += 1;
            }
        }
    }

    out.flush().context("Failed to flush output")?;
    info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        "Sweep complete"
    );

    Ok(stats)
}

/// Sweep once, or repeatedly on `interval` until `shutdown` resolves. A zero
/// interval means a single sweep.
pub async fn run<W: Write>(
    client: &OpenWeatherClient,
    locations: &[Location],
    interval: Option<Duration>,
    out: &mut W,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let Some(period) = interval.filter(|d| !d.is_zero()) else {
        sweep(client, locations, out).await?;
        return Ok(());
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                writeln!(out, "--- {} ---", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
                    .context("Failed to write header")?;
                sweep(client, locations, out).await?;
            }
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping poller");
                return Ok(());
            }
        }
    }
}
