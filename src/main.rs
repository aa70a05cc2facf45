//! flarmhub
//!
//! Aggregates OGN/APRS, ADS-B SBS, GPS and weather-sensor feeds into a
//! single FLARM-style NMEA stream for TCP display clients.

mod config;
mod cycle;
mod feed;
mod geo;
mod output;
mod protocol;
mod tracker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use feed::FeedDriver;
use output::OutputServer;
use tracker::{AircraftTracker, BasePosition, ReferenceFix, WeatherStore};

/// Cycle blocks a slow client may fall behind before it starts skipping
const BROADCAST_DEPTH: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("flarmhub.toml"));
    let settings = Settings::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    info!("==============================================");
    info!("  flarmhub - traffic aggregation relay");
    info!("==============================================");
    info!("Configuration:");
    info!(
        "  Reference: ({:.5}, {:.5}) at {:.0} m",
        settings.reference.latitude, settings.reference.longitude, settings.reference.altitude
    );
    info!(
        "  Output: port {} ({} clients max)",
        settings.output.port, settings.output.max_clients
    );
    info!(
        "  Filters: height {:.0} m, distance {:.0} m",
        settings.max_height_m, settings.max_distance_m
    );
    for feed in &settings.feeds {
        info!(
            "  Feed: {} at {}:{} priority {}",
            feed.kind, feed.host, feed.port, feed.priority
        );
    }
    if settings.ground_mode {
        info!("  Ground mode: on");
    }
    info!("==============================================");

    let tracker = Arc::new(AircraftTracker::new());
    let base = Arc::new(BasePosition::new(
        ReferenceFix {
            latitude: settings.reference.latitude,
            longitude: settings.reference.longitude,
            altitude: settings.reference.altitude,
            geoid_separation: settings.reference.geoid_separation,
            fix_quality: 1,
            satellites: 0,
            h_dilution: 0.0,
        },
        settings.reference.priority,
    ));
    let weather = Arc::new(WeatherStore::new(settings.reference.pressure_hpa));

    let (sender, _) = broadcast::channel::<String>(BROADCAST_DEPTH);
    let mut handles = Vec::new();

    let server = OutputServer::new(
        settings.output.port,
        settings.output.max_clients,
        Duration::from_secs(settings.output.write_timeout_secs),
        sender.clone(),
    );
    handles.push(tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("output server failed: {}", e);
        }
    }));

    for feed_config in settings.feeds.clone() {
        let driver = FeedDriver::new(
            feed_config,
            Duration::from_secs(settings.reconnect_delay_secs),
            settings.max_height_m,
            settings.ground_mode,
            tracker.clone(),
            base.clone(),
            weather.clone(),
        );
        handles.push(tokio::spawn(driver.run()));
    }

    handles.push(tokio::spawn(cycle::run(
        Duration::from_secs(settings.cycle_interval_secs),
        settings.max_distance_m,
        tracker.clone(),
        base.clone(),
        weather.clone(),
        sender.clone(),
    )));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutting down...");
    for handle in &handles {
        handle.abort();
    }
    Ok(())
}
