//! Feed transport
//!
//! One driver task per configured source: connect, send the optional login
//! line, read lines, hand each to the parser for the feed's wire format
//! and apply the result to the owning store. Any connection failure turns
//! into a delayed reconnect, so a feed outage never takes the process
//! down.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::{FeedConfig, FeedKind};
use crate::protocol::{aprs, gps, sbs, weather, Reject};
use crate::tracker::{AircraftTracker, BasePosition, WeatherStore};

/// Per-connection line counters
#[derive(Debug, Default)]
struct FeedStats {
    parsed: u64,
    malformed: u64,
    ignored: u64,
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parsed, {} malformed, {} ignored",
            self.parsed, self.malformed, self.ignored
        )
    }
}

/// Whether the driver keeps reading after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// How a connection ended
enum SessionEnd {
    /// Remote closed or stalled; reconnect
    Disconnected,
    /// The feed completed its job for good
    Finished,
}

/// Drives one configured feed for the lifetime of the process.
pub struct FeedDriver {
    config: FeedConfig,
    reconnect_delay: Duration,
    max_height_m: f64,
    ground_mode: bool,
    tracker: Arc<AircraftTracker>,
    base: Arc<BasePosition>,
    weather: Arc<WeatherStore>,
}

impl FeedDriver {
    pub fn new(
        config: FeedConfig,
        reconnect_delay: Duration,
        max_height_m: f64,
        ground_mode: bool,
        tracker: Arc<AircraftTracker>,
        base: Arc<BasePosition>,
        weather: Arc<WeatherStore>,
    ) -> Self {
        Self {
            config,
            reconnect_delay,
            max_height_m,
            ground_mode,
            tracker,
            base,
            weather,
        }
    }

    /// Connect, read and dispatch until the feed finishes for good. Every
    /// other exit reconnects after the configured delay.
    pub async fn run(self) {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        loop {
            let mut stats = FeedStats::default();
            match self.session(&addr, &mut stats).await {
                Ok(SessionEnd::Finished) => {
                    info!("[{}] feed finished ({})", self.config.kind, stats);
                    return;
                }
                Ok(SessionEnd::Disconnected) => {
                    warn!("[{}] connection to {} lost ({})", self.config.kind, addr, stats);
                }
                Err(e) => {
                    warn!("[{}] connection to {} failed: {}", self.config.kind, addr, e);
                }
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn session(&self, addr: &str, stats: &mut FeedStats) -> Result<SessionEnd> {
        debug!("[{}] connecting to {}", self.config.kind, addr);
        let mut stream = TcpStream::connect(addr).await?;
        if let Some(login) = &self.config.login {
            stream.write_all(login.as_bytes()).await?;
            stream.write_all(b"\r\n").await?;
        }
        info!("[{}] connected to {}", self.config.kind, addr);

        let mut lines = BufReader::new(stream).lines();
        loop {
            let next = match self.config.read_timeout() {
                Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("[{}] no data for {:?}", self.config.kind, limit);
                        return Ok(SessionEnd::Disconnected);
                    }
                },
                None => lines.next_line().await,
            };
            match next {
                Ok(Some(line)) => {
                    if self.dispatch(line.trim_end(), stats) == Flow::Stop {
                        return Ok(SessionEnd::Finished);
                    }
                }
                Ok(None) => return Ok(SessionEnd::Disconnected),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Parse one line and apply it to the owning store.
    fn dispatch(&self, line: &str, stats: &mut FeedStats) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        let rejected = match self.config.kind {
            FeedKind::Aprs => {
                match aprs::unpack(line, self.config.priority, self.max_height_m) {
                    Ok(update) => {
                        self.tracker.update(&update);
                        None
                    }
                    Err(reject) => Some(reject),
                }
            }
            FeedKind::Sbs => match sbs::unpack(line, self.config.priority, self.max_height_m) {
                Ok(update) => {
                    self.tracker.update(&update);
                    None
                }
                Err(reject) => Some(reject),
            },
            FeedKind::Gps => match gps::unpack(line, self.config.priority) {
                Ok(update) => {
                    self.base.update(&update);
                    if self.ground_mode && update.good_fix() {
                        info!("[gps] reference position pinned, stopping feed");
                        stats.parsed += 1;
                        return Flow::Stop;
                    }
                    None
                }
                Err(reject) => Some(reject),
            },
            FeedKind::Weather => match weather::unpack(line) {
                Ok(update) => {
                    self.weather.update(update);
                    None
                }
                Err(reject) => Some(reject),
            },
        };
        match rejected {
            None => stats.parsed += 1,
            Some(Reject::Malformed) => {
                stats.malformed += 1;
                debug!("[{}] malformed line: {}", self.config.kind, line);
            }
            Some(Reject::Ignore) => stats.ignored += 1,
        }
        Flow::Continue
    }
}
