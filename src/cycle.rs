//! The fixed-cadence report cycle
//!
//! Once per interval the current reference fix and station pressure are
//! snapshotted, every due aircraft is rendered against them, the
//! reference-position pair and any pending weather relay are appended, and
//! the block goes out to the fan-out. Snapshotting first keeps one block
//! internally consistent even while the feeds keep writing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;

use crate::output::{reference_sentences, TrafficReporter};
use crate::tracker::{AircraftTracker, BasePosition, WeatherStore};

const STATS_EVERY_CYCLES: u64 = 60;

pub async fn run(
    interval: Duration,
    max_distance_m: f64,
    tracker: Arc<AircraftTracker>,
    base: Arc<BasePosition>,
    weather: Arc<WeatherStore>,
    sender: broadcast::Sender<String>,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut cycles: u64 = 0;
    loop {
        ticker.tick().await;
        cycles += 1;

        let fix = base.current();
        let reporter = TrafficReporter::new(fix, weather.pressure(), max_distance_m);
        let mut block = tracker.process_all(&reporter);
        block.push_str(&reference_sentences(&fix, Utc::now()));
        if let Some(pending) = weather.take_pending() {
            block.push_str(&pending);
        }

        // no receivers just means no clients right now
        let _ = sender.send(block);

        if cycles % STATS_EVERY_CYCLES == 0 {
            info!("{}", tracker.stats());
        }
    }
}
