//! Aggregated aircraft store
//!
//! One entry per aircraft id, fed concurrently by all feeds and swept once
//! per report cycle. The cycle pass is the only place aging, deletion and
//! report rendering happen.

pub mod aircraft;
mod reference;
mod weather;

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::output::TrafficReporter;
use crate::protocol::AircraftUpdate;

pub use aircraft::{Aircraft, EXPIRE_CYCLES, REPORT_WINDOW_CYCLES};
pub use reference::{BasePosition, ReferenceFix};
pub use weather::WeatherStore;

/// Concurrent per-aircraft store with priority arbitration and aging
pub struct AircraftTracker {
    aircraft: Mutex<HashMap<String, Aircraft>>,
}

/// Point-in-time store counters
#[derive(Debug, Clone, Copy)]
pub struct TrackerStats {
    pub total: usize,
    pub active: usize,
}

impl fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tracking {} aircraft, {} reporting",
            self.total, self.active
        )
    }
}

impl AircraftTracker {
    pub fn new() -> Self {
        Self {
            aircraft: Mutex::new(HashMap::new()),
        }
    }

    /// Apply one typed update. Unknown ids are always inserted; known ones
    /// go through the arbitration rule. Returns true when stored.
    pub fn update(&self, update: &AircraftUpdate) -> bool {
        let mut aircraft = self.aircraft.lock().unwrap();
        match aircraft.get_mut(&update.id) {
            Some(entry) => entry.update(update),
            None => {
                debug!("tracking new aircraft {}", update.id);
                aircraft.insert(update.id.clone(), Aircraft::new(update));
                true
            }
        }
    }

    /// One report cycle: age every entry, drop the expired, render the
    /// rest through `reporter` while their report window is open. Returns
    /// the concatenated sentence block, possibly empty.
    pub fn process_all(&self, reporter: &TrafficReporter) -> String {
        let mut aircraft = self.aircraft.lock().unwrap();
        let mut out = String::new();
        aircraft.retain(|id, entry| {
            entry.cycles_since_update += 1;
            if entry.cycles_since_update >= EXPIRE_CYCLES {
                debug!("dropping stale aircraft {}", id);
                return false;
            }
            if entry.cycles_since_update < REPORT_WINDOW_CYCLES {
                out.push_str(&reporter.render(entry));
            }
            true
        });
        out
    }

    /// Current store counters; active means inside the report window.
    pub fn stats(&self) -> TrackerStats {
        let aircraft = self.aircraft.lock().unwrap();
        let active = aircraft
            .values()
            .filter(|a| a.cycles_since_update < REPORT_WINDOW_CYCLES)
            .count();
        TrackerStats {
            total: aircraft.len(),
            active,
        }
    }

    /// Snapshot of one entry, for inspection.
    pub fn get(&self, id: &str) -> Option<Aircraft> {
        self.aircraft.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.aircraft.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AircraftTracker {
    fn default() -> Self {
        Self::new()
    }
}
