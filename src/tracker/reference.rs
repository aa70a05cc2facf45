//! Process-wide reference position
//!
//! Seeded from configuration, optionally kept current by a GPS feed, and
//! arbitrated with the same priority rule as aircraft entries.

use std::sync::Mutex;

use crate::protocol::GpsUpdate;
use super::aircraft::arbitrate;

/// The fix all relative geometry is computed against
#[derive(Debug, Clone, Copy)]
pub struct ReferenceFix {
    pub latitude: f64,
    pub longitude: f64,

    /// Meters above sea level
    pub altitude: f64,

    /// Geoid separation in meters
    pub geoid_separation: f64,
    pub fix_quality: u8,
    pub satellites: u8,
    pub h_dilution: f64,
}

struct Arbitrated {
    fix: ReferenceFix,
    priority: u8,
    attempts: u32,
}

/// Singleton holder for the reference fix
pub struct BasePosition {
    state: Mutex<Arbitrated>,
}

impl BasePosition {
    pub fn new(fix: ReferenceFix, priority: u8) -> Self {
        Self {
            state: Mutex::new(Arbitrated {
                fix,
                priority,
                attempts: 0,
            }),
        }
    }

    /// Apply a GPS fix under the arbitration rule. Returns true when it
    /// was accepted.
    pub fn update(&self, update: &GpsUpdate) -> bool {
        let mut state = self.state.lock().unwrap();
        if !arbitrate(state.priority, state.attempts, update.priority) {
            state.attempts += 1;
            return false;
        }
        state.fix = ReferenceFix {
            latitude: update.latitude,
            longitude: update.longitude,
            altitude: update.altitude,
            geoid_separation: update.geoid_separation,
            fix_quality: update.fix_quality,
            satellites: update.satellites,
            h_dilution: update.h_dilution,
        };
        state.priority = update.priority;
        state.attempts = 0;
        true
    }

    /// Snapshot of the current fix.
    pub fn current(&self) -> ReferenceFix {
        self.state.lock().unwrap().fix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> ReferenceFix {
        ReferenceFix {
            latitude: 49.0,
            longitude: 8.0,
            altitude: 300.0,
            geoid_separation: 48.0,
            fix_quality: 1,
            satellites: 8,
            h_dilution: 1.0,
        }
    }

    fn gps(priority: u8, latitude: f64) -> GpsUpdate {
        GpsUpdate {
            latitude,
            longitude: 8.5,
            altitude: 310.0,
            geoid_separation: 47.5,
            fix_quality: 1,
            satellites: 9,
            h_dilution: 0.8,
            priority,
        }
    }

    #[test]
    fn test_higher_priority_fix_replaces_seed() {
        let base = BasePosition::new(seed(), 1);
        assert!(base.update(&gps(2, 49.5)));
        assert!((base.current().latitude - 49.5).abs() < 1e-9);
    }

    #[test]
    fn test_low_priority_fix_locked_out_then_released() {
        let base = BasePosition::new(seed(), 4);
        let weak = gps(2, 50.0);
        assert!(!base.update(&weak));
        assert!(!base.update(&weak));
        assert!((base.current().latitude - 49.0).abs() < 1e-9);
        // two rejects banked: 2 * 2 >= 4 releases the lockout
        assert!(base.update(&weak));
        assert!((base.current().latitude - 50.0).abs() < 1e-9);
    }
}
