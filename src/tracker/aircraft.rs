//! Per-aircraft state and the priority arbitration rule

use crate::protocol::{AircraftUpdate, IdType, TargetType};

/// Cycles a Flarm-sourced entry keeps its classification after its last
/// accepted update before a transponder source may take it over
pub const FLARM_HOLD_CYCLES: u32 = 4;

/// Entries updated within this many cycles are reported
pub const REPORT_WINDOW_CYCLES: u32 = 4;

/// Entries not updated for this many cycles are dropped
pub const EXPIRE_CYCLES: u32 = 120;

/// Decide whether an incoming write may replace state last written at
/// `current` priority after `attempts` rejected tries.
///
/// Higher or equal priority always wins. A lower priority wins once it has
/// been turned away often enough that `incoming * attempts` reaches the
/// current priority, so a source that went quiet cannot hold the entry
/// forever. Priority 0 only ever replaces priority 0.
pub fn arbitrate(current: u8, attempts: u32, incoming: u8) -> bool {
    if incoming == 0 {
        return current == 0;
    }
    incoming >= current || u32::from(incoming) * attempts >= u32::from(current)
}

/// Latest known state of one tracked aircraft
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub id: String,
    pub id_type: IdType,
    pub aircraft_type: u8,
    pub target_type: TargetType,
    pub latitude: f64,
    pub longitude: f64,

    /// Meters; pressure altitude when `altitude_is_qne` is set
    pub altitude: f64,
    pub altitude_is_qne: bool,
    pub ground_speed: Option<f64>,
    pub heading: Option<f64>,
    pub climb_rate: Option<f64>,

    /// Position and all movement fields known
    pub full_info: bool,

    /// Priority of the last accepted write
    pub last_priority: u8,

    /// Whole report cycles since the last accepted write
    pub cycles_since_update: u32,

    /// Consecutive rejected writes since the last accepted one
    pub update_attempts: u32,
}

impl Aircraft {
    /// First report for an id; always accepted whatever its priority.
    pub fn new(update: &AircraftUpdate) -> Self {
        Self {
            id: update.id.clone(),
            id_type: update.id_type,
            aircraft_type: update.aircraft_type,
            target_type: update.source,
            latitude: update.latitude,
            longitude: update.longitude,
            altitude: update.altitude,
            altitude_is_qne: update.altitude_is_qne,
            ground_speed: update.ground_speed,
            heading: update.heading,
            climb_rate: update.climb_rate,
            full_info: update.full_info(),
            last_priority: update.priority,
            cycles_since_update: 0,
            update_attempts: 0,
        }
    }

    /// Apply one report under the arbitration rule. Returns true when it
    /// was accepted.
    ///
    /// A recently seen Flarm entry keeps its target type and
    /// classification when a transponder report comes in; the transponder
    /// position data still merges.
    pub fn update(&mut self, update: &AircraftUpdate) -> bool {
        if !arbitrate(self.last_priority, self.update_attempts, update.priority) {
            self.update_attempts += 1;
            return false;
        }

        let keep_flarm = self.target_type == TargetType::Flarm
            && update.source == TargetType::Transponder
            && self.cycles_since_update < FLARM_HOLD_CYCLES;
        if !keep_flarm {
            self.target_type = update.source;
            self.id_type = update.id_type;
            self.aircraft_type = update.aircraft_type;
        }

        self.latitude = update.latitude;
        self.longitude = update.longitude;
        self.altitude = update.altitude;
        self.altitude_is_qne = update.altitude_is_qne;
        self.ground_speed = update.ground_speed;
        self.heading = update.heading;
        self.climb_rate = update.climb_rate;
        self.full_info = update.full_info();
        self.last_priority = update.priority;
        self.cycles_since_update = 0;
        self.update_attempts = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AIRCRAFT_TYPE_UNKNOWN;

    fn flarm_update(priority: u8) -> AircraftUpdate {
        AircraftUpdate {
            id: "DDA5BA".to_string(),
            id_type: IdType::Flarm,
            aircraft_type: 1,
            source: TargetType::Flarm,
            latitude: 48.0,
            longitude: 8.0,
            altitude: 1000.0,
            altitude_is_qne: false,
            ground_speed: Some(25.0),
            heading: Some(90.0),
            climb_rate: Some(1.5),
            turn_rate: None,
            priority,
        }
    }

    fn transponder_update(priority: u8) -> AircraftUpdate {
        AircraftUpdate {
            id: "DDA5BA".to_string(),
            id_type: IdType::Icao,
            aircraft_type: AIRCRAFT_TYPE_UNKNOWN,
            source: TargetType::Transponder,
            latitude: 48.1,
            longitude: 8.1,
            altitude: 1100.0,
            altitude_is_qne: true,
            ground_speed: None,
            heading: None,
            climb_rate: None,
            turn_rate: None,
            priority,
        }
    }

    #[test]
    fn test_arbitrate_priority_order() {
        assert!(arbitrate(1, 0, 2));
        assert!(arbitrate(2, 0, 2));
        assert!(!arbitrate(2, 0, 1));
        assert!(arbitrate(0, 0, 1));
    }

    #[test]
    fn test_arbitrate_zero_only_replaces_zero() {
        assert!(arbitrate(0, 0, 0));
        assert!(!arbitrate(1, 0, 0));
        // attempts never help a zero-priority source
        assert!(!arbitrate(1, 100, 0));
    }

    #[test]
    fn test_arbitrate_lockout_release() {
        // priority 1 against a silent priority 3 holder
        assert!(!arbitrate(3, 0, 1));
        assert!(!arbitrate(3, 1, 1));
        assert!(!arbitrate(3, 2, 1));
        assert!(arbitrate(3, 3, 1));
    }

    #[test]
    fn test_rejected_update_leaves_state_unchanged() {
        let mut aircraft = Aircraft::new(&flarm_update(3));
        let before = aircraft.clone();

        let mut weak = flarm_update(2);
        weak.latitude = 50.0;
        weak.altitude = 2000.0;
        assert!(!aircraft.update(&weak));

        assert!((aircraft.latitude - before.latitude).abs() < 1e-12);
        assert!((aircraft.altitude - before.altitude).abs() < 1e-12);
        assert_eq!(aircraft.last_priority, before.last_priority);
        assert_eq!(aircraft.update_attempts, 1);
    }

    #[test]
    fn test_lower_priority_rejected_then_released() {
        let mut aircraft = Aircraft::new(&flarm_update(3));
        let weak = transponder_update(1);

        assert!(!aircraft.update(&weak));
        assert!(!aircraft.update(&weak));
        assert!(!aircraft.update(&weak));
        assert_eq!(aircraft.update_attempts, 3);
        // 1 * 3 >= 3 releases the lockout
        assert!(aircraft.update(&weak));
        assert_eq!(aircraft.last_priority, 1);
        assert_eq!(aircraft.update_attempts, 0);
    }

    #[test]
    fn test_flarm_classification_survives_transponder_merge() {
        let mut aircraft = Aircraft::new(&flarm_update(1));
        assert!(aircraft.update(&transponder_update(2)));

        // position merged, classification kept
        assert!((aircraft.latitude - 48.1).abs() < 1e-9);
        assert!(aircraft.altitude_is_qne);
        assert_eq!(aircraft.target_type, TargetType::Flarm);
        assert_eq!(aircraft.id_type, IdType::Flarm);
        assert_eq!(aircraft.aircraft_type, 1);
        assert!(!aircraft.full_info);
    }

    #[test]
    fn test_stale_flarm_entry_demotes_to_transponder() {
        let mut aircraft = Aircraft::new(&flarm_update(1));
        aircraft.cycles_since_update = FLARM_HOLD_CYCLES;
        assert!(aircraft.update(&transponder_update(2)));
        assert_eq!(aircraft.target_type, TargetType::Transponder);
        assert_eq!(aircraft.id_type, IdType::Icao);
    }

    #[test]
    fn test_flarm_update_replaces_transponder_entry() {
        let mut aircraft = Aircraft::new(&transponder_update(2));
        assert!(aircraft.update(&flarm_update(2)));
        assert_eq!(aircraft.target_type, TargetType::Flarm);
        assert!(aircraft.full_info);
    }

    #[test]
    fn test_accept_resets_cycle_age() {
        let mut aircraft = Aircraft::new(&flarm_update(1));
        aircraft.cycles_since_update = 17;
        assert!(aircraft.update(&flarm_update(1)));
        assert_eq!(aircraft.cycles_since_update, 0);
    }
}
