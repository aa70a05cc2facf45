//! FLARM-style traffic sentence rendering
//!
//! Each reported aircraft yields a PFLAU/PFLAA pair relative to the
//! current reference fix. Formats follow what existing FLARM display
//! clients parse, so field layout and rounding are load-bearing.

use crate::geo;
use crate::protocol::TargetType;
use crate::tracker::{Aircraft, ReferenceFix};
use super::finish_sentence;

/// Renders traffic sentences against one reference fix.
///
/// Built fresh each cycle so the QNH correction and reference position are
/// consistent across every aircraft in the same block.
pub struct TrafficReporter {
    reference: ReferenceFix,

    /// Standard-atmosphere height of the current station pressure; QNE
    /// altitudes are shifted down by this to become true altitudes
    qne_offset_m: f64,
    max_distance_m: f64,
}

impl TrafficReporter {
    pub fn new(reference: ReferenceFix, pressure_hpa: f64, max_distance_m: f64) -> Self {
        Self {
            reference,
            qne_offset_m: geo::icao_height_from_pressure(pressure_hpa),
            max_distance_m,
        }
    }

    /// Render the PFLAU/PFLAA pair for one aircraft, or nothing when it
    /// lies beyond the distance filter.
    pub fn render(&self, aircraft: &Aircraft) -> String {
        let distance = geo::haversine_distance(
            self.reference.latitude,
            self.reference.longitude,
            aircraft.latitude,
            aircraft.longitude,
        );
        if distance > self.max_distance_m {
            return String::new();
        }
        let bearing = geo::initial_bearing(
            self.reference.latitude,
            self.reference.longitude,
            aircraft.latitude,
            aircraft.longitude,
        );

        let altitude = if aircraft.altitude_is_qne {
            aircraft.altitude - self.qne_offset_m
        } else {
            aircraft.altitude
        };
        let rel_vertical = geo::round_i32(altitude - self.reference.altitude);
        let rel_north = geo::round_i32(bearing.to_radians().cos() * distance);
        let rel_east = geo::round_i32(bearing.to_radians().sin() * distance);
        let rel_bearing = geo::round_i32(bearing) % 360;
        let rel_distance = geo::round_i32(distance);

        let pflau = format!(
            "$PFLAU,,,,1,0,{},0,{},{},{}",
            rel_bearing, rel_vertical, rel_distance, aircraft.id
        );

        // transponder targets always advertise an ICAO address
        let id_type = match aircraft.target_type {
            TargetType::Flarm => aircraft.id_type as u8,
            TargetType::Transponder => 1,
        };
        let pflaa = match (aircraft.heading, aircraft.ground_speed, aircraft.climb_rate) {
            (Some(heading), Some(speed), Some(climb)) if aircraft.full_info => format!(
                "$PFLAA,0,{},{},{},{},{},{},,{},{:.1},{:x}",
                rel_north,
                rel_east,
                rel_vertical,
                id_type,
                aircraft.id,
                geo::round_i32(heading) % 360,
                geo::round_i32(speed * geo::MS_TO_KMH),
                climb,
                aircraft.aircraft_type,
            ),
            _ => format!(
                "$PFLAA,0,{},{},{},{},{},,,,,{:x}",
                rel_north, rel_east, rel_vertical, id_type, aircraft.id, aircraft.aircraft_type,
            ),
        };

        let mut out = finish_sentence(&pflau);
        out.push_str(&finish_sentence(&pflaa));
        out
    }
}
