//! SBS-1 BaseStation message parser
//!
//! Only MSG type 3 (airborne position) carries a position, so everything
//! else on the feed is ignored. Transponder altitudes are pressure
//! altitudes against the standard atmosphere and are flagged for QNH
//! correction downstream.

use crate::geo;
use super::{finite, parse_num, AircraftUpdate, IdType, Reject, TargetType, AIRCRAFT_TYPE_UNKNOWN};

const MSG_AIRBORNE_POSITION: &str = "3";

/// Parse one SBS line into an aircraft update.
pub fn unpack(line: &str, priority: u8, max_height_m: f64) -> Result<AircraftUpdate, Reject> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields[0] != "MSG" {
        return Err(Reject::Ignore);
    }
    if fields.get(1).map(|f| f.trim()) != Some(MSG_AIRBORNE_POSITION) {
        return Err(Reject::Ignore);
    }
    if fields.len() < 16 {
        return Err(Reject::Malformed);
    }

    let id = fields[4].trim();
    if id.is_empty() {
        return Err(Reject::Malformed);
    }

    let altitude = finite(parse_num::<f64>(fields[11])? * geo::FT_TO_M)?;
    if altitude > max_height_m {
        return Err(Reject::Ignore);
    }

    // range checks double as NaN rejection
    let latitude: f64 = parse_num(fields[14])?;
    let longitude: f64 = parse_num(fields[15])?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(Reject::Malformed);
    }

    Ok(AircraftUpdate {
        id: id.to_string(),
        id_type: IdType::Icao,
        aircraft_type: AIRCRAFT_TYPE_UNKNOWN,
        source: TargetType::Transponder,
        latitude,
        longitude,
        altitude,
        altitude_is_qne: true,
        ground_speed: None,
        heading: None,
        climb_rate: None,
        turn_rate: None,
        priority,
    })
}
