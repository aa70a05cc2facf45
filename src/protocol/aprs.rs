//! OGN/APRS position packet parser
//!
//! Handles the timestamped position report form used by the Open Glider
//! Network, e.g.
//!
//! `FLRDDA5BA>APRS,qAS,LFMX:/160829h4415.41N/00600.03E'342/049/A=005524
//! id06DDA5BA -454fpm -1.1rot 8.8dB 0e +51.2kHz gps4x5`
//!
//! Anything else on the feed (server banners, receiver status beacons) is
//! ignored rather than treated as an error.

use std::sync::OnceLock;

use regex::Regex;

use crate::geo;
use super::{finite, parse_num, AircraftUpdate, IdType, Reject, TargetType};

/// Envelope of a timestamped APRS position report.
///
/// Groups:
/// 1. latitude as ddmm.mm
/// 2. latitude hemisphere
/// 3. longitude as dddmm.mm
/// 4. longitude hemisphere
/// 5. course in degrees (optional, together with 6)
/// 6. speed in knots (optional)
/// 7. altitude in feet
/// 8. comment (everything after the altitude)
fn position_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[^>]+>APRS,[^:]+:/\d{6}h(\d{4}\.\d{2})([NS]).(\d{5}\.\d{2})([EW]).(?:(\d{3})/(\d{3}))?/A=(\d{6})(?:\s+(.*))?$",
        )
        .unwrap()
    })
}

/// OGN extension fields inside the comment.
///
/// Groups:
/// 1. flags byte as two hex digits (id type in the low bits, aircraft
///    type above them)
/// 2. aircraft id as six hex digits
/// 3. climb rate in ft/min (optional)
/// 4. turn rate in half-turns per minute (optional)
fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"id([0-9A-Fa-f]{2})([0-9A-Fa-f]{6})(?:\s+([+-]\d+)fpm)?(?:\s+([+-]?\d+(?:\.\d+)?)rot)?",
        )
        .unwrap()
    })
}

/// Parse one APRS line into an aircraft update.
pub fn unpack(line: &str, priority: u8, max_height_m: f64) -> Result<AircraftUpdate, Reject> {
    if line.starts_with('#') {
        // server banners and keep-alives
        return Err(Reject::Ignore);
    }
    let caps = position_pattern().captures(line).ok_or(Reject::Ignore)?;

    let mut latitude = geo::degrees_minutes_to_decimal(parse_num(&caps[1])?);
    if &caps[2] == "S" {
        latitude = -latitude;
    }
    let mut longitude = geo::degrees_minutes_to_decimal(parse_num(&caps[3])?);
    if &caps[4] == "W" {
        longitude = -longitude;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(Reject::Malformed);
    }

    let heading = match caps.get(5) {
        Some(m) => Some(parse_num::<f64>(m.as_str())?),
        None => None,
    };
    let ground_speed = match caps.get(6) {
        Some(m) => Some(parse_num::<f64>(m.as_str())? * geo::KT_TO_MS),
        None => None,
    };

    let altitude = parse_num::<f64>(&caps[7])? * geo::FT_TO_M;
    if altitude > max_height_m {
        return Err(Reject::Malformed);
    }

    let comment = caps.get(8).map(|m| m.as_str()).unwrap_or("");
    let detail = comment_pattern().captures(comment).ok_or(Reject::Malformed)?;

    let flags = u8::from_str_radix(&detail[1], 16).map_err(|_| Reject::Malformed)?;
    // the digit runs are unbounded, so an absurd value can parse to infinity
    let climb_rate = match detail.get(3) {
        Some(m) => Some(finite(parse_num::<f64>(m.as_str())? * geo::FPM_TO_MS)?),
        None => None,
    };
    let turn_rate = match detail.get(4) {
        Some(m) => Some(finite(parse_num::<f64>(m.as_str())? * geo::ROT_TO_DEG_S)?),
        None => None,
    };

    Ok(AircraftUpdate {
        id: detail[2].to_string(),
        id_type: IdType::from(flags),
        aircraft_type: (flags & 0x7C) >> 2,
        source: TargetType::Flarm,
        latitude,
        longitude,
        altitude,
        altitude_is_qne: false,
        ground_speed,
        heading,
        climb_rate,
        turn_rate,
        priority,
    })
}
