//! GPS NMEA parser for the reference position
//!
//! Consumes GGA sentences from any talker (GPGGA, GNGGA, ...). Other
//! sentence types and sentences with a bad checksum are ignored.

use crate::geo;
use super::{checksum_valid, finite, parse_num, GpsUpdate, Reject};

/// Parse one NMEA line into a reference fix.
pub fn unpack(line: &str, priority: u8) -> Result<GpsUpdate, Reject> {
    if !checksum_valid(line) {
        return Err(Reject::Ignore);
    }
    let Some((body, _)) = line.rsplit_once('*') else {
        return Err(Reject::Ignore);
    };
    let fields: Vec<&str> = body.split(',').collect();
    if !fields[0].ends_with("GGA") {
        return Err(Reject::Ignore);
    }
    if fields.len() < 12 {
        return Err(Reject::Malformed);
    }

    let mut latitude = geo::degrees_minutes_to_decimal(parse_num(fields[2])?);
    match fields[3] {
        "N" => {}
        "S" => latitude = -latitude,
        _ => return Err(Reject::Malformed),
    }
    let mut longitude = geo::degrees_minutes_to_decimal(parse_num(fields[4])?);
    match fields[5] {
        "E" => {}
        "W" => longitude = -longitude,
        _ => return Err(Reject::Malformed),
    }
    // range checks double as NaN rejection
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(Reject::Malformed);
    }

    let altitude = finite(parse_num(fields[9])?)?;
    let geoid_separation = finite(parse_num(fields[11])?)?;
    let h_dilution = finite(parse_num(fields[8])?)?;

    Ok(GpsUpdate {
        latitude,
        longitude,
        altitude,
        geoid_separation,
        fix_quality: parse_num(fields[6])?,
        satellites: parse_num(fields[7])?,
        h_dilution,
        priority,
    })
}
