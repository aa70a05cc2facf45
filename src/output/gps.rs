//! Reference-position sentences
//!
//! Every cycle ends with a GPRMC/GPGGA pair describing the reference fix,
//! so display clients get an own-ship position even when no GPS feed is
//! connected. Timestamps come from the system clock, not from the feed.

use chrono::{DateTime, Utc};

use crate::geo;
use crate::tracker::ReferenceFix;
use super::finish_sentence;

/// Render the GPRMC/GPGGA pair for the current reference fix.
pub fn reference_sentences(fix: &ReferenceFix, now: DateTime<Utc>) -> String {
    let time = now.format("%H%M%S");
    let date = now.format("%d%m%y");
    let (lat_deg, lat_min) = geo::to_degrees_minutes(fix.latitude);
    let (lon_deg, lon_min) = geo::to_degrees_minutes(fix.longitude);
    let ns = if fix.latitude < 0.0 { 'S' } else { 'N' };
    let ew = if fix.longitude < 0.0 { 'W' } else { 'E' };

    let rmc = format!(
        "$GPRMC,{},A,{:02}{:05.2},{},{:03}{:05.2},{},0,0,{},001.0,W",
        time, lat_deg, lat_min, ns, lon_deg, lon_min, ew, date
    );
    let gga = format!(
        "$GPGGA,{},{:02}{:07.4},{},{:03}{:07.4},{},1,{:02},1,{},M,{:.1},M,,",
        time,
        lat_deg,
        lat_min,
        ns,
        lon_deg,
        lon_min,
        ew,
        fix.satellites,
        geo::round_i32(fix.altitude),
        fix.geoid_separation
    );

    let mut out = finish_sentence(&rmc);
    out.push_str(&finish_sentence(&gga));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fix(latitude: f64, longitude: f64) -> ReferenceFix {
        ReferenceFix {
            latitude,
            longitude,
            altitude: 300.4,
            geoid_separation: 47.9,
            fix_quality: 1,
            satellites: 8,
            h_dilution: 0.9,
        }
    }

    #[test]
    fn test_reference_pair_for_northern_fix() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 34, 56).unwrap();
        let block = reference_sentences(&fix(49.0, 8.0), now);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("$GPRMC,123456,A,4900.00,N,00800.00,E,0,0,010624,001.0,W*"));
        assert!(lines[1].starts_with("$GPGGA,123456,4900.0000,N,00800.0000,E,1,08,1,300,M,47.9,M,,*"));
        assert!(block.ends_with("\r\n"));
    }

    #[test]
    fn test_reference_pair_for_southern_fix() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let block = reference_sentences(&fix(-33.9, -18.5), now);
        let lines: Vec<&str> = block.lines().collect();
        assert!(lines[0].starts_with("$GPRMC,235959,A,3354.00,S,01830.00,W,0,0,311224,001.0,W*"));
        assert!(lines[1].starts_with("$GPGGA,235959,3354.0000,S,01830.0000,W,1,08,1,300,M,47.9,M,,*"));
    }

    #[test]
    fn test_sentences_carry_valid_checksums() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let block = reference_sentences(&fix(49.0, 8.0), now);
        for line in block.lines() {
            assert!(crate::protocol::checksum_valid(line), "bad checksum: {}", line);
        }
    }
}
