//! Geodesic and unit-conversion primitives
//!
//! Pure helpers shared by the feed parsers and the sentence renderers.
//! Positions are decimal degrees, altitudes meters, speeds m/s throughout.

/// Mean Earth radius in meters (spherical model)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// ICAO standard atmosphere sea-level pressure in hPa
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// Feet to meters
pub const FT_TO_M: f64 = 0.3048;

/// Knots to meters per second
pub const KT_TO_MS: f64 = 0.514444;

/// Feet per minute to meters per second
pub const FPM_TO_MS: f64 = 0.00508;

/// Half-turns per minute to degrees per second
pub const ROT_TO_DEG_S: f64 = 3.0;

/// Meters per second to kilometers per hour
pub const MS_TO_KMH: f64 = 3.6;

/// Round to the nearest integer, halves away from zero.
pub fn round_i32(x: f64) -> i32 {
    // f64::round already rounds half-way cases away from zero
    x.round() as i32
}

/// Decode the packed NMEA/APRS "DDMM.mm" degrees-minutes format into decimal
/// degrees. The caller applies the sign from the N/S/E/W suffix.
pub fn degrees_minutes_to_decimal(dm: f64) -> f64 {
    let degrees = (dm / 100.0).trunc();
    let minutes = dm - degrees * 100.0;
    degrees + minutes / 60.0
}

/// Split an absolute coordinate into whole degrees and decimal minutes for
/// NMEA rendering.
pub fn to_degrees_minutes(value: f64) -> (u32, f64) {
    let abs = value.abs();
    let degrees = abs.trunc();
    (degrees as u32, (abs - degrees) * 60.0)
}

/// XOR checksum over an NMEA sentence body: every byte after a leading `$`
/// up to (not including) the `*` delimiter, or the end of the string.
pub fn nmea_checksum(sentence: &str) -> u8 {
    let bytes = sentence.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'$'));
    let mut sum = 0u8;
    for &b in &bytes[start..] {
        if b == b'*' {
            break;
        }
        sum ^= b;
    }
    sum
}

/// Height of the given pressure level in the ICAO standard atmosphere,
/// meters. Evaluated at the 15 °C sea-level standard temperature; negative
/// for pressures above 1013.25 hPa.
pub fn icao_height_from_pressure(pressure_hpa: f64) -> f64 {
    (273.15 + 15.0) * (1.0 - (pressure_hpa / STANDARD_PRESSURE_HPA).powf(0.190295)) / 0.0065
}

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from the first point to the second, degrees
/// in [0, 360).
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();
    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}
