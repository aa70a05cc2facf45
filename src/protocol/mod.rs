//! Feed line parsers
//!
//! One submodule per wire format. Each parser is a pure function from one
//! raw line to a typed update or a [`Reject`], so every format can be
//! exercised in tests without a socket.

pub mod aprs;
pub mod gps;
pub mod sbs;
pub mod types;
pub mod weather;

use std::str::FromStr;

pub use types::{
    AircraftUpdate, GpsUpdate, IdType, Reject, TargetType, WeatherUpdate, AIRCRAFT_TYPE_UNKNOWN,
};

/// Verify the `*hh` XOR checksum of an NMEA-style sentence.
///
/// The checksum covers the characters between `$` and `*`. Sentences
/// without a checksum suffix fail verification.
pub fn checksum_valid(line: &str) -> bool {
    let Some((body, suffix)) = line.rsplit_once('*') else {
        return false;
    };
    let Ok(expected) = u8::from_str_radix(suffix.trim_end(), 16) else {
        return false;
    };
    crate::geo::nmea_checksum(body) == expected
}

/// Parse a numeric field of an already-matched line. Failure means the
/// line is shaped right but the value is not usable.
pub(crate) fn parse_num<T: FromStr>(field: &str) -> Result<T, Reject> {
    field.trim().parse().map_err(|_| Reject::Malformed)
}

/// Reject a value that is NaN or infinite.
///
/// `f64::from_str` accepts `NaN` and `inf` spellings and turns overflowed
/// literals into infinity instead of failing, so parsers apply this to
/// every float they store, after unit scaling.
pub(crate) fn finite(value: f64) -> Result<f64, Reject> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Reject::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_valid_accepts_correct_suffix() {
        // XOR of "GPGGA," .. computed by hand for a short body
        let body = "$GPTXT,01,01,02,ANTSTATUS=OK";
        let line = format!("{}*{:02x}", body, crate::geo::nmea_checksum(body));
        assert!(checksum_valid(&line));
        assert!(checksum_valid(&line.to_uppercase()));
    }

    #[test]
    fn test_checksum_valid_rejects_bad_suffix() {
        assert!(!checksum_valid("$GPGGA,123456*00"));
        assert!(!checksum_valid("$GPGGA,123456"));
        assert!(!checksum_valid("$GPGGA,123456*zz"));
    }

    #[test]
    fn test_finite_rejects_nan_and_infinity() {
        assert_eq!(finite(1013.25), Ok(1013.25));
        assert_eq!(finite(f64::NAN), Err(Reject::Malformed));
        assert_eq!(finite(f64::INFINITY), Err(Reject::Malformed));
        assert_eq!(finite(f64::NEG_INFINITY), Err(Reject::Malformed));
    }
}
