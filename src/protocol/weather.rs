//! Weather-sensor NMEA parser
//!
//! MDA (meteorological composite) and MWV (wind) sentences pass through to
//! the output verbatim. The only field consumed internally is the MDA
//! barometric pressure, which drives the QNH correction of transponder
//! altitudes.

use super::{checksum_valid, finite, parse_num, Reject, WeatherUpdate};

const BAR_UNIT_MARKER: &str = "B";

/// Parse one sensor line into a weather update.
pub fn unpack(line: &str) -> Result<WeatherUpdate, Reject> {
    if !checksum_valid(line) {
        return Err(Reject::Ignore);
    }
    let Some((body, _)) = line.rsplit_once('*') else {
        return Err(Reject::Ignore);
    };

    // sentence type sits after the two-letter talker id
    match body.get(3..6) {
        Some("MDA") => {
            let fields: Vec<&str> = body.split(',').collect();
            // pressure in bar sits right before its "B" unit marker
            let marker = fields
                .iter()
                .position(|f| *f == BAR_UNIT_MARKER)
                .ok_or(Reject::Malformed)?;
            if marker == 0 {
                return Err(Reject::Malformed);
            }
            let pressure_hpa = finite(parse_num::<f64>(fields[marker - 1])? * 1000.0)?;
            // the standard-atmosphere height conversion needs a positive pressure
            if pressure_hpa <= 0.0 {
                return Err(Reject::Malformed);
            }
            Ok(WeatherUpdate::Atmospheric {
                pressure_hpa,
                sentence: line.to_string(),
            })
        }
        Some("MWV") => Ok(WeatherUpdate::Wind {
            sentence: line.to_string(),
        }),
        _ => Err(Reject::Ignore),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(body: &str) -> String {
        format!("{}*{:02x}", body, crate::geo::nmea_checksum(body))
    }

    #[test]
    fn test_mda_pressure_extraction() {
        let line = with_checksum("$WIMDA,29.7544,I,1.0076,B,23.5,C,,,,,,,,,,,,,,");
        match unpack(&line).unwrap() {
            WeatherUpdate::Atmospheric {
                pressure_hpa,
                sentence,
            } => {
                assert!((pressure_hpa - 1007.6).abs() < 1e-6);
                assert_eq!(sentence, line);
            }
            other => panic!("expected atmospheric update, got {:?}", other),
        }
    }

    #[test]
    fn test_mwv_passes_through() {
        let line = with_checksum("$WIMWV,214.8,R,0.1,K,A");
        match unpack(&line).unwrap() {
            WeatherUpdate::Wind { sentence } => assert_eq!(sentence, line),
            other => panic!("expected wind update, got {:?}", other),
        }
    }

    #[test]
    fn test_mda_without_bar_marker_is_malformed() {
        let line = with_checksum("$WIMDA,29.7544,I,23.5,C,,,,,,,,,,,,,,");
        assert_eq!(unpack(&line), Err(Reject::Malformed));
    }

    #[test]
    fn test_unusable_pressure_is_malformed() {
        let nan = with_checksum("$WIMDA,29.7544,I,NaN,B,23.5,C,,,,,,,,,,,,,,");
        assert_eq!(unpack(&nan), Err(Reject::Malformed));
        let negative = with_checksum("$WIMDA,29.7544,I,-1.0076,B,23.5,C,,,,,,,,,,,,,,");
        assert_eq!(unpack(&negative), Err(Reject::Malformed));
    }

    #[test]
    fn test_other_sensor_sentences_are_ignored() {
        let line = with_checksum("$WIMTA,23.5,C");
        assert_eq!(unpack(&line), Err(Reject::Ignore));
        assert_eq!(unpack("$WIMDA,no,checksum,here"), Err(Reject::Ignore));
    }
}
