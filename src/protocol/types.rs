//! Typed update records produced by the feed parsers

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Line matched the expected shape but carried an unusable value, or a
    /// filter dropped it
    Malformed,
    /// Line is recognized but not applicable: keep-alives, other message
    /// subtypes, checksum failures
    Ignore,
}

/// Address scheme of an aircraft id (low two bits of the OGN flags byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IdType {
    Random = 0,
    Icao = 1,
    Flarm = 2,
    Ogn = 3,
}

impl From<u8> for IdType {
    fn from(byte: u8) -> Self {
        match byte & 0x03 {
            1 => Self::Icao,
            2 => Self::Flarm,
            3 => Self::Ogn,
            _ => Self::Random,
        }
    }
}

/// Device class that supplied an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Flarm,
    Transponder,
}

/// Aircraft type code for sources that do not report one
pub const AIRCRAFT_TYPE_UNKNOWN: u8 = 0;

/// One position report for one aircraft, normalized to internal units
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftUpdate {
    /// Store key, e.g. 6 hex chars; never empty
    pub id: String,

    /// Address scheme of the id
    pub id_type: IdType,

    /// OGN aircraft type code (0 = unknown)
    pub aircraft_type: u8,

    /// Device class this report came from
    pub source: TargetType,

    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Altitude in meters
    pub altitude: f64,

    /// True when the altitude is pressure-derived and needs QNH correction
    pub altitude_is_qne: bool,

    /// Ground speed in m/s
    pub ground_speed: Option<f64>,

    /// Heading in degrees [0, 360)
    pub heading: Option<f64>,

    /// Climb rate in m/s
    pub climb_rate: Option<f64>,

    /// Turn rate in degrees per second (validated, not tracked per aircraft)
    pub turn_rate: Option<f64>,

    /// Feed priority this report arrived with
    pub priority: u8,
}

impl AircraftUpdate {
    /// Position plus every movement field known
    pub fn full_info(&self) -> bool {
        self.ground_speed.is_some() && self.heading.is_some() && self.climb_rate.is_some()
    }
}

/// A reference-position fix from a GPS feed
#[derive(Debug, Clone, PartialEq)]
pub struct GpsUpdate {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Antenna altitude in meters
    pub altitude: f64,

    /// Geoid separation in meters
    pub geoid_separation: f64,

    /// GGA fix quality indicator
    pub fix_quality: u8,

    /// Satellites in use
    pub satellites: u8,

    /// Horizontal dilution of precision
    pub h_dilution: f64,

    /// Feed priority this fix arrived with
    pub priority: u8,
}

impl GpsUpdate {
    /// Fix good enough to pin the reference position in ground mode
    pub fn good_fix(&self) -> bool {
        self.satellites >= 7 && self.fix_quality >= 1 && self.h_dilution <= 1.0
    }
}

/// A weather-sensor report
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherUpdate {
    /// Atmospheric (MDA) sentence with its extracted station pressure
    Atmospheric { pressure_hpa: f64, sentence: String },
    /// Wind (MWV) sentence, relayed verbatim
    Wind { sentence: String },
}
