//! Runtime configuration
//!
//! Loaded once at startup from a TOML file plus `FLARMHUB_`-prefixed
//! environment overrides, then validated. Invalid configuration is fatal;
//! there is no partial startup.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reference latitude {0} out of range [-90, 90]")]
    BadLatitude(f64),
    #[error("reference longitude {0} out of range [-180, 180]")]
    BadLongitude(f64),
    #[error("output port must not be 0")]
    BadOutputPort,
    #[error("output max_clients must be at least 1")]
    BadClientLimit,
    #[error("cycle_interval_secs must be at least 1")]
    BadCycleInterval,
    #[error("feed {0}: host must not be empty")]
    EmptyFeedHost(usize),
    #[error("feed {0}: port must not be 0")]
    BadFeedPort(usize),
}

/// Wire format a feed speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Aprs,
    Sbs,
    Gps,
    Weather,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedKind::Aprs => "aprs",
            FeedKind::Sbs => "sbs",
            FeedKind::Gps => "gps",
            FeedKind::Weather => "weather",
        };
        f.write_str(name)
    }
}

/// One upstream source
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub kind: FeedKind,
    pub host: String,
    pub port: u16,

    /// Arbitration priority of this source; 0 never displaces others
    #[serde(default)]
    pub priority: u8,

    /// Line sent right after connecting, for servers that expect a login
    #[serde(default)]
    pub login: Option<String>,

    /// Reconnect when no line arrives within this window
    #[serde(default)]
    pub read_timeout_secs: Option<u64>,
}

impl FeedConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

/// Reference position defaults, used until a GPS feed overrides them
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    pub latitude: f64,
    pub longitude: f64,

    /// Meters above sea level
    #[serde(default)]
    pub altitude: f64,

    /// Geoid separation in meters
    #[serde(default)]
    pub geoid_separation: f64,

    /// Station pressure in hPa until a weather feed reports one
    #[serde(default = "default_pressure")]
    pub pressure_hpa: f64,

    /// Priority the configured position holds in arbitration
    #[serde(default)]
    pub priority: u8,
}

/// Output server settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_port")]
    pub port: u16,

    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Drop a client whose write stalls this long
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            port: default_output_port(),
            max_clients: default_max_clients(),
            write_timeout_secs: default_write_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub feeds: Vec<FeedConfig>,

    #[serde(default)]
    pub output: OutputConfig,

    /// Reject aircraft reported above this altitude, meters
    #[serde(default = "default_max_height")]
    pub max_height_m: f64,

    /// Suppress aircraft farther than this from the reference, meters
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,

    /// Delay between reconnect attempts, seconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    /// Seconds between report cycles
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_secs: u64,

    /// Stop the GPS feed once a good fix has pinned the reference
    #[serde(default)]
    pub ground_mode: bool,
}

fn default_pressure() -> f64 {
    1013.25
}

fn default_output_port() -> u16 {
    2000
}

fn default_max_clients() -> usize {
    5
}

fn default_write_timeout() -> u64 {
    5
}

fn default_max_height() -> f64 {
    10_000.0
}

fn default_max_distance() -> f64 {
    25_000.0
}

fn default_reconnect_delay() -> u64 {
    10
}

fn default_cycle_interval() -> u64 {
    1
}

/// Environment overrides: `FLARMHUB_` before the first key, `__` between
/// nesting levels, e.g. `FLARMHUB_OUTPUT__PORT`.
fn env_source() -> config::Environment {
    config::Environment::with_prefix("FLARMHUB")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    /// Load from the given TOML file plus environment overrides and
    /// validate the result.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env_source())
            .build()
            .context("reading configuration")?;
        let settings: Settings = raw
            .try_deserialize()
            .context("deserializing configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.reference.latitude) {
            return Err(ConfigError::BadLatitude(self.reference.latitude));
        }
        if !(-180.0..=180.0).contains(&self.reference.longitude) {
            return Err(ConfigError::BadLongitude(self.reference.longitude));
        }
        if self.output.port == 0 {
            return Err(ConfigError::BadOutputPort);
        }
        if self.output.max_clients == 0 {
            return Err(ConfigError::BadClientLimit);
        }
        if self.cycle_interval_secs == 0 {
            return Err(ConfigError::BadCycleInterval);
        }
        for (index, feed) in self.feeds.iter().enumerate() {
            if feed.host.is_empty() {
                return Err(ConfigError::EmptyFeedHost(index));
            }
            if feed.port == 0 {
                return Err(ConfigError::BadFeedPort(index));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from(toml: &str) -> anyhow::Result<Settings> {
        let raw = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    const MINIMAL: &str = r#"
        [reference]
        latitude = 49.47
        longitude = 8.55
        altitude = 110.0
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let settings = settings_from(MINIMAL).unwrap();
        assert_eq!(settings.output.port, 2000);
        assert_eq!(settings.output.max_clients, 5);
        assert!((settings.reference.pressure_hpa - 1013.25).abs() < 1e-9);
        assert_eq!(settings.cycle_interval_secs, 1);
        assert!(settings.feeds.is_empty());
        assert!(!settings.ground_mode);
    }

    #[test]
    fn test_full_config_round_trip() {
        let toml = r#"
            max_height_m = 3000.0
            max_distance_m = 20000.0
            ground_mode = true

            [reference]
            latitude = 49.47
            longitude = 8.55
            altitude = 110.0
            geoid_separation = 48.0
            pressure_hpa = 1020.0
            priority = 1

            [output]
            port = 2000
            max_clients = 3
            write_timeout_secs = 2

            [[feeds]]
            kind = "aprs"
            host = "aprs.glidernet.org"
            port = 14580
            priority = 3
            login = "user NOCALL pass -1 vers flarmhub 0.1 filter r/49.47/8.55/100"

            [[feeds]]
            kind = "gps"
            host = "localhost"
            port = 10110
            priority = 4
            read_timeout_secs = 30
        "#;
        let settings = settings_from(toml).unwrap();
        assert_eq!(settings.feeds.len(), 2);
        assert_eq!(settings.feeds[0].kind, FeedKind::Aprs);
        assert!(settings.feeds[0].login.is_some());
        assert_eq!(
            settings.feeds[1].read_timeout(),
            Some(Duration::from_secs(30))
        );
        assert!(settings.ground_mode);
    }

    #[test]
    fn test_environment_override_applies() {
        let mut vars = config::Map::new();
        vars.insert("FLARMHUB_OUTPUT__PORT".to_string(), "2947".to_string());
        let raw = config::Config::builder()
            .add_source(config::File::from_str(MINIMAL, config::FileFormat::Toml))
            .add_source(env_source().source(Some(vars)))
            .build()
            .unwrap();
        let settings: Settings = raw.try_deserialize().unwrap();
        assert_eq!(settings.output.port, 2947);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let toml = r#"
            [reference]
            latitude = 91.0
            longitude = 8.55
        "#;
        assert!(settings_from(toml).is_err());
    }

    #[test]
    fn test_feed_without_host_rejected() {
        let toml = r#"
            [reference]
            latitude = 49.0
            longitude = 8.0

            [[feeds]]
            kind = "sbs"
            host = ""
            port = 30003
        "#;
        assert!(settings_from(toml).is_err());
    }

    #[test]
    fn test_zero_max_clients_rejected() {
        let toml = r#"
            [reference]
            latitude = 49.0
            longitude = 8.0

            [output]
            max_clients = 0
        "#;
        assert!(settings_from(toml).is_err());
    }
}
