//! Weather-sensor state
//!
//! The station pressure persists between reports and feeds the QNH
//! correction of transponder altitudes. The raw MDA/MWV sentences are held
//! only until the next report cycle relays them.

use std::sync::Mutex;

use crate::protocol::WeatherUpdate;

struct WeatherState {
    pressure_hpa: f64,
    pending_atmospheric: Option<String>,
    pending_wind: Option<String>,
}

/// Singleton holder for sensor state
pub struct WeatherStore {
    state: Mutex<WeatherState>,
}

impl WeatherStore {
    pub fn new(pressure_hpa: f64) -> Self {
        Self {
            state: Mutex::new(WeatherState {
                pressure_hpa,
                pending_atmospheric: None,
                pending_wind: None,
            }),
        }
    }

    /// Store a sensor report. Later reports of the same kind within one
    /// cycle replace earlier ones.
    pub fn update(&self, update: WeatherUpdate) {
        let mut state = self.state.lock().unwrap();
        match update {
            WeatherUpdate::Atmospheric {
                pressure_hpa,
                sentence,
            } => {
                state.pressure_hpa = pressure_hpa;
                state.pending_atmospheric = Some(sentence);
            }
            WeatherUpdate::Wind { sentence } => {
                state.pending_wind = Some(sentence);
            }
        }
    }

    /// Last known station pressure in hPa.
    pub fn pressure(&self) -> f64 {
        self.state.lock().unwrap().pressure_hpa
    }

    /// Take the relay block queued since the last cycle, atmospheric
    /// before wind, each sentence CRLF-terminated.
    pub fn take_pending(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        let mut out = String::new();
        if let Some(sentence) = state.pending_atmospheric.take() {
            out.push_str(&sentence);
            out.push_str("\r\n");
        }
        if let Some(sentence) = state.pending_wind.take() {
            out.push_str(&sentence);
            out.push_str("\r\n");
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}
