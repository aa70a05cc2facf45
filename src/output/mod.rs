//! Output sentence rendering and client fan-out

mod flarm;
mod gps;
mod server;

pub use flarm::TrafficReporter;
pub use gps::reference_sentences;
pub use server::OutputServer;

use crate::geo;

/// Close a sentence body with its checksum suffix and CRLF.
pub(crate) fn finish_sentence(body: &str) -> String {
    format!("{}*{:02x}\r\n", body, geo::nmea_checksum(body))
}
