//! Geofence detector.
//!
//! Consumes a driver's location stream and decides when a match attempt
//! should fire: close enough in space (geofence radius), soon enough in
//! time (estimated arrival inside the stop's window), and not fired
//! recently for the same (driver, station) pair (debounce).

mod debounce;
#[cfg(test)]
mod detector_tests;
mod geofence;

pub use debounce::DebounceLedger;
pub use geofence::{
    DetectorConfig, DetectorStatus, GeofenceDetector, LocationSample, MatchDispatch, StreamSummary,
};
