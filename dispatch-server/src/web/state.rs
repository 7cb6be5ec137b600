//! Application state for the web layer.

use std::sync::Arc;

use crate::detector::GeofenceDetector;
use crate::matching::MatchEngine;
use crate::registry::{DriverClient, NotifyClient, RiderClient, StationClient, TripClient};

/// Shared application state: one detector and one engine, generic over
/// the collaborator implementations so tests can swap in the in-memory
/// registries.
pub struct AppState<S, D, R, T, N> {
    /// Geofence detector consuming the location streams. Its dispatch
    /// seam is the engine below.
    pub detector: Arc<GeofenceDetector<S, D, Arc<MatchEngine<D, R, T, N>>>>,

    /// Matching engine, also reachable directly via TryMatch.
    pub engine: Arc<MatchEngine<D, R, T, N>>,
}

/// The production state, backed by the HTTP collaborator clients.
pub type HttpAppState = AppState<StationClient, DriverClient, RiderClient, TripClient, NotifyClient>;

impl<S, D, R, T, N> AppState<S, D, R, T, N> {
    /// Create an app state from a detector wired to the given engine.
    pub fn new(
        detector: GeofenceDetector<S, D, Arc<MatchEngine<D, R, T, N>>>,
        engine: Arc<MatchEngine<D, R, T, N>>,
    ) -> Self {
        Self {
            detector: Arc::new(detector),
            engine,
        }
    }
}

impl<S, D, R, T, N> Clone for AppState<S, D, R, T, N> {
    fn clone(&self) -> Self {
        Self {
            detector: self.detector.clone(),
            engine: self.engine.clone(),
        }
    }
}
