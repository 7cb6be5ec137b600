//! Streaming proximity detection over driver locations.

use std::pin::pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tracing::{debug, info, trace, warn};

use crate::cache::ProximityCache;
use crate::domain::{Coordinate, DriverId, RouteId, RouteStop};
use crate::geo::distance_m;
use crate::matching::{MatchAttempt, MatchError, MatchOutcome};
use crate::registry::{DriverRegistry, StationRegistry};

use super::debounce::DebounceLedger;

/// Where dispatched match attempts go.
///
/// Implemented by the matching engine in process; tests substitute a
/// recorder. The detector only logs the outcome either way.
#[async_trait]
pub trait MatchDispatch: Send + Sync {
    async fn try_match(&self, attempt: &MatchAttempt) -> Result<MatchOutcome, MatchError>;
}

#[async_trait]
impl<T: MatchDispatch + ?Sized> MatchDispatch for std::sync::Arc<T> {
    async fn try_match(&self, attempt: &MatchAttempt) -> Result<MatchOutcome, MatchError> {
        (**self).try_match(attempt).await
    }
}

/// One reading from a driver's location stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSample {
    pub driver_id: DriverId,
    pub route_id: RouteId,
    pub point: Coordinate,

    /// When the sample was taken, per the sample source's clock.
    pub recorded_at: DateTime<Utc>,
}

/// Acknowledgment returned after a location stream closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Samples consumed, including discarded ones.
    pub samples: u64,

    /// Match attempts dispatched (successful or not).
    pub triggers: u64,
}

/// Configuration for the geofence detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Maximum distance at which a driver counts as "near" a station.
    pub geofence_radius_m: f64,

    /// Assumed driving speed for the ETA estimate. There is no live speed
    /// signal; this is a fixed planning constant.
    pub average_speed_mps: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            geofence_radius_m: 400.0,
            average_speed_mps: 10.0,
        }
    }
}

/// Evaluates every stop of a driver's route against each incoming
/// location sample and fires at most one match attempt per
/// (driver, station) per debounce window.
pub struct GeofenceDetector<S, D, M> {
    cache: ProximityCache<S, D>,
    ledger: DebounceLedger,
    dispatch: M,
    config: DetectorConfig,
}

impl<S, D, M> GeofenceDetector<S, D, M>
where
    S: StationRegistry,
    D: DriverRegistry,
    M: MatchDispatch,
{
    /// Create a detector owning its cache and debounce ledger.
    pub fn new(
        cache: ProximityCache<S, D>,
        ledger: DebounceLedger,
        dispatch: M,
        config: DetectorConfig,
    ) -> Self {
        Self {
            cache,
            ledger,
            dispatch,
            config,
        }
    }

    /// Consume a location stream until its source closes it.
    ///
    /// One bad sample never ends the stream: lookup failures and missing
    /// routes are logged and the next sample is awaited. The returned
    /// summary is the stream's single acknowledgment.
    pub async fn consume<St>(&self, samples: St) -> StreamSummary
    where
        St: Stream<Item = LocationSample>,
    {
        let mut samples = pin!(samples);
        let mut summary = StreamSummary::default();

        while let Some(sample) = samples.next().await {
            summary.samples += 1;
            summary.triggers += self.evaluate_sample(&sample).await;
        }

        debug!(
            samples = summary.samples,
            triggers = summary.triggers,
            "location stream closed"
        );
        summary
    }

    /// Evaluate one sample against every stop on its route. Returns the
    /// number of match attempts dispatched.
    async fn evaluate_sample(&self, sample: &LocationSample) -> u64 {
        let route = match self.cache.route(&sample.route_id).await {
            Ok(Some(route)) => route,
            Ok(None) => {
                debug!(route = %sample.route_id, driver = %sample.driver_id, "unknown route; sample discarded");
                return 0;
            }
            Err(e) => {
                warn!(route = %sample.route_id, error = %e, "route lookup failed; sample discarded");
                return 0;
            }
        };

        // Every stop is evaluated independently, no short-circuit after a
        // trigger: a driver may qualify at more than one upcoming stop.
        let mut triggers = 0;
        for stop in &route.stops {
            if self.evaluate_stop(sample, stop).await {
                triggers += 1;
            }
        }
        triggers
    }

    /// Run one stop through the distance, ETA and debounce gates; fire a
    /// match attempt if all pass. Returns whether an attempt fired.
    async fn evaluate_stop(&self, sample: &LocationSample, stop: &RouteStop) -> bool {
        let coordinate = match self.cache.station_coordinate(&stop.station_id).await {
            Ok(Some(coordinate)) => coordinate,
            Ok(None) => {
                trace!(station = %stop.station_id, "unknown station; stop skipped");
                return false;
            }
            Err(e) => {
                warn!(station = %stop.station_id, error = %e, "station lookup failed; stop skipped");
                return false;
            }
        };

        let distance = distance_m(sample.point, coordinate);
        if distance > self.config.geofence_radius_m {
            trace!(station = %stop.station_id, distance, "outside geofence");
            return false;
        }

        // Close in space but possibly still far in time.
        let eta_minutes = (distance / self.config.average_speed_mps) / 60.0;
        if eta_minutes > f64::from(stop.minutes_before_eta_match) {
            trace!(
                station = %stop.station_id,
                eta_minutes,
                window = stop.minutes_before_eta_match,
                "eta outside matching window"
            );
            return false;
        }

        if self
            .ledger
            .should_suppress(&sample.driver_id, &stop.station_id, sample.recorded_at)
        {
            debug!(
                driver = %sample.driver_id,
                station = %stop.station_id,
                "trigger debounced"
            );
            return false;
        }

        let attempt = MatchAttempt {
            driver_id: sample.driver_id.clone(),
            route_id: sample.route_id.clone(),
            station_id: stop.station_id.clone(),
            arrival_eta: sample.recorded_at,
        };
        match self.dispatch.try_match(&attempt).await {
            Ok(outcome) => match &outcome.trip_id {
                Some(trip_id) => info!(
                    station = %stop.station_id,
                    trip = %trip_id,
                    seats_remaining = outcome.seats_remaining,
                    "matched"
                ),
                None => debug!(
                    station = %stop.station_id,
                    seats_remaining = outcome.seats_remaining,
                    "match attempt found no riders"
                ),
            },
            Err(e) => {
                // The attempt is gone; the stream keeps flowing.
                warn!(station = %stop.station_id, error = %e, "match attempt failed");
            }
        }
        true
    }

    /// Occupancy snapshot of the cache and debounce ledger, served by the
    /// status endpoint.
    pub async fn status(&self) -> DetectorStatus {
        DetectorStatus {
            cached_stations: self.cache.coordinate_entry_count().await,
            cached_routes: self.cache.route_entry_count().await,
            debounced_pairs: self.ledger.entry_count(),
        }
    }
}

/// Occupancy of the detector's in-process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorStatus {
    pub cached_stations: u64,
    pub cached_routes: u64,
    pub debounced_pairs: usize,
}
