//! The match attempt itself.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::{DriverId, RequestId, RiderId, Route, RouteId, StationId, TripId};
use crate::registry::{
    DriverRegistry, Notifier, PushTarget, RegistryError, RiderRegistry, SeatUpdate, TripService,
};

use super::select::select_candidates;

/// A fired proximity trigger: this driver, on this route, is about to
/// reach this station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchAttempt {
    pub driver_id: DriverId,
    pub route_id: RouteId,
    pub station_id: StationId,

    /// When the driver is expected at the station. Candidate riders are
    /// windowed and ranked around this instant.
    pub arrival_eta: DateTime<Utc>,
}

/// One rider placed on the created trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub request_id: RequestId,
    pub rider_id: RiderId,
}

/// Result of a match attempt. `trip_id` is `None` when there was nothing
/// to match (no seats, no riders, route gone) — that is a normal outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub trip_id: Option<TripId>,
    pub assignments: Vec<Assignment>,
    pub seats_remaining: u32,
}

impl MatchOutcome {
    fn nothing(seats_remaining: u32) -> Self {
        Self {
            trip_id: None,
            assignments: Vec::new(),
            seats_remaining,
        }
    }
}

/// A match attempt aborted by a collaborator failure.
///
/// Carries the best seat count read before the failure so callers can
/// still report capacity; 0 when the attempt died before the route was
/// read.
#[derive(Debug, thiserror::Error)]
#[error("match attempt failed at {stage}: {source}")]
pub struct MatchError {
    pub stage: &'static str,
    pub seats_remaining: u32,
    #[source]
    pub source: RegistryError,
}

/// Configuration for the matching engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Half-width, in minutes, of the rider arrival window around the
    /// attempt's ETA.
    pub rider_window_mins: u32,

    /// How many times to retry the conditional seat update on conflict
    /// before giving up.
    pub seat_update_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rider_window_mins: 12,
            seat_update_attempts: 4,
        }
    }
}

/// Greedy, local matcher over the four collaborators it writes through.
pub struct MatchEngine<D, R, T, N> {
    drivers: D,
    riders: R,
    trips: T,
    notifier: N,
    config: EngineConfig,
}

impl<D, R, T, N> MatchEngine<D, R, T, N>
where
    D: DriverRegistry,
    R: RiderRegistry,
    T: TripService,
    N: Notifier,
{
    /// Create an engine over the given collaborators.
    pub fn new(drivers: D, riders: R, trips: T, notifier: N, config: EngineConfig) -> Self {
        Self {
            drivers,
            riders,
            trips,
            notifier,
            config,
        }
    }

    /// Attempt to pair the driver with riders waiting at the station.
    ///
    /// At most one trip is created per call. Capacity comes from the
    /// driver registry at call time, never from any cache. An `Err` means
    /// a collaborator failed; "no one to match" is an `Ok` with no trip.
    pub async fn try_match(&self, attempt: &MatchAttempt) -> Result<MatchOutcome, MatchError> {
        let route = self
            .drivers
            .get_route(&attempt.route_id)
            .await
            .map_err(|source| MatchError {
                stage: "fetch route",
                seats_remaining: 0,
                source,
            })?;

        let Some(route) = route else {
            debug!(route = %attempt.route_id, "route not found; nothing to match");
            return Ok(MatchOutcome::nothing(0));
        };
        if route.seats_free == 0 || route.dest_area.is_empty() {
            debug!(
                route = %route.id,
                seats_free = route.seats_free,
                "route not accepting riders"
            );
            return Ok(MatchOutcome::nothing(route.seats_free));
        }

        let candidates = self
            .riders
            .list_pending(
                &attempt.station_id,
                &route.dest_area,
                attempt.arrival_eta,
                self.config.rider_window_mins,
            )
            .await
            .map_err(|source| MatchError {
                stage: "list pending riders",
                seats_remaining: route.seats_free,
                source,
            })?;

        if candidates.is_empty() {
            debug!(
                station = %attempt.station_id,
                dest_area = %route.dest_area,
                "no pending riders in window"
            );
            return Ok(MatchOutcome::nothing(route.seats_free));
        }

        let chosen = select_candidates(candidates, attempt.arrival_eta, route.seats_free);
        let k = chosen.len() as u32;
        let rider_ids: Vec<RiderId> = chosen.iter().map(|r| r.rider_id.clone()).collect();
        let request_ids: Vec<RequestId> = chosen.iter().map(|r| r.id.clone()).collect();

        let trip = self
            .trips
            .create_trip(
                &attempt.driver_id,
                &rider_ids,
                &attempt.route_id,
                &attempt.station_id,
            )
            .await
            .map_err(|source| MatchError {
                stage: "create trip",
                seats_remaining: route.seats_free,
                source,
            })?;

        // From here on the trip exists; failures leave a known
        // inconsistency window rather than rolling anything back.
        self.riders
            .mark_assigned(&request_ids, &trip.id)
            .await
            .map_err(|source| MatchError {
                stage: "mark riders assigned",
                seats_remaining: route.seats_free,
                source,
            })?;

        let seats_remaining = self.decrement_seats(&route, k).await;

        self.notify_matched(&route, &rider_ids, &trip.id).await;

        info!(
            trip = %trip.id,
            driver = %attempt.driver_id,
            station = %attempt.station_id,
            riders = k,
            seats_remaining,
            "match confirmed"
        );

        Ok(MatchOutcome {
            trip_id: Some(trip.id),
            assignments: chosen
                .iter()
                .map(|r| Assignment {
                    request_id: r.id.clone(),
                    rider_id: r.rider_id.clone(),
                })
                .collect(),
            seats_remaining,
        })
    }

    /// Conditionally take `k` seats off the route, retrying on conflict.
    ///
    /// Each retry re-reads the registry's current count from the conflict
    /// response and re-applies the decrement to it, so concurrent attempts
    /// on the same route cannot overwrite each other's reservations.
    /// Returns the best-known remaining count; by this point the trip
    /// already exists, so failures here are logged, not propagated.
    async fn decrement_seats(&self, route: &Route, k: u32) -> u32 {
        let mut expected = route.seats_free;

        for _ in 0..self.config.seat_update_attempts {
            if expected < k {
                // Another attempt drained the seats we matched against.
                warn!(
                    route = %route.id,
                    seats_free = expected,
                    matched = k,
                    "route oversold; clamping seats to 0"
                );
            }
            let new_free = expected.saturating_sub(k);

            match self.drivers.update_seats(&route.id, expected, new_free).await {
                Ok(Some(SeatUpdate::Updated(updated))) => return updated.seats_free,
                Ok(Some(SeatUpdate::Conflict(current))) => {
                    debug!(
                        route = %route.id,
                        expected,
                        current = current.seats_free,
                        "seat update conflict; retrying against current count"
                    );
                    expected = current.seats_free;
                }
                Ok(None) => {
                    warn!(route = %route.id, "route disappeared during seat update");
                    return new_free;
                }
                Err(e) => {
                    error!(route = %route.id, error = %e, "seat update failed");
                    return new_free;
                }
            }
        }

        error!(
            route = %route.id,
            attempts = self.config.seat_update_attempts,
            "seat update conflicts exhausted retries"
        );
        expected.saturating_sub(k)
    }

    /// Best-effort fan-out to the driver and every matched rider.
    async fn notify_matched(&self, route: &Route, rider_ids: &[RiderId], trip_id: &TripId) {
        let mut targets = Vec::with_capacity(rider_ids.len() + 1);
        targets.push(PushTarget::new(route.driver_id.as_str(), "log"));
        targets.extend(
            rider_ids
                .iter()
                .map(|r| PushTarget::new(r.as_str(), "log")),
        );

        let payload = serde_json::json!({ "tripId": trip_id.as_str() }).to_string();
        match self
            .notifier
            .push(
                &targets,
                "Match confirmed",
                "Your pickup is scheduled.",
                &payload,
            )
            .await
        {
            Ok(report) => {
                debug!(
                    trip = %trip_id,
                    attempted = report.attempted,
                    success = report.success,
                    "notifications sent"
                );
            }
            Err(e) => {
                // Never unwinds a successful match.
                warn!(trip = %trip_id, error = %e, "notification fan-out failed");
            }
        }
    }
}

#[async_trait::async_trait]
impl<D, R, T, N> crate::detector::MatchDispatch for MatchEngine<D, R, T, N>
where
    D: DriverRegistry,
    R: RiderRegistry,
    T: TripService,
    N: Notifier,
{
    async fn try_match(&self, attempt: &MatchAttempt) -> Result<MatchOutcome, MatchError> {
        MatchEngine::try_match(self, attempt).await
    }
}
