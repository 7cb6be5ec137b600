//! Wire DTOs for the inbound endpoints.
//!
//! Timestamps travel as unix seconds and are converted to `DateTime<Utc>`
//! at this boundary; the domain types stay serde-free.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::detector::LocationSample;
use crate::domain::{Coordinate, DriverId, RouteId, StationId};
use crate::matching::{MatchAttempt, MatchOutcome};

/// One line of the NDJSON location stream.
#[derive(Debug, Deserialize)]
pub struct LocationSampleDto {
    pub driver_id: String,
    pub route_id: String,
    pub point: PointDto,
    pub ts_unix: i64,
}

#[derive(Debug, Deserialize)]
pub struct PointDto {
    pub lat: f64,
    pub lon: f64,
}

impl LocationSampleDto {
    /// Convert to the domain sample. `None` when the timestamp is not
    /// representable.
    pub fn into_domain(self) -> Option<LocationSample> {
        let recorded_at = DateTime::from_timestamp(self.ts_unix, 0)?;
        Some(LocationSample {
            driver_id: DriverId::new(self.driver_id),
            route_id: RouteId::new(self.route_id),
            point: Coordinate::new(self.point.lat, self.point.lon),
            recorded_at,
        })
    }
}

/// Occupancy of the detector's station/route cache and debounce ledger.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub cached_stations: u64,
    pub cached_routes: u64,
    pub debounced_pairs: usize,
}

impl StatusResponse {
    pub fn from_status(status: crate::detector::DetectorStatus) -> Self {
        Self {
            cached_stations: status.cached_stations,
            cached_routes: status.cached_routes,
            debounced_pairs: status.debounced_pairs,
        }
    }
}

/// Acknowledgment sent once the location stream closes.
#[derive(Debug, Serialize)]
pub struct StreamAckResponse {
    pub ok: bool,
    pub samples: u64,
    pub triggers: u64,
}

/// Inbound TryMatch call.
#[derive(Debug, Deserialize)]
pub struct TryMatchRequest {
    pub driver_id: String,
    pub route_id: String,
    pub station_id: String,
    pub arrival_eta_unix: i64,
}

impl TryMatchRequest {
    /// Convert to a match attempt. `None` when the timestamp is not
    /// representable.
    pub fn into_attempt(self) -> Option<MatchAttempt> {
        let arrival_eta = DateTime::from_timestamp(self.arrival_eta_unix, 0)?;
        Some(MatchAttempt {
            driver_id: DriverId::new(self.driver_id),
            route_id: RouteId::new(self.route_id),
            station_id: StationId::new(self.station_id),
            arrival_eta,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentDto {
    pub rider_request_id: String,
    pub rider_id: String,
}

/// TryMatch response; `trip_id` is absent when nothing was matched.
#[derive(Debug, Serialize)]
pub struct TryMatchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    pub assignments: Vec<AssignmentDto>,
    pub seats_remaining: u32,
}

impl TryMatchResponse {
    pub fn from_outcome(outcome: MatchOutcome) -> Self {
        Self {
            trip_id: outcome.trip_id.map(|t| t.as_str().to_string()),
            assignments: outcome
                .assignments
                .into_iter()
                .map(|a| AssignmentDto {
                    rider_request_id: a.request_id.as_str().to_string(),
                    rider_id: a.rider_id.as_str().to_string(),
                })
                .collect(),
            seats_remaining: outcome.seats_remaining,
        }
    }

    /// Degraded response for an aborted attempt: best-known seats, no
    /// trip.
    pub fn seats_only(seats_remaining: u32) -> Self {
        Self {
            trip_id: None,
            assignments: Vec::new(),
            seats_remaining,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
