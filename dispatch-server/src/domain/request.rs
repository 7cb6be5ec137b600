//! Rider pickup requests.

use chrono::{DateTime, Utc};

use super::id::{RequestId, RiderId, StationId, TripId};

/// Lifecycle of a rider request.
///
/// Transitions are one-way: `Pending` → `Assigned` → `Completed`. The rider
/// registry owns the transition; this core only ever asks for the
/// `Pending` → `Assigned` step (via `mark_assigned`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting at the station, eligible for matching.
    Pending,
    /// Promised a seat on a scheduled trip.
    Assigned,
    /// The trip happened; terminal.
    Completed,
}

impl RequestStatus {
    /// Wire representation used by the rider registry.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Assigned => "ASSIGNED",
            RequestStatus::Completed => "COMPLETED",
        }
    }

    /// Parse the wire representation. Unknown strings yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RequestStatus::Pending),
            "ASSIGNED" => Some(RequestStatus::Assigned),
            "COMPLETED" => Some(RequestStatus::Completed),
            _ => None,
        }
    }
}

/// A rider waiting at a station for a lift towards a destination area.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderRequest {
    /// Registry-assigned identifier.
    pub id: RequestId,

    /// The rider who filed the request.
    pub rider_id: RiderId,

    /// Station the rider is waiting at.
    pub station_id: StationId,

    /// Free-text destination area; matched against a route's `dest_area`.
    pub dest_area: String,

    /// When the rider wants to be picked up.
    pub requested_arrival: DateTime<Utc>,

    /// Lifecycle state.
    pub status: RequestStatus,

    /// Set once the request has been assigned to a trip.
    pub trip_id: Option<TripId>,
}
