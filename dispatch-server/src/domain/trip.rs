//! Trips created by the matching engine.

use super::id::{DriverId, RiderId, RouteId, StationId, TripId};

/// Lifecycle of a trip. Created as `Scheduled`; later transitions are
/// owned by the trip collaborator and never performed by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Wire representation used by the trip service.
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Scheduled => "SCHEDULED",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse the wire representation. Unknown strings yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(TripStatus::Scheduled),
            "COMPLETED" => Some(TripStatus::Completed),
            "CANCELLED" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }
}

/// A driver matched with one or more riders at a pickup station.
///
/// Created exactly once per successful match attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    /// Trip-service-assigned identifier.
    pub id: TripId,

    /// The driving side of the match.
    pub driver_id: DriverId,

    /// Riders picked up; no rider appears in two scheduled trips at once.
    pub rider_ids: Vec<RiderId>,

    /// The route the driver was following when matched.
    pub route_id: RouteId,

    /// The pickup station.
    pub station_id: StationId,

    /// Lifecycle state.
    pub status: TripStatus,
}
