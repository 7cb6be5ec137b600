//! Driver routes and their stops.

use super::id::{DriverId, RouteId, StationId};

/// One station on a route, paired with its matching window.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop {
    /// The station this stop refers to.
    pub station_id: StationId,

    /// Maximum estimated minutes-to-arrival at which the stop still
    /// qualifies for a match attempt. A driver inside the geofence but
    /// estimated to arrive later than this is skipped.
    pub minutes_before_eta_match: u32,
}

/// A driver's registered multi-stop route, owned by the driver registry.
///
/// The seat counters are a snapshot: `seats_free` changes concurrently on
/// the registry side, so cached copies of a route may only be used for the
/// stop list and matching windows. Capacity decisions always re-read the
/// registry (see [`crate::matching`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Registry-assigned identifier.
    pub id: RouteId,

    /// The driver who registered the route.
    pub driver_id: DriverId,

    /// Free-text destination area; riders are matched on string equality.
    /// Empty means the route is not accepting riders.
    pub dest_area: String,

    /// Total seats on the vehicle.
    pub seats_total: u32,

    /// Seats not yet promised to riders. Always <= `seats_total`.
    pub seats_free: u32,

    /// Stations the driver passes, in driving order.
    pub stops: Vec<RouteStop>,
}
