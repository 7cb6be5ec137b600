//! Pickup station.

use super::coordinate::Coordinate;
use super::id::StationId;

/// A fixed pickup station, owned by the station registry.
///
/// This core only reads stations; the registry assigns identifiers and may
/// move or rename a station at any time (the proximity cache accepts that
/// staleness, see [`crate::cache`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Registry-assigned identifier.
    pub id: StationId,

    /// Human-readable name.
    pub name: String,

    /// Where the station is.
    pub location: Coordinate,

    /// Area names a rider at this station might be heading to.
    pub nearby_areas: Vec<String>,
}
