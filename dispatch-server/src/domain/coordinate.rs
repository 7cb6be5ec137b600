//! Geographic coordinate value type.

use std::fmt;

/// A WGS84 latitude/longitude pair in degrees.
///
/// Plain value type: construction does not validate ranges because
/// coordinates arrive from collaborators that own them (station registry,
/// driver location stream). Distance math treats them as spherical
/// coordinates; see [`crate::geo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub lat: f64,

    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}
