//! Domain types for the dispatch engine.
//!
//! Everything here is a plain value owned by an external registry and read
//! by this core: identifiers, coordinates, stations, routes, rider requests
//! and trips. Wire formats live in the registry clients and the web layer;
//! these types are serde-free.

mod coordinate;
mod id;
mod request;
mod route;
mod station;
mod trip;

pub use coordinate::Coordinate;
pub use id::{DriverId, RequestId, RiderId, RouteId, StationId, TripId};
pub use request::{RequestStatus, RiderRequest};
pub use route::{Route, RouteStop};
pub use station::Station;
pub use trip::{Trip, TripStatus};
