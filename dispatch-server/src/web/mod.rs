//! Inbound HTTP surface for the dispatch engine.
//!
//! Two endpoints carry the core's contracts: a newline-delimited JSON
//! location stream feeding the geofence detector, and a direct TryMatch
//! call into the matching engine.

mod dto;
mod routes;
mod state;
mod stream;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
pub use stream::location_samples;
