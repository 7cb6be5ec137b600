//! Matching engine.
//!
//! Turns a fired match attempt into a trip: re-reads the route's capacity
//! from the driver registry, picks the waiting riders closest in time to
//! the driver's arrival, creates the trip, marks the riders assigned,
//! conditionally decrements the seat count and fans out notifications.

mod engine;
mod select;

pub use engine::{Assignment, EngineConfig, MatchAttempt, MatchEngine, MatchError, MatchOutcome};
pub use select::select_candidates;
