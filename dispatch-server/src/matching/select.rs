//! Candidate selection for a match attempt.

use chrono::{DateTime, Utc};

use crate::domain::RiderRequest;

/// Pick up to `seats_free` candidates, closest in time to the driver's
/// arrival first.
///
/// Sort key is `(|requested_arrival − arrival_eta|, requested_arrival)`:
/// smallest gap wins, earliest requester breaks ties. The order is total
/// for practical purposes (two requests with identical arrival times sort
/// stably), which keeps selection reproducible.
pub fn select_candidates(
    mut candidates: Vec<RiderRequest>,
    arrival_eta: DateTime<Utc>,
    seats_free: u32,
) -> Vec<RiderRequest> {
    candidates.sort_by_key(|r| {
        let gap = (r.requested_arrival - arrival_eta).num_seconds().abs();
        (gap, r.requested_arrival)
    });
    candidates.truncate(seats_free as usize);
    candidates
}
