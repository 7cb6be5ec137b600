//! In-memory collaborators for development and testing.
//!
//! Behaviourally equivalent to the real registries (seat updates are
//! conditional, `mark_assigned` only moves PENDING requests) so the engine
//! and detector can be exercised end to end without any network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    DriverId, RequestId, RequestStatus, RiderId, RiderRequest, Route, RouteId, Station, StationId,
    Trip, TripId, TripStatus,
};

use super::driver::{DriverRegistry, SeatUpdate};
use super::error::RegistryError;
use super::notify::{Notifier, PushReport, PushTarget};
use super::rider::RiderRegistry;
use super::station::StationRegistry;
use super::trip::TripService;

/// In-memory station registry.
#[derive(Default)]
pub struct InMemoryStationRegistry {
    stations: Mutex<HashMap<StationId, Station>>,
}

impl InMemoryStationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a station, replacing any existing entry with the same id.
    pub fn insert(&self, station: Station) {
        self.stations
            .lock()
            .unwrap()
            .insert(station.id.clone(), station);
    }
}

#[async_trait]
impl StationRegistry for InMemoryStationRegistry {
    async fn get_station(&self, id: &StationId) -> Result<Option<Station>, RegistryError> {
        Ok(self.stations.lock().unwrap().get(id).cloned())
    }
}

/// In-memory driver registry with conditional seat updates.
#[derive(Default)]
pub struct InMemoryDriverRegistry {
    routes: Mutex<HashMap<RouteId, Route>>,
}

impl InMemoryDriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, replacing any existing entry with the same id.
    pub fn insert(&self, route: Route) {
        self.routes.lock().unwrap().insert(route.id.clone(), route);
    }

    /// Current state of a route, for assertions.
    pub fn route(&self, id: &RouteId) -> Option<Route> {
        self.routes.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl DriverRegistry for InMemoryDriverRegistry {
    async fn get_route(&self, id: &RouteId) -> Result<Option<Route>, RegistryError> {
        Ok(self.routes.lock().unwrap().get(id).cloned())
    }

    async fn update_seats(
        &self,
        id: &RouteId,
        expected_free: u32,
        new_free: u32,
    ) -> Result<Option<SeatUpdate>, RegistryError> {
        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes.get_mut(id) else {
            return Ok(None);
        };
        // Check-and-set under the single lock, the same atomicity a real
        // registry provides with a conditional write.
        if route.seats_free != expected_free {
            return Ok(Some(SeatUpdate::Conflict(route.clone())));
        }
        route.seats_free = new_free.min(route.seats_total);
        Ok(Some(SeatUpdate::Updated(route.clone())))
    }
}

/// In-memory rider registry.
#[derive(Default)]
pub struct InMemoryRiderRegistry {
    requests: Mutex<HashMap<RequestId, RiderRequest>>,
}

impl InMemoryRiderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a request, replacing any existing entry with the same id.
    pub fn insert(&self, request: RiderRequest) {
        self.requests
            .lock()
            .unwrap()
            .insert(request.id.clone(), request);
    }

    /// Current state of a request, for assertions.
    pub fn request(&self, id: &RequestId) -> Option<RiderRequest> {
        self.requests.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl RiderRegistry for InMemoryRiderRegistry {
    async fn list_pending(
        &self,
        station: &StationId,
        dest_area: &str,
        around: DateTime<Utc>,
        window_mins: u32,
    ) -> Result<Vec<RiderRequest>, RegistryError> {
        let window = Duration::minutes(i64::from(window_mins));
        let mut pending: Vec<RiderRequest> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                r.status == RequestStatus::Pending
                    && &r.station_id == station
                    && r.dest_area == dest_area
                    && (r.requested_arrival - around).abs() <= window
            })
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.requested_arrival);
        Ok(pending)
    }

    async fn mark_assigned(
        &self,
        request_ids: &[RequestId],
        trip_id: &TripId,
    ) -> Result<u64, RegistryError> {
        let mut requests = self.requests.lock().unwrap();
        let mut updated = 0;
        for id in request_ids {
            if let Some(request) = requests.get_mut(id) {
                if request.status == RequestStatus::Pending {
                    request.status = RequestStatus::Assigned;
                    request.trip_id = Some(trip_id.clone());
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }
}

/// In-memory trip service that mints sequential trip identifiers.
#[derive(Default)]
pub struct InMemoryTripService {
    trips: Mutex<Vec<Trip>>,
    next_id: AtomicU64,
}

impl InMemoryTripService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All trips created so far, in creation order.
    pub fn trips(&self) -> Vec<Trip> {
        self.trips.lock().unwrap().clone()
    }
}

#[async_trait]
impl TripService for InMemoryTripService {
    async fn create_trip(
        &self,
        driver: &DriverId,
        riders: &[RiderId],
        route: &RouteId,
        station: &StationId,
    ) -> Result<Trip, RegistryError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let trip = Trip {
            id: TripId::new(format!("trip-{n}")),
            driver_id: driver.clone(),
            rider_ids: riders.to_vec(),
            route_id: route.clone(),
            station_id: station.clone(),
            status: TripStatus::Scheduled,
        };
        self.trips.lock().unwrap().push(trip.clone());
        Ok(trip)
    }
}

/// A push notification as received by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPush {
    pub targets: Vec<PushTarget>,
    pub title: String,
    pub body: String,
    pub payload: String,
}

/// Notifier that records every push instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pushes: Mutex<Vec<RecordedPush>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pushes received so far, in order.
    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn push(
        &self,
        targets: &[PushTarget],
        title: &str,
        body: &str,
        payload: &str,
    ) -> Result<PushReport, RegistryError> {
        self.pushes.lock().unwrap().push(RecordedPush {
            targets: targets.to_vec(),
            title: title.to_string(),
            body: body.to_string(),
            payload: payload.to_string(),
        });
        let attempted = targets.len() as u64;
        Ok(PushReport {
            attempted,
            success: attempted,
        })
    }
}
