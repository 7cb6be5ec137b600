//! Unit and end-to-end tests for the geofence detector.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::stream;

use crate::cache::{CacheConfig, ProximityCache};
use crate::domain::{
    Coordinate, DriverId, RequestId, RequestStatus, RiderId, RiderRequest, Route, RouteId,
    RouteStop, Station, StationId,
};
use crate::matching::{EngineConfig, MatchAttempt, MatchEngine, MatchError, MatchOutcome};
use crate::registry::{
    InMemoryDriverRegistry, InMemoryRiderRegistry, InMemoryStationRegistry, InMemoryTripService,
    RecordingNotifier, RegistryError,
};

use super::debounce::DebounceLedger;
use super::geofence::{
    DetectorConfig, DetectorStatus, GeofenceDetector, LocationSample, MatchDispatch,
};

/// Reference point for all coordinates in these tests.
const CENTRAL: Coordinate = Coordinate {
    lat: 12.9756,
    lon: 77.6069,
};

/// A coordinate roughly `meters` north of [`CENTRAL`] (one degree of
/// latitude is ~111.2 km).
fn north_of_central(meters: f64) -> Coordinate {
    Coordinate::new(CENTRAL.lat + meters / 111_194.93, CENTRAL.lon)
}

fn at(unix: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix, 0).unwrap()
}

fn sample(point: Coordinate, unix: i64) -> LocationSample {
    LocationSample {
        driver_id: DriverId::new("d1"),
        route_id: RouteId::new("rt1"),
        point,
        recorded_at: at(unix),
    }
}

fn station(id: &str, location: Coordinate) -> Station {
    Station {
        id: StationId::new(id),
        name: id.to_string(),
        location,
        nearby_areas: vec![],
    }
}

fn stop(station: &str, window_mins: u32) -> RouteStop {
    RouteStop {
        station_id: StationId::new(station),
        minutes_before_eta_match: window_mins,
    }
}

fn route(stops: Vec<RouteStop>) -> Route {
    Route {
        id: RouteId::new("rt1"),
        driver_id: DriverId::new("d1"),
        dest_area: "Whitefield".to_string(),
        seats_total: 4,
        seats_free: 4,
        stops,
    }
}

/// Dispatch seam that records attempts and answers with a canned result.
struct RecordingDispatch {
    attempts: Mutex<Vec<MatchAttempt>>,
    fail: bool,
}

impl RecordingDispatch {
    fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn attempts(&self) -> Vec<MatchAttempt> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchDispatch for RecordingDispatch {
    async fn try_match(&self, attempt: &MatchAttempt) -> Result<MatchOutcome, MatchError> {
        self.attempts.lock().unwrap().push(attempt.clone());
        if self.fail {
            return Err(MatchError {
                stage: "fetch route",
                seats_remaining: 0,
                source: RegistryError::Api {
                    service: "driver registry",
                    status: 503,
                    message: "unavailable".to_string(),
                },
            });
        }
        Ok(MatchOutcome {
            trip_id: None,
            assignments: vec![],
            seats_remaining: 4,
        })
    }
}

fn detector(
    stations: Vec<Station>,
    routes: Vec<Route>,
    dispatch: Arc<RecordingDispatch>,
) -> GeofenceDetector<Arc<InMemoryStationRegistry>, Arc<InMemoryDriverRegistry>, Arc<RecordingDispatch>>
{
    let station_registry = Arc::new(InMemoryStationRegistry::new());
    for s in stations {
        station_registry.insert(s);
    }
    let driver_registry = Arc::new(InMemoryDriverRegistry::new());
    for r in routes {
        driver_registry.insert(r);
    }
    GeofenceDetector::new(
        ProximityCache::new(station_registry, driver_registry, &CacheConfig::default()),
        DebounceLedger::new(Duration::seconds(30)),
        dispatch,
        DetectorConfig::default(),
    )
}

#[tokio::test]
async fn sample_at_station_fires_one_attempt() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch.clone(),
    );

    let summary = detector.consume(stream::iter(vec![sample(CENTRAL, 1000)])).await;

    assert_eq!(summary.samples, 1);
    assert_eq!(summary.triggers, 1);

    let attempts = dispatch.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].driver_id, DriverId::new("d1"));
    assert_eq!(attempts[0].route_id, RouteId::new("rt1"));
    assert_eq!(attempts[0].station_id, StationId::new("s1"));
    assert_eq!(attempts[0].arrival_eta, at(1000));
}

#[tokio::test]
async fn sample_outside_geofence_fires_nothing() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch.clone(),
    );

    // ~1 km away, well past the 400 m fence.
    let summary = detector
        .consume(stream::iter(vec![sample(north_of_central(1000.0), 1000)]))
        .await;

    assert_eq!(summary.samples, 1);
    assert_eq!(summary.triggers, 0);
    assert!(dispatch.attempts().is_empty());
}

#[tokio::test]
async fn near_in_space_but_late_in_time_is_skipped() {
    let dispatch = Arc::new(RecordingDispatch::new());
    // 300 m out: inside the fence, but the estimated half-minute arrival
    // exceeds a zero-minute matching window.
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 0)])],
        dispatch.clone(),
    );

    let summary = detector
        .consume(stream::iter(vec![sample(north_of_central(300.0), 1000)]))
        .await;

    assert_eq!(summary.triggers, 0);
    assert!(dispatch.attempts().is_empty());
}

#[tokio::test]
async fn stops_gate_independently_on_their_windows() {
    let dispatch = Arc::new(RecordingDispatch::new());
    // Two stations at the same spot, 300 m from the driver: the
    // zero-window stop is skipped, the five-minute one fires.
    let detector = detector(
        vec![station("tight", CENTRAL), station("loose", CENTRAL)],
        vec![route(vec![stop("tight", 0), stop("loose", 5)])],
        dispatch.clone(),
    );

    let summary = detector
        .consume(stream::iter(vec![sample(north_of_central(300.0), 1000)]))
        .await;

    assert_eq!(summary.triggers, 1);
    let attempts = dispatch.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].station_id, StationId::new("loose"));
}

#[tokio::test]
async fn one_sample_can_trigger_multiple_stops() {
    let dispatch = Arc::new(RecordingDispatch::new());
    // Two stations inside the fence at once; no short-circuit after the
    // first trigger.
    let detector = detector(
        vec![
            station("s1", CENTRAL),
            station("s2", north_of_central(200.0)),
        ],
        vec![route(vec![stop("s1", 5), stop("s2", 5)])],
        dispatch.clone(),
    );

    let summary = detector
        .consume(stream::iter(vec![sample(north_of_central(100.0), 1000)]))
        .await;

    assert_eq!(summary.triggers, 2);
    let attempts = dispatch.attempts();
    let stations: Vec<&str> = attempts.iter().map(|a| a.station_id.as_str()).collect();
    assert_eq!(stations, vec!["s1", "s2"]);
}

#[tokio::test]
async fn repeated_samples_are_debounced_per_pair() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch.clone(),
    );

    // 10 s apart: second suppressed. 31 s after the first: allowed again.
    let samples = vec![
        sample(CENTRAL, 1000),
        sample(CENTRAL, 1010),
        sample(CENTRAL, 1031),
    ];
    let summary = detector.consume(stream::iter(samples)).await;

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.triggers, 2);
    let etas: Vec<DateTime<Utc>> = dispatch.attempts().iter().map(|a| a.arrival_eta).collect();
    assert_eq!(etas, vec![at(1000), at(1031)]);
}

#[tokio::test]
async fn unknown_route_discards_sample_and_stream_continues() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch.clone(),
    );

    let mut unknown = sample(CENTRAL, 1000);
    unknown.route_id = RouteId::new("rt-gone");
    let summary = detector
        .consume(stream::iter(vec![unknown, sample(CENTRAL, 1005)]))
        .await;

    assert_eq!(summary.samples, 2);
    assert_eq!(summary.triggers, 1);
}

#[tokio::test]
async fn unknown_station_skips_stop_but_not_the_route() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("unregistered", 5), stop("s1", 5)])],
        dispatch.clone(),
    );

    let summary = detector.consume(stream::iter(vec![sample(CENTRAL, 1000)])).await;

    assert_eq!(summary.triggers, 1);
    assert_eq!(dispatch.attempts()[0].station_id, StationId::new("s1"));
}

#[tokio::test]
async fn dispatch_failure_does_not_end_the_stream() {
    let dispatch = Arc::new(RecordingDispatch::failing());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch.clone(),
    );

    // Same pair again after the window: the failed first attempt did not
    // wedge anything.
    let summary = detector
        .consume(stream::iter(vec![
            sample(CENTRAL, 1000),
            sample(CENTRAL, 1031),
        ]))
        .await;

    assert_eq!(summary.samples, 2);
    assert_eq!(summary.triggers, 2);
    assert_eq!(dispatch.attempts().len(), 2);
}

#[tokio::test]
async fn empty_stream_acknowledges_zero() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(vec![], vec![], dispatch);

    let summary = detector
        .consume(stream::iter(Vec::<LocationSample>::new()))
        .await;

    assert_eq!(summary.samples, 0);
    assert_eq!(summary.triggers, 0);
}

#[tokio::test]
async fn status_snapshots_cache_and_ledger_occupancy() {
    let dispatch = Arc::new(RecordingDispatch::new());
    let detector = detector(
        vec![station("s1", CENTRAL)],
        vec![route(vec![stop("s1", 5)])],
        dispatch,
    );

    assert_eq!(
        detector.status().await,
        DetectorStatus {
            cached_stations: 0,
            cached_routes: 0,
            debounced_pairs: 0,
        }
    );

    detector
        .consume(stream::iter(vec![sample(CENTRAL, 1000)]))
        .await;

    // The trigger populated the route and station caches and recorded the
    // (driver, station) pair in the ledger.
    assert_eq!(
        detector.status().await,
        DetectorStatus {
            cached_stations: 1,
            cached_routes: 1,
            debounced_pairs: 1,
        }
    );
}

/// Full path: location sample → detector → engine → in-memory registries.
#[tokio::test]
async fn end_to_end_single_rider_pickup() {
    let stations = Arc::new(InMemoryStationRegistry::new());
    stations.insert(station("s1", CENTRAL));

    let drivers = Arc::new(InMemoryDriverRegistry::new());
    drivers.insert(route(vec![stop("s1", 5)]));

    let riders = Arc::new(InMemoryRiderRegistry::new());
    riders.insert(RiderRequest {
        id: RequestId::new("rq1"),
        rider_id: RiderId::new("r1"),
        station_id: StationId::new("s1"),
        dest_area: "Whitefield".to_string(),
        requested_arrival: at(1000),
        status: RequestStatus::Pending,
        trip_id: None,
    });

    let trips = Arc::new(InMemoryTripService::new());
    let notifier = Arc::new(RecordingNotifier::new());

    let engine = Arc::new(MatchEngine::new(
        drivers.clone(),
        riders.clone(),
        trips.clone(),
        notifier.clone(),
        EngineConfig::default(),
    ));
    let detector = GeofenceDetector::new(
        ProximityCache::new(stations, drivers.clone(), &CacheConfig::default()),
        DebounceLedger::new(Duration::seconds(30)),
        engine,
        DetectorConfig::default(),
    );

    // Driver reports from exactly the station; a follow-up sample inside
    // the debounce window must not double-match.
    let summary = detector
        .consume(stream::iter(vec![
            sample(CENTRAL, 1000),
            sample(CENTRAL, 1010),
        ]))
        .await;

    assert_eq!(summary.samples, 2);
    assert_eq!(summary.triggers, 1);

    // Exactly one trip with exactly the one rider.
    let trips = trips.trips();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].rider_ids, vec![RiderId::new("r1")]);
    assert_eq!(trips[0].station_id, StationId::new("s1"));

    // The request moved to ASSIGNED with the trip stamped.
    let request = riders.request(&RequestId::new("rq1")).unwrap();
    assert_eq!(request.status, RequestStatus::Assigned);
    assert_eq!(request.trip_id, Some(trips[0].id.clone()));

    // One seat consumed at the registry.
    assert_eq!(
        drivers.route(&RouteId::new("rt1")).unwrap().seats_free,
        3
    );

    // Driver and rider both notified.
    let pushes = notifier.pushes();
    assert_eq!(pushes.len(), 1);
    let users: Vec<&str> = pushes[0].targets.iter().map(|t| t.user_id.as_str()).collect();
    assert_eq!(users, vec!["d1", "r1"]);
}
