use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatch_server::cache::ProximityCache;
use dispatch_server::config::AppConfig;
use dispatch_server::detector::{DebounceLedger, GeofenceDetector};
use dispatch_server::matching::MatchEngine;
use dispatch_server::registry::{
    ClientConfig, DriverClient, NotifyClient, RiderClient, StationClient, TripClient,
};
use dispatch_server::web::{create_router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let client_config = |url: &str| ClientConfig::new(url).with_timeout(config.registry_timeout);
    let stations =
        StationClient::new(client_config(&config.station_url)).expect("station client");
    let drivers = DriverClient::new(client_config(&config.driver_url)).expect("driver client");
    let riders = RiderClient::new(client_config(&config.rider_url)).expect("rider client");
    let trips = TripClient::new(client_config(&config.trip_url)).expect("trip client");
    let notifier = NotifyClient::new(client_config(&config.notify_url)).expect("notify client");

    let engine = Arc::new(MatchEngine::new(
        drivers.clone(),
        riders,
        trips,
        notifier,
        config.engine.clone(),
    ));

    let detector = GeofenceDetector::new(
        ProximityCache::new(stations, drivers, &config.cache),
        DebounceLedger::new(config.debounce_window()),
        engine.clone(),
        config.detector.clone(),
    );

    let app = create_router(AppState::new(detector, engine));

    info!(addr = %config.bind_addr, "dispatch server listening");
    info!("POST /v1/locations/stream  - NDJSON driver location stream");
    info!("POST /v1/match/try         - direct match attempt");
    info!("GET  /v1/status            - cache and debounce occupancy");
    info!("GET  /health               - health check");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("bind listen address");
    axum::serve(listener, app).await.expect("serve");
}
