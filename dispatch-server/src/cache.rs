//! Proximity cache for station coordinates and route descriptions.
//!
//! Location samples arrive every few seconds per driver while the
//! route/station topology changes rarely, so the detector caches both
//! lookups. Entries carry a TTL: the core gets no signal when a registry
//! edits a route or moves a station, so bounded staleness is the contract
//! rather than explicit invalidation.
//!
//! Not-found is never cached — a station or route may be registered a
//! moment later. Lookup failures are returned to the caller and likewise
//! never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Coordinate, Route, RouteId, StationId};
use crate::registry::{DriverRegistry, RegistryError, StationRegistry};

/// Configuration for the proximity cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of entries per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// Lazy read-through cache in front of the station and driver registries.
///
/// The cached route is a snapshot: its `seats_free` is whatever the
/// registry reported at fetch time and must never drive a capacity
/// decision. The matching engine re-reads the registry instead.
pub struct ProximityCache<S, D> {
    stations: S,
    drivers: D,
    coordinates: MokaCache<StationId, Coordinate>,
    routes: MokaCache<RouteId, Arc<Route>>,
}

impl<S: StationRegistry, D: DriverRegistry> ProximityCache<S, D> {
    /// Create a cache over the given registries.
    pub fn new(stations: S, drivers: D, config: &CacheConfig) -> Self {
        let coordinates = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            stations,
            drivers,
            coordinates,
            routes,
        }
    }

    /// Where a station is, from cache or the station registry.
    pub async fn station_coordinate(
        &self,
        id: &StationId,
    ) -> Result<Option<Coordinate>, RegistryError> {
        if let Some(coordinate) = self.coordinates.get(id).await {
            return Ok(Some(coordinate));
        }

        match self.stations.get_station(id).await? {
            Some(station) => {
                self.coordinates.insert(id.clone(), station.location).await;
                Ok(Some(station.location))
            }
            None => Ok(None),
        }
    }

    /// A route snapshot, from cache or the driver registry.
    pub async fn route(&self, id: &RouteId) -> Result<Option<Arc<Route>>, RegistryError> {
        if let Some(route) = self.routes.get(id).await {
            return Ok(Some(route));
        }

        match self.drivers.get_route(id).await? {
            Some(route) => {
                let route = Arc::new(route);
                self.routes.insert(id.clone(), route.clone()).await;
                Ok(Some(route))
            }
            None => Ok(None),
        }
    }

    /// Number of cached station coordinates. Flushes the cache's pending
    /// maintenance first so the count is current, not approximate.
    pub async fn coordinate_entry_count(&self) -> u64 {
        self.coordinates.run_pending_tasks().await;
        self.coordinates.entry_count()
    }

    /// Number of cached routes.
    pub async fn route_entry_count(&self) -> u64 {
        self.routes.run_pending_tasks().await;
        self.routes.entry_count()
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.coordinates.invalidate_all();
        self.routes.invalidate_all();
    }
}
