//! Environment-supplied configuration.
//!
//! Every tunable has a default; an unset variable uses it silently, an
//! unparsable one logs a warning and uses it anyway. Loading configuration
//! can never fail.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::detector::DetectorConfig;
use crate::matching::EngineConfig;

/// Full service configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP surface binds to.
    pub bind_addr: SocketAddr,

    /// Geofence radius and assumed speed.
    pub detector: DetectorConfig,

    /// Rider window and seat-update retry limit.
    pub engine: EngineConfig,

    /// Suppression window for repeated triggers, in seconds.
    pub debounce_window_secs: u64,

    /// TTL and capacity for the proximity cache.
    pub cache: CacheConfig,

    /// Timeout applied to every collaborator call.
    pub registry_timeout: Duration,

    pub station_url: String,
    pub driver_url: String,
    pub rider_url: String,
    pub trip_url: String,
    pub notify_url: String,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: parse_var(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000))),
            detector: DetectorConfig {
                geofence_radius_m: parse_var(&lookup, "GEOFENCE_RADIUS_M", 400.0),
                average_speed_mps: parse_var(&lookup, "AVERAGE_SPEED_MPS", 10.0),
            },
            engine: EngineConfig {
                rider_window_mins: parse_var(&lookup, "RIDER_WINDOW_MINS", 12),
                seat_update_attempts: parse_var(&lookup, "SEAT_UPDATE_ATTEMPTS", 4),
            },
            debounce_window_secs: parse_var(&lookup, "DEBOUNCE_WINDOW_SECS", 30),
            cache: CacheConfig {
                ttl: Duration::from_secs(parse_var(&lookup, "CACHE_TTL_SECS", 300)),
                max_capacity: parse_var(&lookup, "CACHE_CAPACITY", 10_000),
            },
            registry_timeout: Duration::from_secs(parse_var(
                &lookup,
                "REGISTRY_TIMEOUT_SECS",
                10,
            )),
            station_url: url_var(&lookup, "STATION_URL", "http://localhost:50052"),
            driver_url: url_var(&lookup, "DRIVER_URL", "http://localhost:50053"),
            rider_url: url_var(&lookup, "RIDER_URL", "http://localhost:50054"),
            trip_url: url_var(&lookup, "TRIP_URL", "http://localhost:50055"),
            notify_url: url_var(&lookup, "NOTIFY_URL", "http://localhost:50056"),
        }
    }

    /// The debounce window as a chrono duration.
    pub fn debounce_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.debounce_window_secs as i64)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "unparsable configuration value; using default");
                default
            }
        },
        None => default,
    }
}

fn url_var(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    // Trailing slashes would double up when paths are appended.
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
