//! Collaborator clients for the dispatch engine.
//!
//! Every external system the engine talks to — station registry, driver
//! registry, rider registry, trip service, notification service — is
//! fronted by a trait here, with an HTTP implementation for production and
//! an in-memory implementation for development and tests. The engine and
//! detector are generic over these traits; nothing else in the crate issues
//! remote calls.

mod driver;
mod error;
mod memory;
mod notify;
mod rider;
mod station;
mod trip;

use std::time::Duration;

pub use driver::{DriverClient, DriverRegistry, SeatUpdate};
pub use error::RegistryError;
pub use memory::{
    InMemoryDriverRegistry, InMemoryRiderRegistry, InMemoryStationRegistry, InMemoryTripService,
    RecordedPush, RecordingNotifier,
};
pub use notify::{Notifier, NotifyClient, PushReport, PushTarget};
pub use rider::{RiderClient, RiderRegistry};
pub use station::{StationClient, StationRegistry};
pub use trip::{TripClient, TripService};

/// Configuration shared by all HTTP collaborator clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the collaborator, no trailing slash.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_http(&self, service: &'static str) -> Result<reqwest::Client, RegistryError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RegistryError::http(service, e))
    }
}
