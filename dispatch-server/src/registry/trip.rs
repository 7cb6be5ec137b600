//! Trip service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DriverId, RiderId, RouteId, StationId, Trip, TripId, TripStatus};

use super::error::RegistryError;
use super::ClientConfig;

const SERVICE: &str = "trip service";

/// Access to the trip service. This core only creates trips; completion
/// and cancellation are driven elsewhere.
#[async_trait]
pub trait TripService: Send + Sync {
    /// Create a SCHEDULED trip for the given driver, riders and pickup
    /// station. The trip service mints the identifier.
    async fn create_trip(
        &self,
        driver: &DriverId,
        riders: &[RiderId],
        route: &RouteId,
        station: &StationId,
    ) -> Result<Trip, RegistryError>;
}

#[async_trait]
impl<T: TripService + ?Sized> TripService for std::sync::Arc<T> {
    async fn create_trip(
        &self,
        driver: &DriverId,
        riders: &[RiderId],
        route: &RouteId,
        station: &StationId,
    ) -> Result<Trip, RegistryError> {
        (**self).create_trip(driver, riders, route, station).await
    }
}

#[derive(Serialize)]
struct CreateTripBody<'a> {
    driver_id: &'a str,
    rider_ids: Vec<&'a str>,
    route_id: &'a str,
    station_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TripDto {
    id: String,
    driver_id: String,
    #[serde(default)]
    rider_ids: Vec<String>,
    route_id: String,
    station_id: String,
    status: String,
}

impl TripDto {
    fn into_domain(self) -> Trip {
        Trip {
            id: TripId::new(self.id),
            driver_id: DriverId::new(self.driver_id),
            rider_ids: self.rider_ids.into_iter().map(RiderId::new).collect(),
            route_id: RouteId::new(self.route_id),
            station_id: StationId::new(self.station_id),
            status: TripStatus::parse(&self.status).unwrap_or(TripStatus::Scheduled),
        }
    }
}

/// HTTP client for the trip service.
#[derive(Debug, Clone)]
pub struct TripClient {
    http: reqwest::Client,
    base_url: String,
}

impl TripClient {
    /// Create a new trip service client.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = config.build_http(SERVICE)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl TripService for TripClient {
    async fn create_trip(
        &self,
        driver: &DriverId,
        riders: &[RiderId],
        route: &RouteId,
        station: &StationId,
    ) -> Result<Trip, RegistryError> {
        let url = format!("{}/trips", self.base_url);
        let body = CreateTripBody {
            driver_id: driver.as_str(),
            rider_ids: riders.iter().map(RiderId::as_str).collect(),
            route_id: route.as_str(),
            station_id: station.as_str(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let dto: TripDto =
            serde_json::from_str(&body).map_err(|e| RegistryError::json(SERVICE, e))?;
        Ok(dto.into_domain())
    }
}
