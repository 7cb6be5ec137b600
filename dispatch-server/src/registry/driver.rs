//! Driver registry client: routes and seat capacity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{DriverId, Route, RouteId, RouteStop, StationId};

use super::error::RegistryError;
use super::ClientConfig;

const SERVICE: &str = "driver registry";

/// Outcome of a conditional seat update.
#[derive(Debug, Clone, PartialEq)]
pub enum SeatUpdate {
    /// The precondition held; this is the route after the update.
    Updated(Route),

    /// `seats_free` no longer matched the expected value; this is the
    /// route as the registry currently has it. Nothing was written.
    Conflict(Route),
}

/// Access to the driver registry, the authoritative owner of routes and of
/// each route's remaining seat count.
#[async_trait]
pub trait DriverRegistry: Send + Sync {
    /// Look up a route by identifier. `Ok(None)` means no such route.
    async fn get_route(&self, id: &RouteId) -> Result<Option<Route>, RegistryError>;

    /// Conditionally set a route's free-seat count.
    ///
    /// The write only happens if the registry's current `seats_free` equals
    /// `expected_free`; otherwise the current route comes back as
    /// [`SeatUpdate::Conflict`] and the caller re-derives its update.
    /// `Ok(None)` means the route no longer exists.
    async fn update_seats(
        &self,
        id: &RouteId,
        expected_free: u32,
        new_free: u32,
    ) -> Result<Option<SeatUpdate>, RegistryError>;
}

#[async_trait]
impl<T: DriverRegistry + ?Sized> DriverRegistry for std::sync::Arc<T> {
    async fn get_route(&self, id: &RouteId) -> Result<Option<Route>, RegistryError> {
        (**self).get_route(id).await
    }

    async fn update_seats(
        &self,
        id: &RouteId,
        expected_free: u32,
        new_free: u32,
    ) -> Result<Option<SeatUpdate>, RegistryError> {
        (**self).update_seats(id, expected_free, new_free).await
    }
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    id: String,
    driver_id: String,
    #[serde(default)]
    dest_area: String,
    seats_total: i64,
    seats_free: i64,
    #[serde(default)]
    stops: Vec<RouteStopDto>,
}

#[derive(Debug, Deserialize)]
struct RouteStopDto {
    station_id: String,
    minutes_before_eta_match: u32,
}

impl RouteDto {
    fn into_domain(self) -> Route {
        // A negative count on the wire means the registry's counter was
        // driven below zero by unconditional writes; clamp rather than
        // propagate a nonsense value.
        if self.seats_free < 0 {
            warn!(
                route = %self.id,
                seats_free = self.seats_free,
                "driver registry reported negative seats_free; clamping to 0"
            );
        }
        Route {
            id: RouteId::new(self.id),
            driver_id: DriverId::new(self.driver_id),
            dest_area: self.dest_area,
            seats_total: self.seats_total.max(0) as u32,
            seats_free: self.seats_free.max(0) as u32,
            stops: self
                .stops
                .into_iter()
                .map(|s| RouteStop {
                    station_id: StationId::new(s.station_id),
                    minutes_before_eta_match: s.minutes_before_eta_match,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct UpdateSeatsBody {
    seats_free: u32,
    expected_seats_free: u32,
}

/// HTTP client for the driver registry.
#[derive(Debug, Clone)]
pub struct DriverClient {
    http: reqwest::Client,
    base_url: String,
}

impl DriverClient {
    /// Create a new driver registry client.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = config.build_http(SERVICE)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    async fn decode_route(response: reqwest::Response) -> Result<Route, RegistryError> {
        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let dto: RouteDto =
            serde_json::from_str(&body).map_err(|e| RegistryError::json(SERVICE, e))?;
        Ok(dto.into_domain())
    }
}

#[async_trait]
impl DriverRegistry for DriverClient {
    async fn get_route(&self, id: &RouteId) -> Result<Option<Route>, RegistryError> {
        let url = format!("{}/routes/{}", self.base_url, id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(Some(Self::decode_route(response).await?))
    }

    async fn update_seats(
        &self,
        id: &RouteId,
        expected_free: u32,
        new_free: u32,
    ) -> Result<Option<SeatUpdate>, RegistryError> {
        let url = format!("{}/routes/{}/seats", self.base_url, id);
        let body = UpdateSeatsBody {
            seats_free: new_free,
            expected_seats_free: expected_free,
        };

        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        // 409 carries the route as currently stored.
        if status == reqwest::StatusCode::CONFLICT {
            let route = Self::decode_route(response).await?;
            return Ok(Some(SeatUpdate::Conflict(route)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }

        let route = Self::decode_route(response).await?;
        Ok(Some(SeatUpdate::Updated(route)))
    }
}
