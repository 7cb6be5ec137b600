//! Rider registry client: pending requests and assignment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{RequestId, RequestStatus, RiderId, RiderRequest, StationId, TripId};

use super::error::RegistryError;
use super::ClientConfig;

const SERVICE: &str = "rider registry";

/// Access to the rider registry, the owner of rider pickup requests.
#[async_trait]
pub trait RiderRegistry: Send + Sync {
    /// List PENDING requests at a station, filtered to one destination area,
    /// whose requested arrival lies within ± `window_mins` of `around`.
    /// Sorted by requested arrival, ascending.
    async fn list_pending(
        &self,
        station: &StationId,
        dest_area: &str,
        around: DateTime<Utc>,
        window_mins: u32,
    ) -> Result<Vec<RiderRequest>, RegistryError>;

    /// Transition the given requests PENDING → ASSIGNED, stamping the trip
    /// identifier. Returns the number actually transitioned; a request that
    /// is no longer PENDING is left alone, so the call is idempotent per
    /// request identifier.
    async fn mark_assigned(
        &self,
        request_ids: &[RequestId],
        trip_id: &TripId,
    ) -> Result<u64, RegistryError>;
}

#[async_trait]
impl<T: RiderRegistry + ?Sized> RiderRegistry for std::sync::Arc<T> {
    async fn list_pending(
        &self,
        station: &StationId,
        dest_area: &str,
        around: DateTime<Utc>,
        window_mins: u32,
    ) -> Result<Vec<RiderRequest>, RegistryError> {
        (**self)
            .list_pending(station, dest_area, around, window_mins)
            .await
    }

    async fn mark_assigned(
        &self,
        request_ids: &[RequestId],
        trip_id: &TripId,
    ) -> Result<u64, RegistryError> {
        (**self).mark_assigned(request_ids, trip_id).await
    }
}

#[derive(Debug, Deserialize)]
struct PendingResponse {
    requests: Vec<RiderRequestDto>,
}

#[derive(Debug, Deserialize)]
struct RiderRequestDto {
    id: String,
    rider_id: String,
    station_id: String,
    #[serde(default)]
    dest_area: String,
    eta_unix: i64,
    status: String,
    #[serde(default)]
    trip_id: Option<String>,
}

impl RiderRequestDto {
    fn into_domain(self) -> Option<RiderRequest> {
        let Some(status) = RequestStatus::parse(&self.status) else {
            warn!(request = %self.id, status = %self.status, "unknown request status; dropping");
            return None;
        };
        let Some(requested_arrival) = DateTime::from_timestamp(self.eta_unix, 0) else {
            warn!(request = %self.id, eta_unix = self.eta_unix, "unrepresentable arrival; dropping");
            return None;
        };
        Some(RiderRequest {
            id: RequestId::new(self.id),
            rider_id: RiderId::new(self.rider_id),
            station_id: StationId::new(self.station_id),
            dest_area: self.dest_area,
            requested_arrival,
            status,
            trip_id: self.trip_id.map(TripId::new),
        })
    }
}

#[derive(Serialize)]
struct MarkAssignedBody<'a> {
    request_ids: Vec<&'a str>,
    trip_id: &'a str,
}

#[derive(Deserialize)]
struct MarkAssignedResponse {
    updated: u64,
}

/// HTTP client for the rider registry.
#[derive(Debug, Clone)]
pub struct RiderClient {
    http: reqwest::Client,
    base_url: String,
}

impl RiderClient {
    /// Create a new rider registry client.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = config.build_http(SERVICE)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl RiderRegistry for RiderClient {
    async fn list_pending(
        &self,
        station: &StationId,
        dest_area: &str,
        around: DateTime<Utc>,
        window_mins: u32,
    ) -> Result<Vec<RiderRequest>, RegistryError> {
        let url = format!("{}/requests/pending", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("station_id", station.as_str()),
                ("dest_area", dest_area),
                ("now_unix", &around.timestamp().to_string()),
                ("minutes_window", &window_mins.to_string()),
            ])
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
        let decoded: PendingResponse =
            serde_json::from_str(&body).map_err(|e| RegistryError::json(SERVICE, e))?;

        Ok(decoded
            .requests
            .into_iter()
            .filter_map(RiderRequestDto::into_domain)
            .collect())
    }

    async fn mark_assigned(
        &self,
        request_ids: &[RequestId],
        trip_id: &TripId,
    ) -> Result<u64, RegistryError> {
        let url = format!("{}/requests/assigned", self.base_url);
        let body = MarkAssignedBody {
            request_ids: request_ids.iter().map(RequestId::as_str).collect(),
            trip_id: trip_id.as_str(),
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

        let decoded: MarkAssignedResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        Ok(decoded.updated)
    }
}
