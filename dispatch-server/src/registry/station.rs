//! Station registry client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Coordinate, Station, StationId};

use super::error::RegistryError;
use super::ClientConfig;

const SERVICE: &str = "station registry";

/// Read access to the station registry.
#[async_trait]
pub trait StationRegistry: Send + Sync {
    /// Look up a station by identifier. `Ok(None)` means the registry has
    /// no such station (which may change later — callers must not cache it).
    async fn get_station(&self, id: &StationId) -> Result<Option<Station>, RegistryError>;
}

#[async_trait]
impl<T: StationRegistry + ?Sized> StationRegistry for std::sync::Arc<T> {
    async fn get_station(&self, id: &StationId) -> Result<Option<Station>, RegistryError> {
        (**self).get_station(id).await
    }
}

#[derive(Debug, Deserialize)]
struct StationDto {
    id: String,
    #[serde(default)]
    name: String,
    location: LatLngDto,
    #[serde(default)]
    nearby_areas: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LatLngDto {
    lat: f64,
    lon: f64,
}

impl StationDto {
    fn into_domain(self) -> Station {
        Station {
            id: StationId::new(self.id),
            name: self.name,
            location: Coordinate::new(self.location.lat, self.location.lon),
            nearby_areas: self.nearby_areas,
        }
    }
}

/// HTTP client for the station registry.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    base_url: String,
}

impl StationClient {
    /// Create a new station registry client.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = config.build_http(SERVICE)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl StationRegistry for StationClient {
    async fn get_station(&self, id: &StationId) -> Result<Option<Station>, RegistryError> {
        let url = format!("{}/stations/{}", self.base_url, id);

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

        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        let dto: StationDto =
            serde_json::from_str(&body).map_err(|e| RegistryError::json(SERVICE, e))?;

        Ok(Some(dto.into_domain()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_dto_decodes() {
        let json = r#"{
            "id": "st_central",
            "name": "Central",
            "location": {"lat": 12.9756, "lon": 77.6069},
            "nearby_areas": ["Indiranagar", "Domlur"]
        }"#;
        let dto: StationDto = serde_json::from_str(json).unwrap();
        let station = dto.into_domain();
        assert_eq!(station.id, StationId::new("st_central"));
        assert_eq!(station.name, "Central");
        assert_eq!(station.location, Coordinate::new(12.9756, 77.6069));
        assert_eq!(station.nearby_areas, vec!["Indiranagar", "Domlur"]);
    }

    #[test]
    fn station_dto_optional_fields_default() {
        let json = r#"{"id": "st1", "location": {"lat": 0.0, "lon": 0.0}}"#;
        let dto: StationDto = serde_json::from_str(json).unwrap();
        let station = dto.into_domain();
        assert_eq!(station.name, "");
        assert!(station.nearby_areas.is_empty());
    }
}
