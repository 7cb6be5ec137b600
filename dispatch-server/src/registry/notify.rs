//! Notification service client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RegistryError;
use super::ClientConfig;

const SERVICE: &str = "notification service";

/// One recipient of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushTarget {
    /// User to notify; drivers and riders share the user id space.
    pub user_id: String,

    /// Delivery channel name, e.g. `"log"` or `"push"`.
    pub channel: String,
}

impl PushTarget {
    /// Target a user on the given channel.
    pub fn new(user_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            channel: channel.into(),
        }
    }
}

/// How a push fan-out went. Delivery is best-effort; `success` may be
/// less than `attempted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PushReport {
    pub attempted: u64,
    pub success: u64,
}

/// Access to the notification service.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a notification to each target. `payload` is an opaque JSON
    /// document passed through to the client apps.
    async fn push(
        &self,
        targets: &[PushTarget],
        title: &str,
        body: &str,
        payload: &str,
    ) -> Result<PushReport, RegistryError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    async fn push(
        &self,
        targets: &[PushTarget],
        title: &str,
        body: &str,
        payload: &str,
    ) -> Result<PushReport, RegistryError> {
        (**self).push(targets, title, body, payload).await
    }
}

#[derive(Serialize)]
struct PushBody<'a> {
    targets: &'a [PushTarget],
    title: &'a str,
    body: &'a str,
    data_json: &'a str,
}

/// HTTP client for the notification service.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotifyClient {
    /// Create a new notification service client.
    pub fn new(config: ClientConfig) -> Result<Self, RegistryError> {
        let http = config.build_http(SERVICE)?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl Notifier for NotifyClient {
    async fn push(
        &self,
        targets: &[PushTarget],
        title: &str,
        body: &str,
        payload: &str,
    ) -> Result<PushReport, RegistryError> {
        let url = format!("{}/push", self.base_url);
        let request = PushBody {
            targets,
            title,
            body,
            data_json: payload,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
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

        let report: PushReport = response
            .json()
            .await
            .map_err(|e| RegistryError::http(SERVICE, e))?;
        Ok(report)
    }
}
