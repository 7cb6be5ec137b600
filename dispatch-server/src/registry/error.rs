//! Collaborator call error types.

/// Errors from a call to one of the registry collaborators.
///
/// Absence of an entity is not an error: lookups return `Ok(None)` when the
/// collaborator reports not-found, so this enum only covers transport and
/// protocol failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("{service}: HTTP error: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The collaborator returned an error status.
    #[error("{service} returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Failed to parse the response body.
    #[error("{service}: JSON parse error: {message}")]
    Json {
        service: &'static str,
        message: String,
    },
}

impl RegistryError {
    pub(crate) fn http(service: &'static str, source: reqwest::Error) -> Self {
        RegistryError::Http { service, source }
    }

    pub(crate) fn json(service: &'static str, e: serde_json::Error) -> Self {
        RegistryError::Json {
            service,
            message: e.to_string(),
        }
    }
}
