use serde::{Deserialize, Serialize};

pub const LOCATIONS_PATH: &str = "/api/map/locations";
pub const DASHBOARD_PATH: &str = "/api/nortus-v1/dashboard";

pub const LOCATIONS_STATUS_FALLBACK: &str = "Falha ao buscar locais";
pub const LOCATIONS_ERROR_FALLBACK: &str = "Erro ao buscar locais";
pub const DASHBOARD_STATUS_FALLBACK: &str = "Falha ao buscar dashboard";
pub const DASHBOARD_ERROR_FALLBACK: &str = "Erro ao buscar dashboard";

/// Error body shape shared by the proxy routes and the upstream backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Failure of a same-origin data fetch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Parse(String),
}

impl ServiceError {
    /// Build the error for a non-success response, preferring the body's
    /// `message` field over `fallback`.
    pub fn from_status(status: u16, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_owned());
        Self::Status { status, message }
    }

    /// Text shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Network(m) | Self::Parse(m) => m,
            Self::Status { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Report a failed fetch through `notify` and hand the error back to the caller.
pub fn surface_failure<T>(
    result: Result<T, ServiceError>,
    notify: impl FnOnce(&str),
) -> Result<T, ServiceError> {
    if let Err(err) = &result {
        notify(err.message());
    }
    result
}
