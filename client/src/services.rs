use serde::de::DeserializeOwned;

use nortus_shared::api::{
    DASHBOARD_ERROR_FALLBACK, DASHBOARD_PATH, DASHBOARD_STATUS_FALLBACK, LOCATIONS_ERROR_FALLBACK,
    LOCATIONS_PATH, LOCATIONS_STATUS_FALLBACK, surface_failure,
};
use nortus_shared::{DashboardResponse, MapLocationsResponse, ServiceError};

use crate::toast::Toasts;

/// Fallback messages for one endpoint.
struct Fallbacks {
    status: &'static str,
    error: &'static str,
}

const LOCATIONS: Fallbacks = Fallbacks {
    status: LOCATIONS_STATUS_FALLBACK,
    error: LOCATIONS_ERROR_FALLBACK,
};

const DASHBOARD: Fallbacks = Fallbacks {
    status: DASHBOARD_STATUS_FALLBACK,
    error: DASHBOARD_ERROR_FALLBACK,
};

/// Fetch the client locations through the same-origin proxy. Failures are
/// toasted and then returned to the caller.
pub async fn get_locations(toasts: Toasts) -> Result<MapLocationsResponse, ServiceError> {
    let result = fetch_json(LOCATIONS_PATH, &LOCATIONS).await;
    surface_failure(result, |message| toasts.error(message))
}

/// Fetch the dashboard payload through the same-origin proxy.
pub async fn get_dashboard(toasts: Toasts) -> Result<DashboardResponse, ServiceError> {
    let result = fetch_json(DASHBOARD_PATH, &DASHBOARD).await;
    surface_failure(result, |message| toasts.error(message))
}

async fn fetch_json<T: DeserializeOwned>(path: &str, fallbacks: &Fallbacks) -> Result<T, ServiceError> {
    let resp = gloo_net::http::Request::get(path)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| {
            web_sys::console::warn_1(&format!("[services] {path}: fetch error: {e}").into());
            ServiceError::Network(fallbacks.error.to_owned())
        })?;

    if !resp.ok() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        web_sys::console::warn_1(&format!("[services] {path}: HTTP {status}").into());
        return Err(ServiceError::from_status(status, &body, fallbacks.status));
    }

    resp.json::<T>().await.map_err(|e| {
        web_sys::console::warn_1(&format!("[services] {path}: parse error: {e}").into());
        ServiceError::Parse(fallbacks.error.to_owned())
    })
}
