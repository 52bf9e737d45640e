use std::time::Duration;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://localhost:8080";
pub const DASHBOARD_UPSTREAM_PATH: &str = "/nortus-v1/dashboard";
pub const LOCATIONS_UPSTREAM_PATH: &str = "/map/locations";

pub const DASHBOARD_ERROR_MESSAGE: &str = "Erro ao obter dashboard";
pub const LOCATIONS_ERROR_MESSAGE: &str = "Erro ao obter locais";

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_REVALIDATE_SECS: u64 = 20;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const STATIC_DIR: &str = "client/dist";

/// Base URL of the backend that owns the dashboard and map APIs.
pub fn upstream_base_url() -> String {
    std::env::var("NORTUS_API_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_owned())
}

/// Optional bearer token forwarded on every upstream call.
pub fn upstream_token() -> Option<String> {
    std::env::var("NORTUS_API_TOKEN")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// How long a successful upstream body is reused before it is fetched again.
pub fn revalidate_window() -> Duration {
    std::env::var("REVALIDATE_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_REVALIDATE_SECS))
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}
