use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::Utc;
use nortus_shared::ApiErrorBody;
use tracing::{debug, warn};

use crate::config::{
    DASHBOARD_ERROR_MESSAGE, DASHBOARD_UPSTREAM_PATH, LOCATIONS_ERROR_MESSAGE,
    LOCATIONS_UPSTREAM_PATH,
};
use crate::state::{AppState, CachedBody};

/// Why a proxied call could not be answered with the upstream body.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream answered, but not with a success status.
    #[error("upstream responded with {status}")]
    Upstream {
        status: StatusCode,
        body: Bytes,
        fallback: &'static str,
    },
    /// No usable upstream response at all.
    #[error("upstream request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
        fallback: &'static str,
    },
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::Upstream {
                status,
                body,
                fallback,
            } => {
                let payload = if body.iter().all(u8::is_ascii_whitespace) {
                    default_message_body(fallback)
                } else {
                    json_payload(body)
                };
                (status, payload)
            }
            ProxyError::Transport { fallback, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                default_message_body(fallback),
            ),
        };

        let mut response = json_bytes_response(body, HeaderValue::from_static("no-store"));
        *response.status_mut() = status;
        response
    }
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Response, ProxyError> {
    proxy_json(&state, DASHBOARD_UPSTREAM_PATH, DASHBOARD_ERROR_MESSAGE).await
}

pub async fn get_map_locations(State(state): State<AppState>) -> Result<Response, ProxyError> {
    proxy_json(&state, LOCATIONS_UPSTREAM_PATH, LOCATIONS_ERROR_MESSAGE).await
}

/// Forward a GET to the upstream and pass its JSON through.
///
/// Successful bodies are reused for the revalidate window; failures are never
/// cached.
async fn proxy_json(
    state: &AppState,
    path: &'static str,
    fallback: &'static str,
) -> Result<Response, ProxyError> {
    state.observability.record_proxy_request();
    let window = state.upstream.revalidate;
    let cache_control = revalidate_cache_control(window.as_secs());

    let now = Utc::now();
    if let Some(cached) = state.proxy_cache.get(path)
        && cached.is_fresh(window, now)
    {
        state.observability.record_cache_hit();
        debug!(route = path, "serving cached upstream body");
        return Ok(json_bytes_response(cached.body.clone(), cache_control));
    }

    let mut request = state
        .http_client
        .get(state.upstream_url(path))
        .header(header::ACCEPT, "application/json");
    if let Some(token) = state.upstream.token.as_deref() {
        request = request.bearer_auth(token);
    }

    let resp = request.send().await.map_err(|source| {
        state.observability.record_upstream_error();
        warn!(route = path, error = %source, "upstream request failed");
        ProxyError::Transport { source, fallback }
    })?;

    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(|source| {
        state.observability.record_upstream_error();
        warn!(route = path, error = %source, "failed to read upstream body");
        ProxyError::Transport { source, fallback }
    })?;

    if !(200..300).contains(&status) {
        state.observability.record_upstream_error();
        warn!(route = path, status, "upstream returned an error status");
        return Err(ProxyError::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            body,
            fallback,
        });
    }

    let body = json_payload(body);
    if !window.is_zero() {
        state.proxy_cache.insert(
            path,
            CachedBody {
                body: body.clone(),
                fetched_at: now,
            },
        );
    }

    Ok(json_bytes_response(body, cache_control))
}

/// Upstream bytes as a JSON document: valid JSON is kept verbatim, anything
/// else is wrapped into a JSON string.
fn json_payload(body: Bytes) -> Bytes {
    if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_ok() {
        return body;
    }
    let text = String::from_utf8_lossy(&body);
    serde_json::to_vec(&serde_json::Value::String(text.into_owned()))
        .map(Bytes::from)
        .unwrap_or_else(|_| Bytes::from_static(b"null"))
}

fn default_message_body(message: &str) -> Bytes {
    serde_json::to_vec(&ApiErrorBody::new(message))
        .map(Bytes::from)
        .unwrap_or_else(|_| Bytes::from_static(br#"{"message":"internal error"}"#))
}

fn revalidate_cache_control(secs: u64) -> HeaderValue {
    if secs == 0 {
        return HeaderValue::from_static("no-store");
    }
    HeaderValue::from_str(&format!(
        "public, s-maxage={secs}, stale-while-revalidate"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn json_bytes_response(body: Bytes, cache_control: HeaderValue) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::CACHE_CONTROL, cache_control);
    response
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use bytes::Bytes;

    use super::{json_payload, revalidate_cache_control};
    use crate::config::{DASHBOARD_ERROR_MESSAGE, LOCATIONS_ERROR_MESSAGE};
    use crate::state::{AppState, UpstreamSettings};

    async fn spawn_router(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    async fn spawn_proxy(base_url: String, revalidate: Duration) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let state = AppState::new(UpstreamSettings {
            base_url,
            token: None,
            revalidate,
        });
        spawn_router(crate::app::build_app(state)).await
    }

    fn counting_upstream(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/nortus-v1/dashboard",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                        axum::Json(serde_json::json!({ "activeClients": 42, "call": n }))
                    }
                }),
            )
            .route(
                "/map/locations",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        axum::Json(serde_json::json!({ "message": "not found" })),
                    )
                }),
            )
    }

    #[tokio::test]
    async fn success_passes_json_through_with_revalidate_header() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (upstream, upstream_handle) = spawn_router(counting_upstream(hits.clone())).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::from_secs(20)).await;

        let resp = reqwest::get(format!("http://{addr}/api/nortus-v1/dashboard"))
            .await
            .expect("dashboard request");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("cache-control")
                .and_then(|v| v.to_str().ok()),
            Some("public, s-maxage=20, stale-while-revalidate")
        );
        let body = resp.json::<serde_json::Value>().await.expect("json body");
        assert_eq!(body["activeClients"], 42);

        handle.abort();
        upstream_handle.abort();
    }

    #[tokio::test]
    async fn repeated_calls_inside_window_hit_upstream_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (upstream, upstream_handle) = spawn_router(counting_upstream(hits.clone())).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::from_secs(20)).await;
        let client = reqwest::Client::new();

        for _ in 0..3 {
            let body = client
                .get(format!("http://{addr}/api/nortus-v1/dashboard"))
                .send()
                .await
                .expect("dashboard request")
                .json::<serde_json::Value>()
                .await
                .expect("json body");
            assert_eq!(body["call"], 1);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        handle.abort();
        upstream_handle.abort();
    }

    #[tokio::test]
    async fn zero_window_always_refetches() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (upstream, upstream_handle) = spawn_router(counting_upstream(hits.clone())).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::ZERO).await;
        let client = reqwest::Client::new();

        for _ in 0..2 {
            let resp = client
                .get(format!("http://{addr}/api/nortus-v1/dashboard"))
                .send()
                .await
                .expect("dashboard request");
            assert_eq!(
                resp.headers()
                    .get("cache-control")
                    .and_then(|v| v.to_str().ok()),
                Some("no-store")
            );
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        handle.abort();
        upstream_handle.abort();
    }

    #[tokio::test]
    async fn upstream_error_status_and_payload_pass_through() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (upstream, upstream_handle) = spawn_router(counting_upstream(hits)).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::from_secs(20)).await;

        let resp = reqwest::get(format!("http://{addr}/api/map/locations"))
            .await
            .expect("locations request");
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()
                .get("cache-control")
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        let body = resp.json::<serde_json::Value>().await.expect("json body");
        assert_eq!(body, serde_json::json!({ "message": "not found" }));

        handle.abort();
        upstream_handle.abort();
    }

    #[tokio::test]
    async fn empty_and_non_json_error_bodies() {
        let upstream_app = Router::new()
            .route(
                "/nortus-v1/dashboard",
                get(|| async { StatusCode::BAD_GATEWAY }),
            )
            .route(
                "/map/locations",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            );
        let (upstream, upstream_handle) = spawn_router(upstream_app).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::from_secs(20)).await;

        let resp = reqwest::get(format!("http://{addr}/api/nortus-v1/dashboard"))
            .await
            .expect("dashboard request");
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
        let body = resp.json::<serde_json::Value>().await.expect("json body");
        assert_eq!(body["message"], DASHBOARD_ERROR_MESSAGE);

        let resp = reqwest::get(format!("http://{addr}/api/map/locations"))
            .await
            .expect("locations request");
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let body = resp.json::<serde_json::Value>().await.expect("json body");
        assert_eq!(body, serde_json::json!("maintenance"));

        handle.abort();
        upstream_handle.abort();
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_500_with_default_message() {
        // Bind and drop a listener so the port is known to be closed.
        let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("bind scratch port");
        let closed_addr = closed.local_addr().expect("scratch port address");
        drop(closed);

        let (addr, handle) = spawn_proxy(format!("http://{closed_addr}"), Duration::from_secs(20)).await;

        let resp = reqwest::get(format!("http://{addr}/api/map/locations"))
            .await
            .expect("locations request");
        assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.json::<serde_json::Value>().await.expect("json body");
        assert_eq!(body, serde_json::json!({ "message": LOCATIONS_ERROR_MESSAGE }));

        handle.abort();
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let upstream_app = Router::new().route(
            "/map/locations",
            get({
                let calls = calls.clone();
                move || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(serde_json::json!({})))
                        } else {
                            (
                                StatusCode::OK,
                                axum::Json(serde_json::json!({ "data": { "locations": [] } })),
                            )
                        }
                    }
                }
            }),
        );
        let (upstream, upstream_handle) = spawn_router(upstream_app).await;
        let (addr, handle) = spawn_proxy(format!("http://{upstream}"), Duration::from_secs(20)).await;
        let url = format!("http://{addr}/api/map/locations");

        let first = reqwest::get(&url).await.expect("first request");
        assert_eq!(first.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let second = reqwest::get(&url).await.expect("second request");
        assert_eq!(second.status(), reqwest::StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.abort();
        upstream_handle.abort();
    }

    #[test]
    fn json_payload_wraps_plain_text() {
        assert_eq!(
            json_payload(Bytes::from_static(br#"{"a":1}"#)),
            Bytes::from_static(br#"{"a":1}"#)
        );
        assert_eq!(
            json_payload(Bytes::from_static(b"oops")),
            Bytes::from_static(br#""oops""#)
        );
    }

    #[test]
    fn revalidate_header_reflects_window() {
        assert_eq!(
            revalidate_cache_control(20),
            "public, s-maxage=20, stale-while-revalidate"
        );
        assert_eq!(revalidate_cache_control(0), "no-store");
    }
}
