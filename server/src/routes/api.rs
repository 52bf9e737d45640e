use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "upstream": state.upstream.base_url,
        "revalidate_secs": state.upstream.revalidate.as_secs(),
        "cached_routes": state.proxy_cache.len(),
        "observability": {
            "proxy_requests_total": observability.proxy_requests_total,
            "proxy_cache_hits_total": observability.proxy_cache_hits_total,
            "upstream_errors_total": observability.upstream_errors_total,
        }
    }))
}
