use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::warn;

use crate::config::{
    revalidate_window, upstream_base_url, upstream_connect_timeout, upstream_http_timeout,
    upstream_token,
};

/// Where and how the proxy reaches the backend.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub revalidate: Duration,
}

impl UpstreamSettings {
    pub fn from_env() -> Self {
        Self {
            base_url: upstream_base_url(),
            token: upstream_token(),
            revalidate: revalidate_window(),
        }
    }
}

/// Last successful upstream body for one proxied route.
#[derive(Debug, Clone)]
pub struct CachedBody {
    pub body: Bytes,
    pub fetched_at: DateTime<Utc>,
}

impl CachedBody {
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let Ok(window) = chrono::Duration::from_std(window) else {
            return false;
        };
        now.signed_duration_since(self.fetched_at) < window
    }
}

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamSettings>,
    pub http_client: reqwest::Client,
    /// Upstream path -> last successful body, reused inside the revalidate window.
    pub proxy_cache: Arc<DashMap<&'static str, CachedBody>>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    proxy_requests_total: AtomicU64,
    proxy_cache_hits_total: AtomicU64,
    upstream_errors_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub proxy_requests_total: u64,
    pub proxy_cache_hits_total: u64,
    pub upstream_errors_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            proxy_requests_total: self.proxy_requests_total.load(Ordering::Relaxed),
            proxy_cache_hits_total: self.proxy_cache_hits_total.load(Ordering::Relaxed),
            upstream_errors_total: self.upstream_errors_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_proxy_request(&self) {
        self.proxy_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.proxy_cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_error(&self) {
        self.upstream_errors_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(upstream: UpstreamSettings) -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("nortus-dashboard/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });
        Self {
            upstream: Arc::new(upstream),
            http_client,
            proxy_cache: Arc::new(DashMap::new()),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}{path}", self.upstream.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_body_freshness_follows_window() {
        let fetched_at = Utc::now();
        let cached = CachedBody {
            body: Bytes::from_static(b"{}"),
            fetched_at,
        };
        let window = Duration::from_secs(20);
        assert!(cached.is_fresh(window, fetched_at + chrono::Duration::seconds(19)));
        assert!(!cached.is_fresh(window, fetched_at + chrono::Duration::seconds(20)));
        assert!(!cached.is_fresh(Duration::ZERO, fetched_at));
    }

    #[test]
    fn upstream_url_joins_base_and_path() {
        let state = AppState::new(UpstreamSettings {
            base_url: "https://api.example.com".into(),
            token: None,
            revalidate: Duration::from_secs(20),
        });
        assert_eq!(
            state.upstream_url("/nortus-v1/dashboard"),
            "https://api.example.com/nortus-v1/dashboard"
        );
    }
}
