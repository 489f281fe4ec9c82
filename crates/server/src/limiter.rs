use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{DefaultKeyedRateLimiter, Quota};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::http::client_ip;
use crate::state::AppState;

const PURGE_THRESHOLD: usize = 10_000;

/// Per-IP token bucket: `max_requests` burst, refilled evenly over `window`.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl RateLimiter {
    /// `max_requests == 0` admits everything.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let quota = NonZeroU32::new(max_requests).and_then(|burst| {
            Quota::with_period(window / burst.get()).map(|q| q.allow_burst(burst))
        });
        if quota.is_none() && max_requests > 0 {
            tracing::warn!("Rate limit window is zero, limiter disabled");
        }
        Self {
            inner: quota.map(|q| Arc::new(DefaultKeyedRateLimiter::keyed(q))),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        let Some(limiter) = &self.inner else {
            return true;
        };
        if limiter.len() > PURGE_THRESHOLD {
            limiter.retain_recent();
        }
        limiter.check_key(&key.to_string()).is_ok()
    }
}

pub async fn limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer, state.trust_proxy);
    if !state.limiter.check(&ip) {
        tracing::warn!("Rate limit exceeded for {}", ip);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "msg": "Too many requests, please try again later" })),
        )
            .into_response();
    }
    next.run(request).await
}
