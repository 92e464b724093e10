use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use super::RateCounter;
use crate::survey::requests_analysis;

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RESET_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-reset");

const THROTTLED_PREFIX: &str = "/api/";

/// API calls and result views that ask for a generated narrative are
/// counted; everything else passes through.
fn is_throttled(request: &Request) -> bool {
    request.uri().path().starts_with(THROTTLED_PREFIX) || requests_analysis(request.uri())
}

/// State handed to [`rate_limit`] through `from_fn_with_state`.
#[derive(Clone)]
pub struct RateLimitState {
    pub counter: Arc<dyn RateCounter>,
    pub limit: u32,
}

impl RateLimitState {
    pub fn new(counter: Arc<dyn RateCounter>, limit: u32) -> Self {
        Self { counter, limit }
    }
}

fn first_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Address a request is counted against: the first forwarded hop, then the
/// proxy's real-ip header, then the socket peer.
pub fn client_key(request: &Request) -> String {
    let headers = request.headers();
    first_header(headers, "x-forwarded-for")
        .or_else(|| first_header(headers, "x-real-ip"))
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

fn reset_epoch_secs(retry_after: Duration) -> u64 {
    SystemTime::now()
        .checked_add(retry_after)
        .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
        .map(ceil_secs)
        .unwrap_or_default()
}

pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_throttled(&request) {
        return next.run(request).await;
    }

    let key = client_key(&request);
    let now = Instant::now();
    let window = state.counter.increment(&key, now);
    let retry_after = window.retry_after(now);

    if window.count > state.limit {
        let seconds = ceil_secs(retry_after);
        warn!(client = %key, count = window.count, retry_after = seconds, "rate limit exceeded");
        let payload = json!({
            "error": "Too many requests",
            "message": "잠시 후 다시 시도해주세요.",
            "retryAfter": seconds,
        });
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(payload)).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(state.limit));
    headers.insert(
        REMAINING_HEADER,
        HeaderValue::from(state.limit - window.count),
    );
    headers.insert(
        RESET_HEADER,
        HeaderValue::from(reset_epoch_secs(retry_after)),
    );
    response
}
