use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use body_climate::survey::{survey_router, SurveyRepository, SurveyService};
use body_climate::throttle::{rate_limit, RateLimitState};
use serde_json::json;
use std::sync::Arc;

/// Quiz routes plus operational endpoints. `/api/*` and narrated result
/// views are throttled per client.
pub(crate) fn with_survey_routes<R>(
    service: Arc<SurveyService<R>>,
    limiter: RateLimitState,
) -> Router
where
    R: SurveyRepository + 'static,
{
    survey_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(axum::middleware::from_fn_with_state(limiter, rate_limit))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
