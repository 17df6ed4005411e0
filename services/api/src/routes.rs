use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use site_presence::presence::{
    occupancy_percent, presence_router, PresenceService, PresenceStore, PresenceTracker,
};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct OccupancyRequest {
    #[serde(default)]
    pub(crate) capacity: Option<u32>,
    #[serde(default)]
    pub(crate) blocked_capacity: Option<u32>,
    #[serde(default)]
    pub(crate) population: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OccupancyResponse {
    pub(crate) occupancy: Option<u32>,
}

pub(crate) fn with_presence_routes<S, T>(service: Arc<PresenceService<S, T>>) -> axum::Router
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    presence_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/occupancy", axum::routing::post(occupancy_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(std::sync::atomic::Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Occupancy for ad-hoc figures, without a stored unit.
pub(crate) async fn occupancy_endpoint(
    Json(payload): Json<OccupancyRequest>,
) -> Json<OccupancyResponse> {
    Json(OccupancyResponse {
        occupancy: occupancy_percent(
            payload.capacity,
            payload.blocked_capacity,
            payload.population,
        ),
    })
}
