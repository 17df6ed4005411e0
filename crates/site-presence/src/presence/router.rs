use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{Actor, PersonId, SiteId};
use super::repository::{PresenceStore, PresenceTracker};
use super::service::{PresenceRequest, PresenceService, PresenceServiceError, UnitListing};
use super::units::OccupancyRange;

/// Payload for a checkpoint status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheckRequest {
    pub person_id: PersonId,
    /// Taken as given; an authenticating layer in front of this router must supply it.
    pub actor: Actor,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UnitQuery {
    #[serde(default)]
    person_id: Option<String>,
    #[serde(default)]
    selectable: bool,
    #[serde(default)]
    min_occupancy: Option<u32>,
    #[serde(default)]
    max_occupancy: Option<u32>,
}

impl From<UnitQuery> for UnitListing {
    fn from(query: UnitQuery) -> Self {
        Self {
            selectable: query.selectable,
            person_id: query.person_id.map(PersonId),
            range: OccupancyRange {
                min_occupancy: query.min_occupancy,
                max_occupancy: query.max_occupancy,
            },
        }
    }
}

/// Router builder exposing the checkpoint and housing unit endpoints.
pub fn presence_router<S, T>(service: Arc<PresenceService<S, T>>) -> Router
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    Router::new()
        .route(
            "/api/v1/sites/:site_id/presence/status",
            post(status_handler::<S, T>),
        )
        .route(
            "/api/v1/sites/:site_id/presence",
            post(register_handler::<S, T>),
        )
        .route("/api/v1/sites/:site_id/units", get(units_handler::<S, T>))
        .with_state(service)
}

pub(crate) async fn status_handler<S, T>(
    State(service): State<Arc<PresenceService<S, T>>>,
    Path(site_id): Path<String>,
    axum::Json(request): axum::Json<StatusCheckRequest>,
) -> Response
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    let site_id = SiteId(site_id);
    match service.check(&site_id, &request.person_id, &request.actor) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(error) => failure_response(&site_id, error),
    }
}

pub(crate) async fn register_handler<S, T>(
    State(service): State<Arc<PresenceService<S, T>>>,
    Path(site_id): Path<String>,
    axum::Json(request): axum::Json<PresenceRequest>,
) -> Response
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    let site_id = SiteId(site_id);
    match service.register(&site_id, request) {
        Ok(outcome) if outcome.recorded => {
            (StatusCode::CREATED, axum::Json(outcome)).into_response()
        }
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => failure_response(&site_id, error),
    }
}

pub(crate) async fn units_handler<S, T>(
    State(service): State<Arc<PresenceService<S, T>>>,
    Path(site_id): Path<String>,
    Query(query): Query<UnitQuery>,
) -> Response
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    let site_id = SiteId(site_id);
    match service.units(&site_id, &UnitListing::from(query)) {
        Ok(units) => (StatusCode::OK, axum::Json(units)).into_response(),
        Err(error) => failure_response(&site_id, error),
    }
}

fn failure_response(site_id: &SiteId, error: PresenceServiceError) -> Response {
    warn!(site = %site_id.0, %error, "presence request failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
